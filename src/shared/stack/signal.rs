//! User-space stacks of other threads, captured in-process.
//!
//! The target thread is interrupted with `SIGURG` through `tgkill`; the
//! handler walks its own stack into fixed static slots without allocating,
//! and the requesting thread symbolizes the addresses afterwards. A thread
//! that blocks the signal, or does not answer within [`REPLY_TIMEOUT`], is
//! reported without frames.
//!
//! The handler replaces any `SIGURG` disposition the process had before and
//! stays installed for the rest of its life. When no capture is pending it
//! does nothing, which matches the default disposition of `SIGURG`.

use parking_lot::Mutex;
use std::ffi::c_void;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

const MAX_FRAMES: usize = 128;
const REPLY_TIMEOUT: Duration = Duration::from_millis(200);

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_FRAME: AtomicUsize = AtomicUsize::new(0);
static FRAMES: [AtomicUsize; MAX_FRAMES] = [EMPTY_FRAME; MAX_FRAMES];
static FRAME_COUNT: AtomicUsize = AtomicUsize::new(0);
// tid the pending capture is for, 0 when idle
static TARGET: AtomicI32 = AtomicI32::new(0);
static DONE: AtomicBool = AtomicBool::new(false);

// The slots above are process-wide: one capture at a time.
static CAPTURE: Mutex<()> = parking_lot::const_mutex(());
static INSTALLED: OnceLock<bool> = OnceLock::new();

pub(super) fn gettid() -> i32 {
    unsafe { libc::syscall(libc::SYS_gettid) as i32 }
}

extern "C" fn on_signal(_: libc::c_int) {
    let tid = gettid();
    if TARGET.load(Ordering::Acquire) != tid {
        return;
    }

    let errno = unsafe { *libc::__errno_location() };

    let mut n = 0;
    unsafe {
        backtrace::trace_unsynchronized(|frame| {
            FRAMES[n].store(frame.ip() as usize, Ordering::Relaxed);
            n += 1;
            n < MAX_FRAMES
        });
    }
    FRAME_COUNT.store(n, Ordering::Relaxed);

    // A handler that ran past the deadline must not publish into the next capture.
    if TARGET.load(Ordering::Acquire) == tid {
        DONE.store(true, Ordering::Release);
    }

    unsafe { *libc::__errno_location() = errno };
}

fn install() -> bool {
    *INSTALLED.get_or_init(|| unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(libc::SIGURG, &action, std::ptr::null_mut()) == 0
    })
}

/// Return addresses on the stack of thread `tid`, innermost first, or `None`
/// when the thread could not be sampled.
pub(super) fn capture(tid: i32) -> Option<Vec<usize>> {
    if tid <= 0 || !install() {
        return None;
    }

    let _guard = CAPTURE.lock();
    DONE.store(false, Ordering::Release);
    FRAME_COUNT.store(0, Ordering::Relaxed);
    TARGET.store(tid, Ordering::Release);

    let sent = unsafe {
        libc::syscall(libc::SYS_tgkill, libc::getpid(), tid, libc::SIGURG) == 0
    };

    let mut answered = false;
    if sent {
        let deadline = Instant::now() + REPLY_TIMEOUT;
        while Instant::now() < deadline {
            if DONE.load(Ordering::Acquire) {
                answered = true;
                break;
            }
            std::thread::sleep(Duration::from_micros(200));
        }
    }
    TARGET.store(0, Ordering::Release);

    if !answered {
        return None;
    }

    let n = FRAME_COUNT.load(Ordering::Relaxed).min(MAX_FRAMES);
    Some(FRAMES[..n].iter().map(|f| f.load(Ordering::Relaxed)).collect())
}

/// Appends one symbolized line per address.
pub(super) fn write_frames(out: &mut String, ips: &[usize]) {
    for (i, &ip) in ips.iter().enumerate() {
        // Return addresses point past the call; step back into it.
        let addr = if i == 0 { ip } else { ip.saturating_sub(1) };

        let mut resolved = false;
        backtrace::resolve(addr as *mut c_void, |symbol| {
            resolved = true;
            let name = symbol
                .name()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "<unknown>".to_string());
            let _ = write!(out, "  {:>3}: {:#x} {}", i, ip, name);
            if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
                let _ = write!(out, "\n             at {}:{}", file.display(), line);
            }
            out.push('\n');
        });

        if !resolved {
            let _ = writeln!(out, "  {:>3}: {:#x} <unresolved>", i, ip);
        }
    }
}
