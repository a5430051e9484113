//! Process-wide stack snapshots for diagnosing stuck services.
//!
//! A snapshot starts with a symbolized backtrace of the calling thread. On
//! Linux it then holds one record per thread found under `/proc/self/task`:
//! name, scheduler state and wait channel, the thread's user-space frames
//! sampled through [`signal`], and its kernel stack when the process may
//! read it. Every step is best-effort.

use std::backtrace::Backtrace;
use std::fmt::Write;

#[cfg(target_os = "linux")]
mod signal;

/// Produces a textual snapshot of every thread in the process.
pub trait Dumper: Send + Sync {
    /// Returns at most `limit` bytes of stack text. Never fails; an
    /// unavailable source simply contributes nothing.
    fn dump(&self, limit: usize) -> String;
}

/// Dumper backed by `std::backtrace`, signal sampling and procfs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessDumper;

impl Dumper for ProcessDumper {
    fn dump(&self, limit: usize) -> String {
        let mut out = String::new();

        let current = std::thread::current();
        let _ = writeln!(
            out,
            "thread {:?} ({:?}) [calling]:\n{}",
            current.name().unwrap_or("<unnamed>"),
            current.id(),
            Backtrace::force_capture()
        );

        #[cfg(target_os = "linux")]
        procfs_threads(&mut out, limit);

        truncate(&mut out, limit);
        out
    }
}

#[cfg(target_os = "linux")]
fn procfs_threads(out: &mut String, limit: usize) {
    use std::fs;

    let Ok(entries) = fs::read_dir("/proc/self/task") else {
        return;
    };

    let mut tids: Vec<i32> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().and_then(|s| s.parse().ok()))
        .collect();
    tids.sort_unstable();

    let calling = signal::gettid();

    for tid in tids {
        if out.len() >= limit {
            return;
        }

        let base = format!("/proc/self/task/{}", tid);
        let read = |file: &str| fs::read_to_string(format!("{}/{}", base, file)).ok();

        let comm = read("comm").unwrap_or_default();
        let state = read("status")
            .and_then(|status| {
                status
                    .lines()
                    .find(|l| l.starts_with("State:"))
                    .map(|l| l.trim_start_matches("State:").trim().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());
        let wchan = read("wchan").unwrap_or_default();

        let _ = writeln!(
            out,
            "\nthread {} [{}] state={} wchan={}",
            tid,
            comm.trim(),
            state,
            if wchan.is_empty() || wchan == "0" { "-" } else { wchan.trim() }
        );

        if tid != calling {
            match signal::capture(tid) {
                Some(frames) if !frames.is_empty() => signal::write_frames(out, &frames),
                _ => out.push_str("  <user stack unavailable>\n"),
            }
        }

        // Kernel stacks need CAP_SYS_ADMIN; skip silently otherwise.
        if let Some(stack) = read("stack") {
            out.push_str(&stack);
        }
    }
}

/// Cuts `s` down to at most `limit` bytes on a char boundary.
/// Returns true if anything was removed.
pub fn truncate(s: &mut String, limit: usize) -> bool {
    if s.len() <= limit {
        return false;
    }
    let mut idx = limit;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    s.truncate(idx);
    true
}
