// Liveness stubs shared by unit and integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::liveness::{Prober, Service};
use crate::stack::Dumper;

/// Service with a switchable verdict that counts how often it was polled.
#[derive(Debug)]
pub struct Flag {
    alive: AtomicBool,
    polls: AtomicUsize,
}

impl Flag {
    pub fn new(alive: bool) -> Arc<Self> {
        Arc::new(Self {
            alive: AtomicBool::new(alive),
            polls: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

impl Service for Flag {
    fn is_alive(&self) -> bool {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.alive.load(Ordering::SeqCst)
    }
}

/// Dumper returning a fixed text, ignoring the requested limit so callers
/// have to enforce it themselves.
#[derive(Debug)]
pub struct FixedDumper {
    text: String,
    last_limit: AtomicUsize,
    calls: AtomicUsize,
}

impl FixedDumper {
    pub fn new(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            text: text.into(),
            last_limit: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn last_limit(&self) -> usize {
        self.last_limit.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Dumper for FixedDumper {
    fn dump(&self, limit: usize) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_limit.store(limit, Ordering::SeqCst);
        self.text.clone()
    }
}

/// Prober that blocks for a while before answering and counts the checks
/// it started.
pub struct SlowProber {
    delay: Duration,
    alive: bool,
    calls: AtomicUsize,
}

impl SlowProber {
    pub fn new(delay: Duration, alive: bool) -> Arc<Self> {
        Arc::new(Self {
            delay,
            alive,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Prober for SlowProber {
    fn add(&self, _name: &str, _service: Arc<dyn Service>) {}

    fn is_alive(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.alive
    }
}

/// Dumper that sleeps before answering and records when it finished.
#[derive(Debug)]
pub struct SleepyDumper {
    delay: Duration,
    started: AtomicBool,
    finished: AtomicBool,
}

impl SleepyDumper {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            started: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        })
    }

    pub fn started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl Dumper for SleepyDumper {
    fn dump(&self, _limit: usize) -> String {
        self.started.store(true, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.finished.store(true, Ordering::SeqCst);
        String::new()
    }
}
