// Shared test support code.
// This module provides common utilities that all test files can use.

pub mod liveness;
pub mod logs;

pub use liveness::{FixedDumper, Flag, SleepyDumper, SlowProber};
pub use logs::{Captured, LogCapture};
