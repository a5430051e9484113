//! Integration tests for aliveness.
//!
//! End-to-end checks of the probe endpoint wired to a live registry.

mod cases_probe_endpoint_test;

pub mod support;
