#[path = "k8s/probe/liveness/mod.rs"]
pub mod liveness;
#[path = "shared/stack/mod.rs"]
pub mod stack;
#[cfg(test)]
mod tests;

#[cfg(test)]
pub use tests::support;

pub mod config;
pub mod controller;
pub mod http;
pub mod shutdown;
pub mod workers;
