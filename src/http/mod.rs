// HTTP module: server wiring for the probe endpoint.

pub mod server;

// Re-export server types
pub use server::{HttpServer, Server};

// Common controller interface
pub use crate::controller::controller::Controller;
