// HTTP controller trait for route registration.

use axum::Router;

/// Trait for adding routes to the HTTP server.
pub trait Controller: Send + Sync {
    /// Mounts this controller's handlers on `router` and returns it.
    fn add_route(&self, router: Router) -> Router;
}
