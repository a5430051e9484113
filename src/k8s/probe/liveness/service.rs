// Service trait for liveness checking

/// Anything able to answer "am I still making progress".
///
/// Implementations are polled by the [`Registry`](super::Registry) while it
/// holds its lock, so `is_alive` must be cheap and must never call back into
/// the registry.
pub trait Service: Send + Sync {
    /// Checks if the service is alive
    fn is_alive(&self) -> bool;
}

impl<F> Service for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_alive(&self) -> bool {
        self()
    }
}
