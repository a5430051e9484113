// Background workers reporting their progress to the liveness registry.

pub mod sync_loop;

// Re-export main types
pub use sync_loop::{spawn_all, SyncLoop};
