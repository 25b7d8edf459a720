//! Actor system for background tasks.
//!
//! Each actor is an independent tokio task that talks to the logic thread
//! through `Message`s:
//! - Pipeline runs (RunActor)
//! - Insight requests (InsightsActor)
//! - Periodic redraw ticks (TickActor)
//!
//! NOTE: Keyboard input is handled synchronously in the logic thread,
//! not via an actor, for minimum latency.

pub mod insights;
pub mod run;
pub mod tick;

use tokio_util::sync::CancellationToken;

pub use insights::InsightsActor;
pub use run::RunActor;
pub use tick::TickActor;

/// Handle to a running actor, used for graceful shutdown.
pub struct ActorHandle {
    cancel: CancellationToken,
}

impl ActorHandle {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Signal the actor to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_shutdown() {
        let token = CancellationToken::new();
        let handle = ActorHandle::new(token.clone());
        assert!(!token.is_cancelled());
        handle.shutdown();
        assert!(token.is_cancelled());
    }
}
