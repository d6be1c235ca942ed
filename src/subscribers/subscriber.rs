//! # Action subscriber trait.
//!
//! Provides [`Subscribe`] an extension point for plugging consumers (stores, loggers,
//! reporters) into the engine's output.
//!
//! Each subscriber gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-subscriber bounded queue** (capacity via [`Subscribe::queue_capacity`])
//! - **Panic isolation** (panics are caught and logged)
//!
//! ## Rules
//! - A slow subscriber only affects its own queue.
//! - Queue overflow drops the action **for this subscriber only** and logs a warning.
//! - Actions are processed sequentially (FIFO) per subscriber.

use async_trait::async_trait;

use crate::actions::Action;

/// Consumer of the action stream.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single action.
    ///
    /// Called from a dedicated worker task, in publish order.
    async fn on_action(&self, action: &Action);

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this subscriber.
    ///
    /// The runtime clamps capacity to a minimum of 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
