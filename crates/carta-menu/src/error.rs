//! Error types for the menu subsystem.

/// Errors produced by the native-menu subsystem.
///
/// Worker-internal failures are absorbed and logged on the worker thread;
/// the only error a caller ever observes is [`MenuError::ShutdownTimeout`]
/// from [`MenuWorker::stop`](crate::MenuWorker::stop).
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// The foreign toolkit could not initialize (no display session, …).
    /// Terminal for the worker instance; never retried. Right-click simply
    /// produces no menu for the rest of the instance's lifetime.
    #[error("toolkit initialization failed: {0}")]
    ToolkitInit(String),

    /// The wait inside [`MenuWorker::stop`](crate::MenuWorker::stop)
    /// elapsed before the worker thread exited. The thread is detached,
    /// never forcibly terminated — killing it mid-toolkit-teardown would
    /// leak native resources.
    #[error("timed out waiting for the menu worker to stop")]
    ShutdownTimeout,
}
