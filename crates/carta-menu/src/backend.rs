//! Seam between the menu worker and a concrete toolkit.
//!
//! The worker never touches toolkit objects directly. It constructs a
//! [`MenuBackend`] on its own thread, installs the menu through the
//! resulting [`MenuSession`], and then blocks inside [`MenuSession::run`]
//! for the session's whole lifetime. Everything that crosses threads goes
//! through a [`RequestHandle`] as a [`LoopRequest`] message — toolkit
//! object graphs are not safe to share, so they never leave the worker
//! thread.

use std::sync::Arc;

use crate::{AnchorCell, MenuError, MenuModel};

/// A request injected into the running toolkit loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopRequest {
    /// Display the menu, anchored at the pointer location read from the
    /// shared [`AnchorCell`] at dispatch time.
    Popup,
    /// Leave the loop so the worker thread can unwind.
    Quit,
}

/// Cross-thread injection point for [`LoopRequest`]s.
///
/// Implementations must be non-blocking and callable from any thread.
/// Requests sent to a loop that is already unwinding are dropped.
pub trait RequestHandle: Send + Sync {
    /// Queue `request` for dispatch on the worker thread.
    fn send(&self, request: LoopRequest);
}

/// A live toolkit session, pinned to the worker thread that created it.
///
/// Sessions are deliberately not `Send`: every toolkit object they own is
/// created, used, and destroyed on the one thread that ran
/// [`MenuBackend::init`]. Teardown happens on drop, before the worker
/// thread returns.
pub trait MenuSession {
    /// Build the native menu from `model` and install the request
    /// dispatcher. `anchor` supplies popup coordinates at dispatch time.
    ///
    /// Returns the handle other threads use to inject requests.
    fn install(&mut self, model: MenuModel, anchor: Arc<AnchorCell>) -> Box<dyn RequestHandle>;

    /// Run the toolkit's blocking loop. Returns only after a
    /// [`LoopRequest::Quit`] has been dispatched.
    fn run(&mut self);
}

/// Factory for a toolkit session, consumed on the worker thread.
pub trait MenuBackend: Send {
    /// Initialize the toolkit on the calling thread.
    ///
    /// Called exactly once per worker instance. Failure is terminal: the
    /// worker logs it and the menu feature stays unavailable for the rest
    /// of the instance's lifetime.
    fn init(self: Box<Self>) -> Result<Box<dyn MenuSession>, MenuError>;
}
