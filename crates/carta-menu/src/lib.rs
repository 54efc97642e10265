//! Native context-menu coordination for audio plugin UIs.
//!
//! An audio plugin's editor runs inside a host-owned window with its own
//! event loop, while native context menus on Linux belong to a toolkit
//! (GTK) with a *different*, blocking event loop. This crate keeps the two
//! from ever blocking each other: a dedicated worker thread owns the
//! toolkit loop for its whole lifetime, and the editor talks to it through
//! a small thread-safe surface.
//!
//! - [`MenuWorker`] — owns the worker thread; `start` once, `stop` once,
//!   paired with the editor's construction and teardown.
//! - [`MenuHandle`] — cheap clonable front for the any-thread operations:
//!   [`report_pointer`](MenuHandle::report_pointer) on every mouse move,
//!   [`request_popup`](MenuHandle::request_popup) on right-click. Both
//!   degrade to no-ops when the toolkit is unavailable.
//! - [`MenuModel`] — the fixed item table backends render natively.
//! - [`MenuBackend`]/[`MenuSession`] — the seam a toolkit implements
//!   (`carta-gtk` in production, [`HeadlessBackend`] in tests and CI).
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use carta_menu::{HeadlessBackend, MenuWorker};
//!
//! let mut worker = MenuWorker::new(HeadlessBackend::new());
//! worker.start();
//!
//! let handle = worker.handle();
//! handle.report_pointer(120, 340);
//! handle.request_popup();
//!
//! worker.stop(Some(Duration::from_secs(1))).unwrap();
//! ```

mod anchor;
mod error;
mod model;
mod worker;

/// Toolkit seam: the traits a concrete menu backend implements.
pub mod backend;

/// Display-less backend for tests and CI.
pub mod headless;

pub use anchor::AnchorCell;
pub use backend::{LoopRequest, MenuBackend, MenuSession, RequestHandle};
pub use error::MenuError;
pub use headless::{HeadlessBackend, HeadlessProbe, PopupRecord};
pub use model::{MenuEntry, MenuModel};
pub use worker::{MenuHandle, MenuWorker, Phase};
