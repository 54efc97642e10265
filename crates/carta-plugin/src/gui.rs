//! Control-surface lifecycle: window management and the menu worker
//! pairing.
//!
//! [`SurfaceEditor`] ties the two lifetimes the design hinges on into one
//! RAII pair: opening the editor starts the menu worker (exactly once per
//! surface instance), and dropping it stops the worker with an unbounded
//! wait *before* the editor window's own resources are released — the
//! GTK loop must be fully unwound first.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use baseview::WindowHandle;
use raw_window_handle::{HasRawWindowHandle, RawWindowHandle};

use carta_gtk::GtkBackend;
use carta_menu::MenuWorker;

use crate::shared::CartaShared;
use crate::surface::{self, SurfaceState};

// ── Window size constants ────────────────────────────────────────────────────

/// Default editor width in logical pixels.
pub const SURFACE_WIDTH: u32 = 480;

/// Default editor height in logical pixels. Diagnostic text scales by
/// `current_height / SURFACE_HEIGHT`.
pub const SURFACE_HEIGHT: u32 = 360;

/// Minimum editor width in logical pixels.
pub const MIN_WIDTH: u32 = 320;

/// Minimum editor height in logical pixels.
pub const MIN_HEIGHT: u32 = 240;

/// Maximum editor width in logical pixels.
pub const MAX_WIDTH: u32 = 1920;

/// Maximum editor height in logical pixels.
pub const MAX_HEIGHT: u32 = 1080;

// ── Atomic resize channel ────────────────────────────────────────────────────

/// Lock-free resize channel between the host's main thread and the
/// baseview window handler.
///
/// The host writes a new logical size in response to `set_size()`; the
/// handler reads the pending size each frame and resizes if it differs
/// from the last applied dimensions. Width and height are packed into a
/// single `AtomicU64` (width in the high 32 bits) so neither side can
/// observe a torn pair.
pub struct PendingResize {
    packed: AtomicU64,
}

impl PendingResize {
    /// Create a resize channel holding the given initial logical size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            packed: AtomicU64::new(Self::pack(width, height)),
        }
    }

    /// Write a new pending logical size (host main thread → handler).
    pub fn set(&self, width: u32, height: u32) {
        self.packed
            .store(Self::pack(width, height), Ordering::Release);
    }

    /// Read the current logical size.
    pub fn get(&self) -> (u32, u32) {
        Self::unpack(self.packed.load(Ordering::Acquire))
    }

    fn pack(width: u32, height: u32) -> u64 {
        (u64::from(width) << 32) | u64::from(height)
    }

    fn unpack(packed: u64) -> (u32, u32) {
        ((packed >> 32) as u32, packed as u32)
    }
}

// ── Parent window wrapper ─────────────────────────────────────────────────────

/// Wraps the [`RawWindowHandle`] the CLAP host hands us, for baseview's
/// `open_parented` (raw-window-handle 0.5 wants the trait, not the value).
///
/// # Safety
///
/// The CLAP gui extension guarantees the host's parent window outlives the
/// plugin's child window: `destroy()` is called before the host closes the
/// parent.
struct ParentWindow(RawWindowHandle);

#[allow(unsafe_code)]
// SAFETY: HasRawWindowHandle is unsafe in rwh 0.5. The impl returns a Copy
// value received from the host, valid for the full GUI lifecycle per the
// CLAP gui extension contract.
unsafe impl HasRawWindowHandle for ParentWindow {
    fn raw_window_handle(&self) -> RawWindowHandle {
        self.0
    }
}

// ── Editor ────────────────────────────────────────────────────────────────────

/// The live control surface for one plugin instance.
pub struct SurfaceEditor {
    /// Declared before the window: `Drop` stops the worker (unbounded
    /// wait) while the editor window is still alive.
    worker: MenuWorker,
    _window: WindowHandle,
}

impl SurfaceEditor {
    /// Open the editor inside the host's parent window and start the menu
    /// worker.
    ///
    /// This is the single `start()` of the surface's start/stop pairing;
    /// the matching `stop()` runs on drop.
    pub fn open(
        parent_rwh: RawWindowHandle,
        shared: CartaShared,
        scale: f64,
        pending_resize: Arc<PendingResize>,
    ) -> Self {
        let mut worker = MenuWorker::new(GtkBackend::new());
        worker.start();

        let state = SurfaceState::new(worker.handle(), shared);
        let (width, height) = pending_resize.get();

        let window = surface::open_parented(
            &ParentWindow(parent_rwh),
            "Carta Native Menu".to_owned(),
            width,
            height,
            scale,
            pending_resize,
            state,
        );

        Self {
            worker,
            _window: window,
        }
    }
}

impl Drop for SurfaceEditor {
    fn drop(&mut self) {
        // Unbounded wait: the foreign loop must be fully unwound before
        // the surface's own resources go away.
        if let Err(err) = self.worker.stop(None) {
            tracing::warn!(%err, "menu worker teardown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_resize_roundtrip() {
        let resize = PendingResize::new(SURFACE_WIDTH, SURFACE_HEIGHT);
        assert_eq!(resize.get(), (SURFACE_WIDTH, SURFACE_HEIGHT));

        resize.set(1024, 768);
        assert_eq!(resize.get(), (1024, 768));
    }

    #[test]
    fn pending_resize_extremes() {
        let resize = PendingResize::new(0, 0);
        resize.set(u32::MAX, u32::MAX);
        assert_eq!(resize.get(), (u32::MAX, u32::MAX));
    }
}
