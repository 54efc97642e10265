//! Display-less menu backend for tests and CI.
//!
//! Dispatch runs over a crossbeam channel instead of a toolkit loop, and
//! every popup display and activation is recorded into a shared
//! [`HeadlessProbe`] the caller can read. [`HeadlessBackend::failing`]
//! simulates a toolkit that cannot initialize (no display session).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::backend::{LoopRequest, MenuBackend, MenuSession, RequestHandle};
use crate::{AnchorCell, MenuError, MenuModel};

/// One recorded popup display call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupRecord {
    /// Anchor location read from the shared cell at dispatch time.
    pub anchor: (i32, i32),
    /// Item labels in menu order, as the native widget would show them.
    pub labels: Vec<String>,
}

/// Observation point for everything the headless loop does.
#[derive(Debug, Default)]
pub struct HeadlessProbe {
    popups: Mutex<Vec<PopupRecord>>,
    activations: Mutex<Vec<String>>,
    init_calls: AtomicUsize,
}

impl HeadlessProbe {
    /// Popup display calls recorded so far, oldest first.
    pub fn popups(&self) -> Vec<PopupRecord> {
        self.popups.lock().clone()
    }

    /// Activation payloads recorded so far, oldest first.
    pub fn activations(&self) -> Vec<String> {
        self.activations.lock().clone()
    }

    /// How many times the backend's initialization ran.
    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }
}

/// In-process stand-in for a native toolkit.
pub struct HeadlessBackend {
    probe: Arc<HeadlessProbe>,
    fail_init: bool,
    auto_select: Option<usize>,
}

impl HeadlessBackend {
    /// Backend whose initialization succeeds.
    pub fn new() -> Self {
        Self {
            probe: Arc::new(HeadlessProbe::default()),
            fail_init: false,
            auto_select: None,
        }
    }

    /// Backend whose initialization fails, like a toolkit started without
    /// a display session.
    pub fn failing() -> Self {
        Self {
            fail_init: true,
            ..Self::new()
        }
    }

    /// Simulate the user selecting entry `index` immediately after every
    /// popup display. The activation runs on the worker thread, exactly
    /// where a native toolkit would invoke it.
    pub fn auto_select(mut self, index: usize) -> Self {
        self.auto_select = Some(index);
        self
    }

    /// The probe recording this backend's activity.
    pub fn probe(&self) -> Arc<HeadlessProbe> {
        Arc::clone(&self.probe)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuBackend for HeadlessBackend {
    fn init(self: Box<Self>) -> Result<Box<dyn MenuSession>, MenuError> {
        self.probe.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            return Err(MenuError::ToolkitInit(
                "headless backend configured to fail".into(),
            ));
        }

        let (tx, rx) = unbounded();
        Ok(Box::new(HeadlessSession {
            probe: self.probe,
            auto_select: self.auto_select,
            tx,
            rx,
            installed: None,
        }))
    }
}

struct HeadlessSession {
    probe: Arc<HeadlessProbe>,
    auto_select: Option<usize>,
    tx: Sender<LoopRequest>,
    rx: Receiver<LoopRequest>,
    installed: Option<(MenuModel, Arc<AnchorCell>)>,
}

impl MenuSession for HeadlessSession {
    fn install(&mut self, model: MenuModel, anchor: Arc<AnchorCell>) -> Box<dyn RequestHandle> {
        self.installed = Some((model, anchor));
        Box::new(HeadlessHandle {
            tx: self.tx.clone(),
        })
    }

    fn run(&mut self) {
        let Some((model, anchor)) = self.installed.as_ref() else {
            return;
        };

        while let Ok(request) = self.rx.recv() {
            match request {
                LoopRequest::Popup => {
                    self.probe.popups.lock().push(PopupRecord {
                        anchor: anchor.get(),
                        labels: model.labels(),
                    });
                    if let Some(index) = self.auto_select
                        && let Some(payload) = model.activate(index)
                    {
                        self.probe.activations.lock().push(payload.to_owned());
                    }
                }
                LoopRequest::Quit => break,
            }
        }
    }
}

struct HeadlessHandle {
    tx: Sender<LoopRequest>,
}

impl RequestHandle for HeadlessHandle {
    fn send(&self, request: LoopRequest) {
        // The session may already be unwinding; a dropped request is fine.
        let _ = self.tx.send(request);
    }
}
