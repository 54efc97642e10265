//! The event-loop worker: a dedicated thread owning the foreign toolkit's
//! blocking loop.
//!
//! The worker moves through a fixed lifecycle, visible as [`Phase`]:
//!
//! ```text
//! NotStarted → Initializing → Running → Unwinding → Stopped
//!                    └──────────────────────────────→ Stopped  (init failed)
//! ```
//!
//! The loop is entered once and left once — the only thing that ends the
//! Running phase is a [`LoopRequest::Quit`] delivered by
//! [`MenuWorker::stop`]. Initialization failure is terminal and silently
//! degrades the feature: no popup ever appears, the host keeps running.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::backend::{LoopRequest, MenuBackend, RequestHandle};
use crate::{AnchorCell, MenuError, MenuModel};

/// Lifecycle phase of the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// Constructed; the worker thread does not exist yet.
    NotStarted = 0,
    /// Thread entered; toolkit initialization in progress.
    Initializing = 1,
    /// Toolkit initialized, menu installed, loop live.
    Running = 2,
    /// Loop returned; menu being torn down.
    Unwinding = 3,
    /// Thread function returned (or initialization failed). Terminal.
    Stopped = 4,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Initializing,
            2 => Self::Running,
            3 => Self::Unwinding,
            4 => Self::Stopped,
            _ => Self::NotStarted,
        }
    }
}

/// State shared between the worker thread and every [`MenuHandle`].
struct WorkerShared {
    phase: AtomicU8,
    anchor: Arc<AnchorCell>,
    /// Present exactly while the loop is live and shutdown has not begun.
    requests: Mutex<Option<Box<dyn RequestHandle>>>,
    shutdown: AtomicBool,
}

impl WorkerShared {
    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }
}

/// Owns the menu worker thread for one control-surface instance.
///
/// [`start`](Self::start) and [`stop`](Self::stop) pair exactly once with
/// the surface's construction and teardown. Pointer reports and popup
/// requests go through [`MenuHandle`]s, which stay valid (as no-ops)
/// before the loop is up and after it has gone down.
pub struct MenuWorker {
    shared: Arc<WorkerShared>,
    backend: Option<Box<dyn MenuBackend>>,
    thread: Option<JoinHandle<()>>,
    exited: Option<Receiver<()>>,
}

impl MenuWorker {
    /// Create a worker for `backend`. The thread is not started.
    pub fn new(backend: impl MenuBackend + 'static) -> Self {
        Self {
            shared: Arc::new(WorkerShared {
                phase: AtomicU8::new(Phase::NotStarted as u8),
                anchor: Arc::new(AnchorCell::new()),
                requests: Mutex::new(None),
                shutdown: AtomicBool::new(false),
            }),
            backend: Some(Box::new(backend)),
            thread: None,
            exited: None,
        }
    }

    /// Spawn the worker thread and return immediately.
    ///
    /// Toolkit initialization happens on the new thread; a failure there
    /// is logged and leaves the worker permanently in [`Phase::Stopped`]
    /// with the feature unavailable. Calling `start` a second time is a
    /// logged no-op — the toolkit is initialized at most once per worker.
    pub fn start(&mut self) {
        let Some(backend) = self.backend.take() else {
            warn!("menu worker already started; ignoring");
            return;
        };

        let shared = Arc::clone(&self.shared);
        // Never sent on; dropping the sender is the exit signal, so every
        // return path of the thread disconnects it.
        let (exit_tx, exit_rx) = bounded::<()>(0);

        let spawned = thread::Builder::new()
            .name("carta-menu".into())
            .spawn(move || {
                let _exit_tx = exit_tx;
                worker_main(backend, &shared);
            });

        match spawned {
            Ok(handle) => {
                self.thread = Some(handle);
                self.exited = Some(exit_rx);
            }
            Err(err) => {
                warn!(%err, "failed to spawn menu worker thread");
                self.shared.set_phase(Phase::Stopped);
            }
        }
    }

    /// A clonable front for the any-thread operations.
    pub fn handle(&self) -> MenuHandle {
        MenuHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.shared.phase()
    }

    /// Whether the toolkit loop is live (the spec's `loopInitialized`).
    pub fn is_running(&self) -> bool {
        self.shared.phase() == Phase::Running
    }

    /// Ask the loop to quit, then wait for the worker thread to exit.
    ///
    /// `timeout` of `None` waits unboundedly — the teardown case, where
    /// the surface must not release its own resources while the foreign
    /// loop is still unwinding. With a bounded timeout, an overdue thread
    /// is detached (never killed) and [`MenuError::ShutdownTimeout`] is
    /// returned.
    ///
    /// Returns promptly when the worker never reached [`Phase::Running`]:
    /// a failed initialization exits on its own, and a worker that has not
    /// yet published its request handle observes the shutdown flag instead
    /// and skips the loop.
    ///
    /// Calling `stop` again after it returned `Ok` is a no-op.
    pub fn stop(&mut self, timeout: Option<Duration>) -> Result<(), MenuError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        // Order matters: the flag is published before the handle is taken,
        // and the worker publishes its handle before checking the flag —
        // whichever side loses the race, the loop is never entered without
        // a Quit already queued.
        self.shared.shutdown.store(true, Ordering::Release);
        if let Some(requests) = self.shared.requests.lock().take() {
            requests.send(LoopRequest::Quit);
        }

        let timed_out = match (self.exited.take(), timeout) {
            (Some(exited), Some(limit)) => {
                matches!(exited.recv_timeout(limit), Err(RecvTimeoutError::Timeout))
            }
            (Some(exited), None) => {
                let _ = exited.recv();
                false
            }
            (None, _) => false,
        };

        if timed_out {
            warn!("menu worker did not stop in time; detaching the thread");
            drop(thread);
            return Err(MenuError::ShutdownTimeout);
        }

        if thread.join().is_err() {
            warn!("menu worker thread panicked during teardown");
        }
        Ok(())
    }
}

/// Cheap clonable front over the worker's shared state.
///
/// Both operations are safe from any thread at any point in the worker's
/// lifecycle; outside the Running phase they degrade to no-ops.
#[derive(Clone)]
pub struct MenuHandle {
    shared: Arc<WorkerShared>,
}

impl MenuHandle {
    /// Store the pointer's current screen location.
    ///
    /// Wait-free and allocation-free — callable at pointer-motion
    /// frequency from the UI thread.
    #[inline]
    pub fn report_pointer(&self, x: i32, y: i32) {
        self.shared.anchor.set(x, y);
    }

    /// The most recently reported pointer location.
    pub fn anchor(&self) -> (i32, i32) {
        self.shared.anchor.get()
    }

    /// Ask the worker to display the menu at the last reported location.
    ///
    /// The anchor is read on the worker thread at dispatch time, not here;
    /// the caller never waits for the menu to open or close. Outside the
    /// Running phase this is a silent no-op, never a fault.
    pub fn request_popup(&self) {
        if let Some(requests) = self.shared.requests.lock().as_ref() {
            requests.send(LoopRequest::Popup);
        }
    }

    /// Whether the toolkit loop is live.
    pub fn is_running(&self) -> bool {
        self.shared.phase() == Phase::Running
    }
}

/// Worker thread body.
fn worker_main(backend: Box<dyn MenuBackend>, shared: &WorkerShared) {
    shared.set_phase(Phase::Initializing);

    let mut session = match backend.init() {
        Ok(session) => session,
        Err(err) => {
            warn!(%err, "native menu unavailable");
            shared.set_phase(Phase::Stopped);
            return;
        }
    };
    debug!("menu toolkit initialized");

    let handle = session.install(MenuModel::standard(), Arc::clone(&shared.anchor));
    *shared.requests.lock() = Some(handle);
    shared.set_phase(Phase::Running);

    // A stop() that raced initialization either took the handle (its Quit
    // is queued for the loop) or set the flag before the handle appeared;
    // in the latter case the loop must not be entered at all.
    if !shared.shutdown.load(Ordering::Acquire) {
        session.run();
    }

    shared.set_phase(Phase::Unwinding);
    shared.requests.lock().take();
    drop(session);
    shared.set_phase(Phase::Stopped);
    debug!("menu toolkit loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeadlessBackend;
    use std::time::Instant;

    fn wait_for_phase(worker: &MenuWorker, phase: Phase) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while worker.phase() != phase {
            assert!(
                Instant::now() < deadline,
                "worker stuck in {:?} waiting for {:?}",
                worker.phase(),
                phase
            );
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn phase_starts_not_started() {
        let worker = MenuWorker::new(HeadlessBackend::new());
        assert_eq!(worker.phase(), Phase::NotStarted);
        assert!(!worker.is_running());
    }

    #[test]
    fn start_reaches_running() {
        let mut worker = MenuWorker::new(HeadlessBackend::new());
        worker.start();
        wait_for_phase(&worker, Phase::Running);
        assert!(worker.is_running());
        worker.stop(Some(Duration::from_secs(1))).unwrap();
        assert_eq!(worker.phase(), Phase::Stopped);
    }

    #[test]
    fn second_start_does_not_reinitialize() {
        let backend = HeadlessBackend::new();
        let probe = backend.probe();
        let mut worker = MenuWorker::new(backend);
        worker.start();
        wait_for_phase(&worker, Phase::Running);
        worker.start();
        worker.stop(Some(Duration::from_secs(1))).unwrap();
        assert_eq!(probe.init_calls(), 1);
    }

    #[test]
    fn popup_before_start_is_noop() {
        let worker = MenuWorker::new(HeadlessBackend::new());
        let handle = worker.handle();
        handle.report_pointer(10, 20);
        handle.request_popup();
        assert_eq!(handle.anchor(), (10, 20));
    }

    #[test]
    fn popup_after_stop_is_noop() {
        let backend = HeadlessBackend::new();
        let probe = backend.probe();
        let mut worker = MenuWorker::new(backend);
        worker.start();
        wait_for_phase(&worker, Phase::Running);
        worker.stop(Some(Duration::from_secs(1))).unwrap();

        let handle = worker.handle();
        handle.request_popup();
        assert!(probe.popups().is_empty());
    }

    #[test]
    fn stop_without_start_is_ok() {
        let mut worker = MenuWorker::new(HeadlessBackend::new());
        assert!(worker.stop(Some(Duration::from_millis(10))).is_ok());
    }

    #[test]
    fn stop_twice_is_ok() {
        let mut worker = MenuWorker::new(HeadlessBackend::new());
        worker.start();
        wait_for_phase(&worker, Phase::Running);
        assert!(worker.stop(Some(Duration::from_secs(1))).is_ok());
        assert!(worker.stop(Some(Duration::from_secs(1))).is_ok());
    }

    #[test]
    fn stop_with_unbounded_timeout() {
        let mut worker = MenuWorker::new(HeadlessBackend::new());
        worker.start();
        wait_for_phase(&worker, Phase::Running);
        worker.stop(None).unwrap();
        assert_eq!(worker.phase(), Phase::Stopped);
    }

    #[test]
    fn handles_survive_worker() {
        let mut worker = MenuWorker::new(HeadlessBackend::new());
        worker.start();
        wait_for_phase(&worker, Phase::Running);
        let handle = worker.handle();
        worker.stop(Some(Duration::from_secs(1))).unwrap();
        drop(worker);

        // The clone keeps the shared state alive; calls are no-ops.
        handle.report_pointer(1, 2);
        handle.request_popup();
        assert!(!handle.is_running());
    }
}
