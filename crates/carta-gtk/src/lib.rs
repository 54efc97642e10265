//! GTK3 backend for carta native context menus.
//!
//! Implements the `carta-menu` backend seam over the gtk-rs bindings. The
//! whole GTK object graph — menu, items, the cached screen and root
//! window, the synthetic trigger event — lives on the menu worker thread:
//! [`GtkBackend::init`] runs `gtk::init` there, which makes that thread
//! the GTK main thread for the rest of the process's life, and
//! [`GtkSession::run`] blocks inside `gtk::main` until a quit request is
//! dispatched.
//!
//! Cross-thread popup and quit requests arrive through a
//! [`glib::MainContext`] channel, so they are dispatched *by* the GTK loop
//! on the worker thread rather than touching GTK objects from outside —
//! gtk-rs would panic on any such touch, by design.
//!
//! GTK can only be initialized meaningfully once per process; carta
//! assumes a single live menu worker per process (single plugin instance).
//! A second worker would contend for the one GTK main loop.

use std::rc::Rc;
use std::sync::Arc;

use gdk::prelude::*;
use gtk::prelude::*;
use parking_lot::Mutex;
use tracing::{debug, warn};

use carta_menu::{
    AnchorCell, LoopRequest, MenuBackend, MenuError, MenuModel, MenuSession, RequestHandle,
};

/// Factory for a [`GtkSession`]; hand it to `MenuWorker::new`.
#[derive(Debug, Default)]
pub struct GtkBackend;

impl GtkBackend {
    /// Create the backend. GTK is not touched until the worker thread
    /// calls [`MenuBackend::init`].
    pub fn new() -> Self {
        Self
    }
}

impl MenuBackend for GtkBackend {
    fn init(self: Box<Self>) -> Result<Box<dyn MenuSession>, MenuError> {
        gtk::init().map_err(|err| MenuError::ToolkitInit(err.to_string()))?;
        debug!("GTK initialized");

        // Cached once for the session's lifetime: popups anchor on the
        // root window of the default screen.
        let screen = gdk::Screen::default()
            .ok_or_else(|| MenuError::ToolkitInit("no default GDK screen".into()))?;
        let root_window = screen
            .root_window()
            .ok_or_else(|| MenuError::ToolkitInit("default screen has no root window".into()))?;

        Ok(Box::new(GtkSession {
            screen,
            root_window,
            menu: None,
        }))
    }
}

/// A live GTK session on the menu worker thread.
pub struct GtkSession {
    screen: gdk::Screen,
    root_window: gdk::Window,
    /// The native menu, alive for the whole Running phase. Dropping the
    /// session releases the widget graph before the worker thread returns.
    menu: Option<gtk::Menu>,
}

impl GtkSession {
    /// Build the synthetic button-press event GTK wants as a popup
    /// trigger. It has no semantic meaning — it only quells GTK's
    /// "no trigger event for menu popup" validation, so a best-effort
    /// event with the default seat's pointer attached is enough.
    fn synthetic_trigger(&self) -> gdk::Event {
        let mut trigger = gdk::Event::new(gdk::EventType::ButtonPress);
        if let Some(display) = gdk::Display::default()
            && let Some(seat) = display.default_seat()
        {
            trigger.set_device(seat.pointer().as_ref());
        }
        trigger.set_screen(Some(&self.screen));
        trigger
    }
}

impl MenuSession for GtkSession {
    fn install(&mut self, model: MenuModel, anchor: Arc<AnchorCell>) -> Box<dyn RequestHandle> {
        let menu = gtk::Menu::new();
        let model = Rc::new(model);

        for (index, entry) in model.entries().iter().enumerate() {
            let item = gtk::MenuItem::with_label(&entry.label);
            let model = Rc::clone(&model);
            // Runs inside GTK dispatch; MenuModel::activate never panics.
            item.connect_activate(move |_| {
                model.activate(index);
            });
            menu.append(&item);
        }
        menu.show_all();

        let (tx, rx) = glib::MainContext::channel(glib::Priority::DEFAULT);

        let dispatch_menu = menu.clone();
        let root_window = self.root_window.clone();
        let trigger = self.synthetic_trigger();
        rx.attach(None, move |request| match request {
            LoopRequest::Popup => {
                let (x, y) = anchor.get();
                let rect = gdk::Rectangle::new(x, y, 0, 0);
                // North-west/south-west gravity: the menu opens downward
                // from the pointer.
                dispatch_menu.popup_at_rect(
                    &root_window,
                    &rect,
                    gdk::Gravity::NorthWest,
                    gdk::Gravity::SouthWest,
                    Some(&trigger),
                );
                glib::ControlFlow::Continue
            }
            LoopRequest::Quit => {
                gtk::main_quit();
                glib::ControlFlow::Break
            }
        });

        self.menu = Some(menu);
        Box::new(GtkRequestHandle {
            tx: Mutex::new(tx),
        })
    }

    fn run(&mut self) {
        gtk::main();
        debug!("GTK main loop exited");
    }
}

/// Sends [`LoopRequest`]s into the GTK main context from any thread.
struct GtkRequestHandle {
    // glib's Sender is Send but not Sync; the lock makes the handle
    // shareable. Sends are queue pushes, never blocking on the loop.
    tx: Mutex<glib::Sender<LoopRequest>>,
}

impl RequestHandle for GtkRequestHandle {
    fn send(&self, request: LoopRequest) {
        if self.tx.lock().send(request).is_err() {
            // Receiver detached: the loop already dispatched Quit.
            warn!(?request, "menu loop gone; request dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carta_menu::MenuWorker;
    use std::time::Duration;

    // The real-toolkit path needs a display session; run explicitly with
    // `cargo test -p carta-gtk -- --ignored` on a desktop.
    #[test]
    #[ignore = "requires a display session"]
    fn gtk_worker_starts_and_stops() {
        let mut worker = MenuWorker::new(GtkBackend::new());
        worker.start();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !worker.is_running() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(worker.is_running());

        worker.handle().report_pointer(120, 340);
        worker.stop(Some(Duration::from_secs(5))).unwrap();
    }
}
