//! The control surface: an egui child window that feeds pointer events to
//! the menu worker and draws diagnostic telemetry.
//!
//! Rendering runs on baseview's window thread through an OpenGL-backed
//! egui context — one per plugin instance, no shared globals. Input
//! handling is one-way by design: pointer motion and right-clicks go to
//! the menu worker, never into egui. The surface displays state; it has
//! no widgets to click.

use std::sync::Arc;

use baseview::gl::GlConfig;
use baseview::{
    Event, EventStatus, MouseButton, MouseEvent, Size, Window, WindowEvent, WindowHandler,
    WindowOpenOptions, WindowScalePolicy,
};
use egui::{Context, Pos2, RawInput, Rect, Vec2};
use raw_window_handle::HasRawWindowHandle;

use carta_menu::MenuHandle;

use crate::gui::{PendingResize, SURFACE_HEIGHT};
use crate::shared::CartaShared;

/// Everything the surface displays, plus its route into the menu worker.
pub struct SurfaceState {
    menu: MenuHandle,
    shared: CartaShared,
    /// Screen offset of the editor window, added to local pointer
    /// coordinates before they are reported. Embedded child windows have
    /// no way to learn their position from baseview, so this stays (0, 0)
    /// unless the host supplies one.
    window_offset: (i32, i32),
    /// Diagnostic text scale: current height relative to the default.
    text_scale: f32,
}

impl SurfaceState {
    /// Create surface state bridging into the given menu handle.
    pub fn new(menu: MenuHandle, shared: CartaShared) -> Self {
        Self {
            menu,
            shared,
            window_offset: (0, 0),
            text_scale: 1.0,
        }
    }
}

/// Translate a window-local pointer position into screen coordinates.
fn to_screen(local: (i32, i32), offset: (i32, i32)) -> (i32, i32) {
    (local.0 + offset.0, local.1 + offset.1)
}

/// Open the surface as a child window inside the host's parent.
pub(crate) fn open_parented<P>(
    parent: &P,
    title: String,
    width: u32,
    height: u32,
    scale: f64,
    pending_resize: Arc<PendingResize>,
    state: SurfaceState,
) -> baseview::WindowHandle
where
    P: HasRawWindowHandle,
{
    let options = WindowOpenOptions {
        title,
        size: Size::new(f64::from(width), f64::from(height)),
        scale: WindowScalePolicy::ScaleFactor(scale),
        gl_config: Some(GlConfig {
            version: (3, 2),
            ..GlConfig::default()
        }),
    };

    baseview::Window::open_parented(parent, options, move |window: &mut Window<'_>| {
        let gl_context = window
            .gl_context()
            .expect("GL context required for the surface");

        #[allow(unsafe_code)]
        // SAFETY: glow::Context wraps raw GL function pointers loaded from
        // the baseview GL context, which is valid for the window lifetime.
        let gl = unsafe {
            Arc::new(glow::Context::from_loader_function(|s| {
                gl_context.get_proc_address(s)
            }))
        };

        let painter = egui_glow::Painter::new(Arc::clone(&gl), "", None, false)
            .expect("Failed to create egui_glow::Painter");

        SurfaceHandler {
            ctx: Context::default(),
            gl,
            painter,
            raw_input: RawInput::default(),
            physical_width: (f64::from(width) * scale) as u32,
            physical_height: (f64::from(height) * scale) as u32,
            scale,
            pending_resize,
            applied_size: (width, height),
            state,
        }
    })
}

/// Baseview window handler driving the egui frame loop for the surface.
struct SurfaceHandler {
    ctx: Context,
    gl: Arc<glow::Context>,
    painter: egui_glow::Painter,
    raw_input: RawInput,
    physical_width: u32,
    physical_height: u32,
    scale: f64,
    /// Host-requested logical size, applied at the top of each frame.
    pending_resize: Arc<PendingResize>,
    applied_size: (u32, u32),
    state: SurfaceState,
}

impl WindowHandler for SurfaceHandler {
    fn on_frame(&mut self, window: &mut Window<'_>) {
        // Apply a host resize before rendering; the Resized event that
        // follows updates the physical dimensions and text scale.
        let wanted = self.pending_resize.get();
        if wanted != self.applied_size {
            self.applied_size = wanted;
            window.resize(Size::new(f64::from(wanted.0), f64::from(wanted.1)));
        }

        let gl_context = window.gl_context().expect("GL context vanished");
        #[allow(unsafe_code)]
        // SAFETY: binds the GL context to this thread; on_frame always
        // runs on the baseview window thread.
        unsafe {
            gl_context.make_current();
        }

        let ppp = self.scale as f32;
        let logical_w = self.physical_width as f32 / ppp;
        let logical_h = self.physical_height as f32 / ppp;
        self.raw_input.screen_rect = Some(Rect::from_min_size(
            Pos2::ZERO,
            Vec2::new(logical_w, logical_h),
        ));

        let full_output = self.ctx.run(self.raw_input.take(), |ctx| {
            draw_diagnostics(ctx, &self.state);
        });

        let primitives = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        #[allow(unsafe_code)]
        // SAFETY: plain GL viewport/clear calls on the bound context.
        unsafe {
            use glow::HasContext;
            self.gl.viewport(
                0,
                0,
                self.physical_width as i32,
                self.physical_height as i32,
            );
            self.gl.clear_color(0.1, 0.1, 0.12, 1.0);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }

        self.painter.paint_and_update_textures(
            [self.physical_width, self.physical_height],
            full_output.pixels_per_point,
            &primitives,
            &full_output.textures_delta,
        );

        gl_context.swap_buffers();
    }

    fn on_event(&mut self, _window: &mut Window<'_>, event: Event) -> EventStatus {
        match event {
            Event::Mouse(MouseEvent::CursorMoved { position, .. }) => {
                let local = (position.x as i32, position.y as i32);
                let (x, y) = to_screen(local, self.state.window_offset);
                self.state.menu.report_pointer(x, y);
                self.ctx.request_repaint();
                EventStatus::Captured
            }
            Event::Mouse(MouseEvent::ButtonPressed {
                button: MouseButton::Right,
                ..
            }) => {
                // Handled whether or not a menu can actually appear.
                self.state.menu.request_popup();
                EventStatus::Captured
            }
            Event::Window(WindowEvent::Resized(info)) => {
                self.physical_width = info.physical_size().width;
                self.physical_height = info.physical_size().height;
                self.scale = info.scale();
                self.state.text_scale =
                    info.logical_size().height as f32 / SURFACE_HEIGHT as f32;
                EventStatus::Captured
            }
            _ => EventStatus::Ignored,
        }
    }
}

impl Drop for SurfaceHandler {
    fn drop(&mut self) {
        self.painter.destroy();
    }
}

/// Draw the fixed-format diagnostic rows.
fn draw_diagnostics(ctx: &Context, state: &SurfaceState) {
    let scale = state.text_scale;
    let (mouse_x, mouse_y) = state.menu.anchor();
    let (offset_x, offset_y) = state.window_offset;
    let sample_rate = state.shared.sample_rate();

    egui::CentralPanel::default().show(ctx, |ui| {
        let row = |text: String| egui::RichText::new(text).size(15.0 * scale).monospace();

        egui::Grid::new("diagnostics")
            .num_columns(2)
            .spacing([16.0 * scale, 4.0 * scale])
            .show(ui, |ui| {
                ui.label(row("Native Menu Test".into()).strong());
                ui.label(row("GTK".into()));
                ui.end_row();

                ui.label(row("Mouse X:".into()));
                ui.label(row(mouse_x.to_string()));
                ui.end_row();

                ui.label(row("Mouse Y:".into()));
                ui.label(row(mouse_y.to_string()));
                ui.end_row();

                ui.label(row("Wnd offset X:".into()));
                ui.label(row(offset_x.to_string()));
                ui.end_row();

                ui.label(row("Wnd offset Y:".into()));
                ui.label(row(offset_y.to_string()));
                ui.end_row();

                ui.label(row("Sample rate:".into()));
                ui.label(row(format!("{sample_rate:.1} Hz")));
                ui.end_row();
            });
    });
}
