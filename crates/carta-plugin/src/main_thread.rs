//! Main-thread plugin glue: audio ports and the GUI lifecycle.
//!
//! All methods here run on the host's main thread — never on the audio
//! thread. The GUI extension is where the control surface (and with it
//! the menu worker) is created and torn down: `set_parent` opens the
//! editor, `destroy` drops it.

use std::sync::Arc;

use clack_extensions::audio_ports::{
    AudioPortFlags, AudioPortInfo, AudioPortInfoWriter, AudioPortType, PluginAudioPortsImpl,
};
use clack_extensions::gui::{
    AspectRatioStrategy, GuiApiType, GuiConfiguration, GuiResizeHints, GuiSize, PluginGuiImpl,
    Window,
};
use clack_plugin::prelude::*;

use crate::gui::{
    MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH, PendingResize, SURFACE_HEIGHT, SURFACE_WIDTH,
    SurfaceEditor,
};
use crate::shared::CartaShared;

/// Main-thread state for a carta plugin instance.
pub struct CartaMainThread<'a> {
    shared: &'a CartaShared,
    /// DPI scale factor from the host (default 1.0).
    scale: f64,
    /// Atomic resize channel shared with the surface window handler.
    pending_resize: Arc<PendingResize>,
    /// Live editor between `set_parent` and `destroy`. Dropping it stops
    /// the menu worker before the window goes away.
    editor: Option<SurfaceEditor>,
}

impl<'a> CartaMainThread<'a> {
    /// Create a new main-thread handler referencing the shared state.
    pub fn new(shared: &'a CartaShared) -> Self {
        Self {
            shared,
            scale: 1.0,
            pending_resize: Arc::new(PendingResize::new(SURFACE_WIDTH, SURFACE_HEIGHT)),
            editor: None,
        }
    }
}

impl<'a> PluginMainThread<'a, CartaShared> for CartaMainThread<'a> {}

// ── GUI Extension ──────────────────────────────────────────────────────────

impl PluginGuiImpl for CartaMainThread<'_> {
    fn is_api_supported(&mut self, config: GuiConfiguration) -> bool {
        let platform_api = GuiApiType::default_for_current_platform();
        !config.is_floating && platform_api == Some(config.api_type)
    }

    fn get_preferred_api(&mut self) -> Option<GuiConfiguration<'_>> {
        let api = GuiApiType::default_for_current_platform();
        Some(GuiConfiguration {
            api_type: api?,
            is_floating: false,
        })
    }

    fn create(&mut self, _config: GuiConfiguration) -> Result<(), PluginError> {
        Ok(())
    }

    fn destroy(&mut self) {
        // Exactly one stop per surface instance, paired with the start in
        // SurfaceEditor::open.
        self.editor = None;
    }

    fn set_scale(&mut self, scale: f64) -> Result<(), PluginError> {
        self.scale = scale;
        Ok(())
    }

    fn get_size(&mut self) -> Option<GuiSize> {
        let (width, height) = self.pending_resize.get();
        Some(GuiSize { width, height })
    }

    fn can_resize(&mut self) -> bool {
        true
    }

    fn get_resize_hints(&mut self) -> Option<GuiResizeHints> {
        Some(GuiResizeHints {
            can_resize_horizontally: true,
            can_resize_vertically: true,
            strategy: AspectRatioStrategy::Disregard,
        })
    }

    fn adjust_size(&mut self, size: GuiSize) -> Option<GuiSize> {
        Some(GuiSize {
            width: size.width.clamp(MIN_WIDTH, MAX_WIDTH),
            height: size.height.clamp(MIN_HEIGHT, MAX_HEIGHT),
        })
    }

    fn set_size(&mut self, size: GuiSize) -> Result<(), PluginError> {
        let width = size.width.clamp(MIN_WIDTH, MAX_WIDTH);
        let height = size.height.clamp(MIN_HEIGHT, MAX_HEIGHT);
        self.pending_resize.set(width, height);
        Ok(())
    }

    fn set_parent(&mut self, window: Window) -> Result<(), PluginError> {
        use raw_window_handle::HasRawWindowHandle;

        self.editor = Some(SurfaceEditor::open(
            window.raw_window_handle(),
            self.shared.clone(),
            self.scale,
            Arc::clone(&self.pending_resize),
        ));
        Ok(())
    }

    fn show(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    fn hide(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    fn set_transient(&mut self, _window: Window) -> Result<(), PluginError> {
        Ok(())
    }
}

// ── Audio Ports Extension ───────────────────────────────────────────────────

impl PluginAudioPortsImpl for CartaMainThread<'_> {
    fn count(&mut self, _is_input: bool) -> u32 {
        1
    }

    fn get(&mut self, index: u32, _is_input: bool, writer: &mut AudioPortInfoWriter) {
        if index == 0 {
            writer.set(&AudioPortInfo {
                id: ClapId::new(0),
                name: b"Main",
                channel_count: 2,
                flags: AudioPortFlags::IS_MAIN,
                port_type: Some(AudioPortType::STEREO),
                in_place_pair: None,
            });
        }
    }
}
