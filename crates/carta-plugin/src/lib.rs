//! CLAP plugin demonstrating native context menus from an embedded editor.
//!
//! The audio path is a deliberate stereo passthrough — the plugin exists
//! for its control surface. Right-clicking the surface pops a native GTK
//! menu, even though the editor itself renders with egui inside a
//! host-owned window: a `carta_menu::MenuWorker` runs the GTK main loop
//! on a dedicated thread for the surface's whole lifetime, and the
//! surface only ever talks to it through the worker's thread-safe handle.
//!
//! Three execution contexts coexist without blocking each other:
//!
//! | context | owner | role |
//! |---------|-------|------|
//! | audio thread | host | passthrough `process()` |
//! | window thread | baseview | egui frames, pointer events |
//! | menu worker | carta-menu | GTK main loop, popup dispatch |

pub mod audio;
pub mod gui;
pub mod main_thread;
pub mod shared;

mod surface;

pub use audio::CartaAudioProcessor;
pub use main_thread::CartaMainThread;
pub use shared::CartaShared;

use clack_extensions::audio_ports::PluginAudioPorts;
use clack_extensions::gui::PluginGui;
use clack_plugin::prelude::*;

/// The plugin type: passthrough audio plus the native-menu surface.
pub struct NativeMenuPlugin;

impl Plugin for NativeMenuPlugin {
    type AudioProcessor<'a> = CartaAudioProcessor<'a>;
    type Shared<'a> = CartaShared;
    type MainThread<'a> = CartaMainThread<'a>;

    fn declare_extensions(builder: &mut PluginExtensions<Self>, _shared: Option<&CartaShared>) {
        builder.register::<PluginAudioPorts>();
        builder.register::<PluginGui>();
    }
}

impl DefaultPluginFactory for NativeMenuPlugin {
    fn get_descriptor() -> PluginDescriptor {
        use clack_plugin::plugin::features::*;
        PluginDescriptor::new("studio.ampactor.carta", "Carta Native Menu")
            .with_features([AUDIO_EFFECT, UTILITY, STEREO])
    }

    fn new_shared(_host: HostSharedHandle<'_>) -> Result<CartaShared, PluginError> {
        Ok(CartaShared::new())
    }

    fn new_main_thread<'a>(
        _host: HostMainThreadHandle<'a>,
        shared: &'a CartaShared,
    ) -> Result<CartaMainThread<'a>, PluginError> {
        Ok(CartaMainThread::new(shared))
    }
}

clack_plugin::clack_export_entry!(SinglePluginEntry<NativeMenuPlugin>);
