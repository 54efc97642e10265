//! Thread-safe shared state for a carta plugin instance.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Inner storage for plugin shared state.
///
/// Held behind an `Arc` so [`CartaShared`] can be cheaply cloned into
/// `'static + Send` GUI closures.
struct CartaSharedData {
    /// Sample rate as f64 bit-cast to u64 for atomic access. Zero until
    /// the first activation.
    sample_rate: AtomicU64,
}

/// Shared state accessible from all plugin threads.
///
/// The plugin is a parameterless passthrough; the only datum the audio
/// side shares with the control surface is the active sample rate, which
/// the surface's diagnostic rows display.
#[derive(Clone)]
pub struct CartaShared {
    inner: Arc<CartaSharedData>,
}

impl CartaShared {
    /// Create shared state with no sample rate yet.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CartaSharedData {
                sample_rate: AtomicU64::new(0.0_f64.to_bits()),
            }),
        }
    }

    /// Record the sample rate the host activated us with (audio thread).
    pub fn set_sample_rate(&self, rate: f64) {
        self.inner
            .sample_rate
            .store(rate.to_bits(), Ordering::Release);
    }

    /// The most recently recorded sample rate, zero before activation.
    pub fn sample_rate(&self) -> f64 {
        f64::from_bits(self.inner.sample_rate.load(Ordering::Acquire))
    }
}

impl Default for CartaShared {
    fn default() -> Self {
        Self::new()
    }
}

impl clack_plugin::prelude::PluginShared<'_> for CartaShared {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_defaults_to_zero() {
        let shared = CartaShared::new();
        assert_eq!(shared.sample_rate(), 0.0);
    }

    #[test]
    fn sample_rate_roundtrip() {
        let shared = CartaShared::new();
        shared.set_sample_rate(48000.0);
        assert_eq!(shared.sample_rate(), 48000.0);

        // Clones observe the same instance.
        let clone = shared.clone();
        clone.set_sample_rate(44100.0);
        assert_eq!(shared.sample_rate(), 44100.0);
    }
}
