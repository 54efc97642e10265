//! Shared pointer-location state.

use std::sync::atomic::{AtomicU64, Ordering};

/// Last reported pointer location, in screen coordinates.
///
/// Written by the UI thread on every pointer-motion event; read by the
/// menu worker when a popup is dispatched. Both coordinates live in a
/// single `AtomicU64` (x in the high 32 bits, y in the low 32 bits) so a
/// reader can never observe a half-written pair.
///
/// Writes are last-write-wins. A popup racing a pointer update may anchor
/// one motion event behind, which is harmless — the contract is only that
/// the anchor is never torn and never arbitrarily stale.
#[derive(Debug)]
pub struct AnchorCell {
    packed: AtomicU64,
}

impl AnchorCell {
    /// Create a cell anchored at the origin.
    pub fn new() -> Self {
        Self {
            packed: AtomicU64::new(Self::pack(0, 0)),
        }
    }

    /// Store a new pointer location. Wait-free, never allocates.
    #[inline]
    pub fn set(&self, x: i32, y: i32) {
        self.packed.store(Self::pack(x, y), Ordering::Release);
    }

    /// Read the most recently stored location.
    #[inline]
    pub fn get(&self) -> (i32, i32) {
        Self::unpack(self.packed.load(Ordering::Acquire))
    }

    fn pack(x: i32, y: i32) -> u64 {
        (u64::from(x as u32) << 32) | u64::from(y as u32)
    }

    fn unpack(packed: u64) -> (i32, i32) {
        ((packed >> 32) as u32 as i32, packed as u32 as i32)
    }
}

impl Default for AnchorCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_roundtrip() {
        let cell = AnchorCell::new();
        assert_eq!(cell.get(), (0, 0));

        cell.set(120, 340);
        assert_eq!(cell.get(), (120, 340));
    }

    #[test]
    fn anchor_negative_coordinates() {
        // Multi-monitor setups can place the pointer at negative screen
        // coordinates; packing must survive the sign bit.
        let cell = AnchorCell::new();
        cell.set(-1920, -75);
        assert_eq!(cell.get(), (-1920, -75));

        cell.set(i32::MIN, i32::MAX);
        assert_eq!(cell.get(), (i32::MIN, i32::MAX));
    }

    #[test]
    fn anchor_last_write_wins() {
        let cell = AnchorCell::new();
        for i in 0..100 {
            cell.set(i, i * 2);
        }
        assert_eq!(cell.get(), (99, 198));
    }
}
