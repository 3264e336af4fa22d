//! Deterministic per-instance color assignment
//!
//! A fixed ring of evenly hue-spaced colors. Each stable key (object index,
//! label name, mask label id) is assigned a random slot the first time it is
//! seen and keeps it for the lifetime of the palette.

use std::collections::HashMap;

use labelplay_core::labels::MaskIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of palette slots
pub const PALETTE_SIZE: usize = 36;

/// One palette slot in its different forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteColor {
    /// CSS form, e.g. `hsl(120, 100%, 50%)`
    pub css: String,
    pub rgba: [u8; 4],
    /// RGBA packed little-endian (R in the low byte)
    pub packed: u32,
}

impl PaletteColor {
    fn from_hue(hue: u32) -> Self {
        let rgba = hsl_to_rgba(hue as f32, 1.0, 0.5);
        Self {
            css: format!("hsl({hue}, 100%, 50%)"),
            packed: u32::from_le_bytes(rgba),
            rgba,
        }
    }
}

/// Stable key a color is remembered under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorKey {
    Index(i64),
    Label(String),
    MaskLabel(i64),
}

/// Palette with remembered assignments
pub struct Palette {
    slots: Vec<PaletteColor>,
    assigned: HashMap<ColorKey, usize>,
    raw_colors: HashMap<(i64, u8), [u8; 4]>,
    rng: StdRng,
    mask_lookups: u64,
}

impl Palette {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let step = 360 / PALETTE_SIZE as u32;
        Self {
            slots: (0..PALETTE_SIZE as u32)
                .map(|i| PaletteColor::from_hue(i * step))
                .collect(),
            assigned: HashMap::new(),
            raw_colors: HashMap::new(),
            rng,
            mask_lookups: 0,
        }
    }

    pub fn slots(&self) -> &[PaletteColor] {
        &self.slots
    }

    /// Slot assigned to `key`, assigning one at random if new
    pub fn slot_for(&mut self, key: ColorKey) -> usize {
        let rng = &mut self.rng;
        *self
            .assigned
            .entry(key)
            .or_insert_with(|| rng.gen_range(0..PALETTE_SIZE))
    }

    pub fn entry_for(&mut self, key: ColorKey) -> &PaletteColor {
        let slot = self.slot_for(key);
        &self.slots[slot]
    }

    /// Straight RGBA for a mask label id at `alpha`.
    ///
    /// Label 0 and labels hidden by the mask index are transparent. Every
    /// call counts as one lookup.
    pub fn mask_color(&mut self, label: i64, mask_index: &MaskIndex, alpha: u8) -> [u8; 4] {
        self.mask_lookups += 1;
        if label == 0 || !mask_index.is_visible(label) {
            return [0, 0, 0, 0];
        }
        if let Some(rgba) = self.raw_colors.get(&(label, alpha)) {
            return *rgba;
        }
        let slot = self.slot_for(ColorKey::MaskLabel(label));
        let [r, g, b, _] = self.slots[slot].rgba;
        let rgba = [r, g, b, alpha];
        self.raw_colors.insert((label, alpha), rgba);
        rgba
    }

    /// Number of label→color translations performed so far
    pub fn mask_lookups(&self) -> u64 {
        self.mask_lookups
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(None)
    }
}

fn hsl_to_rgba(h: f32, s: f32, l: f32) -> [u8; 4] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h % 360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_u8(r), to_u8(g), to_u8(b), 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_hue_spaced() {
        let palette = Palette::new(Some(1));
        assert_eq!(palette.slots().len(), PALETTE_SIZE);
        assert_eq!(palette.slots()[0].rgba, [255, 0, 0, 255]);
        assert_eq!(palette.slots()[12].css, "hsl(120, 100%, 50%)");
        assert_eq!(palette.slots()[12].rgba, [0, 255, 0, 255]);
        assert_eq!(palette.slots()[0].packed, 0xff0000ff);
    }

    #[test]
    fn test_same_key_same_color() {
        let mut palette = Palette::new(None);
        let first = palette.slot_for(ColorKey::Index(7));
        for _ in 0..20 {
            palette.slot_for(ColorKey::Label(format!("other{}", first)));
        }
        assert_eq!(palette.slot_for(ColorKey::Index(7)), first);
    }

    #[test]
    fn test_seeded_palettes_agree() {
        let mut a = Palette::new(Some(42));
        let mut b = Palette::new(Some(42));
        for i in 0..10 {
            assert_eq!(a.slot_for(ColorKey::Index(i)), b.slot_for(ColorKey::Index(i)));
        }
    }

    #[test]
    fn test_mask_color_background_and_hidden() {
        let mut palette = Palette::new(Some(3));
        let index = MaskIndex::default();
        assert_eq!(palette.mask_color(0, &index, 200), [0, 0, 0, 0]);
        let color = palette.mask_color(5, &index, 200);
        assert_eq!(color[3], 200);
        assert_eq!(palette.mask_color(5, &index, 200), color);
        assert_eq!(palette.mask_lookups(), 3);
    }
}
