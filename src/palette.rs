//! Indexed color table.
//!
//! Pixels everywhere in the engine are small integers naming an entry in
//! this table. Colors are plain `0xRRGGBB` integers; rendering resolves an
//! index with modulo wrap so out-of-range indices never fail at draw time.

use macroquad::color::Color;

/// Number of entries in the default palette.
pub const DEFAULT_PALETTE_SIZE: usize = 16;

const DEFAULT_COLORS: [u32; DEFAULT_PALETTE_SIZE] = [
    0x000000, 0x1D2B53, 0x7E2553, 0x008751, 0xAB5236, 0x5F574F, 0xC2C3C7, 0xFFF1E8,
    0xFF004D, 0xFFA300, 0xFFEC27, 0x00E436, 0x29ADFF, 0x83769C, 0xFF77A8, 0xFFCCAA,
];

/// The 16 colors a fresh engine starts with.
pub fn default_palette() -> Vec<u32> {
    DEFAULT_COLORS.to_vec()
}

/// `0xRRGGBB` -> `#rrggbb`
pub fn int_to_hex(rgb: u32) -> String {
    format!("#{:06x}", rgb & 0xFF_FFFF)
}

/// Opaque RGBA bytes for a 24-bit color.
#[inline]
pub fn rgb_to_rgba(rgb: u32) -> [u8; 4] {
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xFF]
}

/// Drops alpha and packs the channels back into `0xRRGGBB`.
#[inline]
pub fn rgba_to_rgb(px: [u8; 4]) -> u32 {
    (px[0] as u32) << 16 | (px[1] as u32) << 8 | px[2] as u32
}

/// 24-bit color as a macroquad [`Color`].
pub fn to_color(rgb: u32) -> Color {
    let [r, g, b, a] = rgb_to_rgba(rgb);
    Color::from_rgba(r, g, b, a)
}

/// One row of the table, as handed out by [`Palette::entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Position in the table
    pub index: u32,
    /// `0xRRGGBB`
    pub rgb: u32,
    /// Pixels of this index are cleared instead of painted
    pub transparent: bool,
}

/// Color table plus per-index transparency flags.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<u32>,
    hex: Vec<String>,
    transparent: Vec<bool>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(&DEFAULT_COLORS)
    }
}

impl Palette {
    /// Table with the given colors; only index 0 starts out transparent.
    pub fn new(colors: &[u32]) -> Self {
        let mut transparent = vec![false; DEFAULT_PALETTE_SIZE.max(colors.len())];
        transparent[0] = true;
        let mut palette = Self {
            colors: Vec::new(),
            hex: Vec::new(),
            transparent,
        };
        palette.set_palette(colors);
        palette
    }

    /// Replaces the whole table. Transparency flags are kept.
    pub fn set_palette(&mut self, colors: &[u32]) {
        self.colors = colors.iter().map(|c| c & 0xFF_FFFF).collect();
        self.hex = self.colors.iter().copied().map(int_to_hex).collect();
    }

    /// Replaces one slot, padding the table with black when `index` is past the end.
    pub fn set_entry(&mut self, index: usize, rgb: u32) {
        let mut colors = self.colors.clone();
        if colors.len() <= index {
            colors.resize(index + 1, 0x000000);
        }
        colors[index] = rgb;
        self.set_palette(&colors);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// No entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Colors as `0xRRGGBB`.
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    /// Strict lookup.
    pub fn get(&self, index: u32) -> Option<u32> {
        self.colors.get(index as usize).copied()
    }

    /// Render-time lookup: wraps `index` modulo the table length.
    #[inline]
    pub fn resolve(&self, index: u32) -> u32 {
        if self.colors.is_empty() {
            return 0x000000;
        }
        self.colors[index as usize % self.colors.len()]
    }

    /// Wrapped `#rrggbb` string of an index.
    pub fn hex(&self, index: u32) -> &str {
        if self.hex.is_empty() {
            return "#000000";
        }
        &self.hex[index as usize % self.hex.len()]
    }

    /// Whether `index` is skipped when drawing, false past the table.
    pub fn is_transparent(&self, index: u32) -> bool {
        self.transparent.get(index as usize).copied().unwrap_or(false)
    }

    /// Returns whether the flag actually changed.
    pub fn set_transparent(&mut self, index: u32, transparent: bool) -> bool {
        let i = index as usize;
        if self.transparent.len() <= i {
            if !transparent {
                return false;
            }
            self.transparent.resize(i + 1, false);
        }
        let changed = self.transparent[i] != transparent;
        self.transparent[i] = transparent;
        changed
    }

    /// Exact reverse lookup of a color; the first matching index wins.
    pub fn index_of(&self, rgb: u32) -> Option<u32> {
        self.colors
            .iter()
            .position(|&c| c == rgb & 0xFF_FFFF)
            .map(|i| i as u32)
    }

    /// Every entry with its transparency flag.
    pub fn entries(&self) -> impl Iterator<Item = PaletteEntry> + '_ {
        self.colors.iter().enumerate().map(|(i, &rgb)| PaletteEntry {
            index: i as u32,
            rgb,
            transparent: self.is_transparent(i as u32),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_only_index_zero_transparent() {
        let p = Palette::default();
        assert_eq!(p.len(), 16);
        assert!(p.is_transparent(0));
        assert!((1..16).all(|i| !p.is_transparent(i)));
    }

    #[test]
    fn resolve_wraps_out_of_range_indices() {
        let p = Palette::new(&[0x111111, 0x222222, 0x333333]);
        assert_eq!(p.resolve(4), 0x222222);
        assert_eq!(p.get(4), None);
        assert_eq!(p.hex(3), "#111111");
    }

    #[test]
    fn set_entry_pads_with_black() {
        let mut p = Palette::new(&[0xFFFFFF]);
        p.set_entry(3, 0x123456);
        assert_eq!(p.colors(), &[0xFFFFFF, 0x000000, 0x000000, 0x123456]);
        assert_eq!(p.hex(3), "#123456");
    }

    #[test]
    fn reverse_lookup_is_exact() {
        let p = Palette::default();
        assert_eq!(p.index_of(0xFF004D), Some(8));
        assert_eq!(p.index_of(0xFF004E), None);
    }

    #[test]
    fn rgba_conversions_round_trip() {
        assert_eq!(rgb_to_rgba(0x29ADFF), [0x29, 0xAD, 0xFF, 0xFF]);
        assert_eq!(rgba_to_rgb([0x29, 0xAD, 0xFF, 0x00]), 0x29ADFF);
        assert_eq!(int_to_hex(0x0000ff), "#0000ff");
    }

    #[test]
    fn transparency_reports_changes() {
        let mut p = Palette::default();
        assert!(!p.set_transparent(0, true));
        assert!(p.set_transparent(5, true));
        assert!(p.is_transparent(5));
        assert!(!p.set_transparent(40, false));
        assert!(!p.is_transparent(40));
    }
}
