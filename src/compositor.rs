//! Bitmap caches derived from the sprite sheet and the tile map.
//!
//! Two caches are kept:
//!
//! * the sprite-sheet bitmap, the palette-resolved image of every sheet pixel,
//!   rebuilt in full when `sheet_dirty` is set and per pixel after a single
//!   sheet write;
//! * the map bitmap, one sprite cell per map cell, rebuilt for the whole map
//!   when the map's `all_dirty` flag is set and otherwise only for cells with
//!   their own dirty bit.
//!
//! Any read of the sheet bitmap first checks `sheet_dirty` and rebuilds, so a
//! blit never sees stale pixels. Without the per-cell bits a 128×32 map
//! would be recomposited every frame.

use crate::bitmap::{Bitmap, Rect, Surface, Transform};
use crate::palette::{rgb_to_rgba, Palette};
use crate::sheet::SpriteSheet;
use crate::tilemap::{SpriteFlags, TileMap};

/// Options for [`Compositor::draw_sprite`]; mirrors macroquad's
/// `DrawTextureParams` usage: `SpriteParams { flip_x: true, ..Default::default() }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteParams {
    /// Width in cells
    pub w: u32,
    /// Height in cells
    pub h: u32,
    /// Mirror horizontally
    pub flip_x: bool,
    /// Mirror vertically
    pub flip_y: bool,
}

impl Default for SpriteParams {
    fn default() -> Self {
        Self {
            w: 1,
            h: 1,
            flip_x: false,
            flip_y: false,
        }
    }
}

/// A rectangle of map cells and where to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapRegion {
    /// First map column
    pub cel_x: i32,
    /// First map row
    pub cel_y: i32,
    /// Screen x
    pub sx: i32,
    /// Screen y
    pub sy: i32,
    /// Columns to draw
    pub cel_w: i32,
    /// Rows to draw
    pub cel_h: i32,
}

/// Owns the sheet and map caches and draws sprites and maps from them.
#[derive(Debug)]
pub struct Compositor {
    sheet_cache: Bitmap,
    sheet_dirty: bool,
    map_cache: Bitmap,
}

impl Compositor {
    /// Caches sized for `sheet` and `map`, both dirty.
    pub fn new(sheet: &SpriteSheet, map: &TileMap) -> Self {
        let mut compositor = Self {
            sheet_cache: Bitmap::new(0, 0),
            sheet_dirty: true,
            map_cache: Bitmap::new(0, 0),
        };
        compositor.reallocate(sheet, map);
        compositor
    }

    /// Drops both caches and allocates blank ones sized to the stores. The
    /// sheet is left dirty; the caller is responsible for flagging the map.
    pub fn reallocate(&mut self, sheet: &SpriteSheet, map: &TileMap) {
        let cell = sheet.cell();
        self.sheet_cache = Bitmap::new(sheet.width(), sheet.height());
        self.map_cache = Bitmap::new(
            map.width().saturating_mul(cell.w),
            map.height().saturating_mul(cell.h),
        );
        self.sheet_dirty = true;
        log::debug!(
            target: "compositor",
            "caches reallocated: sheet {}x{}, map {}x{}",
            self.sheet_cache.width(),
            self.sheet_cache.height(),
            self.map_cache.width(),
            self.map_cache.height()
        );
    }

    /// Forces a full sheet cache rebuild on next use.
    pub fn mark_sheet_dirty(&mut self) {
        self.sheet_dirty = true;
    }

    /// Whether the sheet cache awaits a rebuild.
    pub fn is_sheet_dirty(&self) -> bool {
        self.sheet_dirty
    }

    fn paint_pixel(cache: &mut Bitmap, sheet: &SpriteSheet, palette: &Palette, x: i32, y: i32) {
        let Some(index) = sheet.get(x, y) else {
            return;
        };
        if palette.is_transparent(index) {
            cache.clear_rect(Rect::new(x, y, 1, 1));
        } else {
            cache.put_pixel(x, y, rgb_to_rgba(palette.resolve(index)));
        }
    }

    /// Resolves every sheet pixel through the palette.
    pub fn redraw_all(&mut self, sheet: &SpriteSheet, palette: &Palette) {
        for y in 0..sheet.height() as i32 {
            for x in 0..sheet.width() as i32 {
                Self::paint_pixel(&mut self.sheet_cache, sheet, palette, x, y);
            }
        }
        self.sheet_dirty = false;
    }

    /// Refreshes one pixel after a sheet write. A pending full rebuild runs
    /// instead, which covers the pixel too.
    pub fn redraw_pixel(&mut self, sheet: &SpriteSheet, palette: &Palette, x: i32, y: i32) {
        if self.sheet_dirty {
            self.redraw_all(sheet, palette);
        } else {
            Self::paint_pixel(&mut self.sheet_cache, sheet, palette, x, y);
        }
    }

    #[inline]
    fn ensure_sheet(&mut self, sheet: &SpriteSheet, palette: &Palette) {
        if self.sheet_dirty {
            self.redraw_all(sheet, palette);
        }
    }

    /// The sprite-sheet bitmap, rebuilt first if it is stale.
    pub fn sheet_bitmap(&mut self, sheet: &SpriteSheet, palette: &Palette) -> &Bitmap {
        self.ensure_sheet(sheet, palette);
        &self.sheet_cache
    }

    /// The map bitmap as of the last [`Compositor::refresh_map`].
    pub fn map_bitmap(&self) -> &Bitmap {
        &self.map_cache
    }

    fn rebuild_cell(&mut self, map: &TileMap, sheet: &SpriteSheet, palette: &Palette, x: i32, y: i32) {
        let cell = sheet.cell();
        let n = map.get_cell(x, y).unwrap_or(0);
        let dest = Rect::new(x * cell.w as i32, y * cell.h as i32, cell.w as i32, cell.h as i32);
        self.map_cache.clear_rect(dest);
        self.ensure_sheet(sheet, palette);
        self.map_cache.draw_bitmap(
            &self.sheet_cache,
            sheet.source_rect(n, 1, 1),
            Transform::translate(dest.x, dest.y),
        );
    }

    /// Brings the map bitmap up to date and returns how many cells were
    /// recomposited. A second call with no mutation in between returns 0.
    pub fn refresh_map(&mut self, map: &mut TileMap, sheet: &SpriteSheet, palette: &Palette) -> usize {
        let (w, h) = (map.width() as i32, map.height() as i32);
        let mut rebuilt = 0;

        if map.take_all_dirty() {
            for y in 0..h {
                for x in 0..w {
                    map.take_cell_dirty((y * w + x) as usize);
                    self.rebuild_cell(map, sheet, palette, x, y);
                    rebuilt += 1;
                }
            }
        }

        for y in 0..h {
            for x in 0..w {
                if map.take_cell_dirty((y * w + x) as usize) {
                    self.rebuild_cell(map, sheet, palette, x, y);
                    rebuilt += 1;
                }
            }
        }

        if rebuilt > 0 {
            log::trace!(target: "compositor", "recomposited {rebuilt} map cells");
        }
        rebuilt
    }

    /// Blits `params.w × params.h` cells starting at sprite `n` to `(x, y)`.
    /// Flips are a translation to the far edge plus a -1 scale.
    pub fn draw_sprite<S: Surface>(
        &mut self,
        target: &mut S,
        sheet: &SpriteSheet,
        palette: &Palette,
        n: u32,
        x: i32,
        y: i32,
        params: SpriteParams,
    ) {
        self.ensure_sheet(sheet, palette);
        let src = sheet.source_rect(n, params.w, params.h);
        let transform = Transform::mirrored(x, y, src.w, src.h, params.flip_x, params.flip_y);
        target.draw_bitmap(&self.sheet_cache, src, transform);
    }

    /// Layer 0 path: one blit out of the reconciled map bitmap.
    pub fn draw_map_cached<S: Surface>(
        &mut self,
        target: &mut S,
        map: &mut TileMap,
        sheet: &SpriteSheet,
        palette: &Palette,
        region: MapRegion,
    ) {
        self.refresh_map(map, sheet, palette);
        let cell = sheet.cell();
        let (cw, ch) = (cell.w as i32, cell.h as i32);
        let src = Rect::new(
            region.cel_x * cw,
            region.cel_y * ch,
            region.cel_w * cw,
            region.cel_h * ch,
        );
        target.draw_bitmap(&self.map_cache, src, Transform::translate(region.sx, region.sy));
    }

    /// Filtered path for a nonzero `layer`: bypasses the map bitmap and blits
    /// each cell whose sprite flags contain every bit of `layer`. Returns the
    /// number of cells drawn.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_map_layer<S: Surface>(
        &mut self,
        target: &mut S,
        map: &TileMap,
        flags: &SpriteFlags,
        sheet: &SpriteSheet,
        palette: &Palette,
        region: MapRegion,
        layer: u8,
    ) -> usize {
        let cell = sheet.cell();
        let mut drawn = 0;
        for j in 0..region.cel_h {
            for i in 0..region.cel_w {
                let Some(n) = map.get_cell(region.cel_x + i, region.cel_y + j) else {
                    continue;
                };
                if flags.matches(n, layer) {
                    self.draw_sprite(
                        target,
                        sheet,
                        palette,
                        n,
                        region.sx + i * cell.w as i32,
                        region.sy + j * cell.h as i32,
                        SpriteParams::default(),
                    );
                    drawn += 1;
                }
            }
        }
        drawn
    }
}
