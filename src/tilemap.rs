use crate::error::CartError;

/// Map width in cells when not configured
pub const DEFAULT_MAP_WIDTH: u32 = 128;
/// Map height in cells when not configured
pub const DEFAULT_MAP_HEIGHT: u32 = 32;

/// Grid of sprite references with two-level dirty tracking: a per-cell
/// bitmap plus a flag covering the whole map.
#[derive(Debug, Clone)]
pub struct TileMap {
    width: u32,
    height: u32,
    cells: Vec<u32>,
    dirty: Vec<bool>,
    all_dirty: bool,
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_WIDTH, DEFAULT_MAP_HEIGHT)
    }
}

impl TileMap {
    /// Map of `width × height` cells, all sprite 0 and all dirty.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![0; len],
            dirty: vec![false; len],
            all_dirty: true,
        }
    }

    /// Full reallocation; old cells are not copied.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major sprite indices.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Sprite index at `(x, y)`, `None` outside the map.
    pub fn get_cell(&self, x: i32, y: i32) -> Option<u32> {
        self.offset(x, y).map(|i| self.cells[i])
    }

    /// Stores `sprite` at `(x, y)` and marks the cell dirty. Writing the value
    /// already there changes nothing and returns `Ok(false)`.
    pub fn set_cell(&mut self, x: i32, y: i32, sprite: u32) -> Result<bool, CartError> {
        let i = self.offset(x, y).ok_or_else(|| CartError::OutOfBounds {
            what: "map",
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        if self.cells[i] == sprite {
            return Ok(false);
        }
        self.cells[i] = sprite;
        self.dirty[i] = true;
        Ok(true)
    }

    /// Marks every cell for rebuild.
    pub fn mark_all_dirty(&mut self) {
        self.all_dirty = true;
    }

    /// Whether the whole map awaits a rebuild.
    pub fn is_all_dirty(&self) -> bool {
        self.all_dirty
    }

    /// Whether cell `(x, y)` awaits a rebuild.
    pub fn is_dirty(&self, x: i32, y: i32) -> bool {
        self.all_dirty || self.offset(x, y).is_some_and(|i| self.dirty[i])
    }

    /// Cells with their own dirty bit set.
    pub fn dirty_count(&self) -> usize {
        self.dirty.iter().filter(|&&d| d).count()
    }

    /// Marks every cell that shows sprite `n` once indices wrap modulo
    /// `sprite_count`.
    pub fn mark_sprite_dirty(&mut self, n: u32, sprite_count: u32) {
        if sprite_count == 0 {
            self.all_dirty = true;
            return;
        }
        let n = n % sprite_count;
        for (cell, dirty) in self.cells.iter().zip(self.dirty.iter_mut()) {
            if cell % sprite_count == n {
                *dirty = true;
            }
        }
    }

    /// Clears the whole-map flag, returning whether it was set.
    pub(crate) fn take_all_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.all_dirty, false)
    }

    /// Clears the dirty bit of cell `i` (row-major), returning whether it was set.
    pub(crate) fn take_cell_dirty(&mut self, i: usize) -> bool {
        std::mem::replace(&mut self.dirty[i], false)
    }
}

/// Per-sprite flag bytes, used as layer masks by filtered map draws.
#[derive(Debug, Clone, Default)]
pub struct SpriteFlags {
    bits: Vec<u8>,
}

impl SpriteFlags {
    /// `count` sprites with no flags set.
    pub fn new(count: u32) -> Self {
        Self {
            bits: vec![0; count as usize],
        }
    }

    /// Drops every flag and resizes to `count` sprites.
    pub fn reset(&mut self, count: u32) {
        *self = Self::new(count);
    }

    /// Number of sprites covered.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Covers no sprites.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Raw flag bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bits
    }

    /// Flag byte of sprite `n`, 0 when out of range.
    pub fn get(&self, n: u32) -> u8 {
        self.bits.get(n as usize).copied().unwrap_or(0)
    }

    /// Sets the flag byte of sprite `n`.
    pub fn set(&mut self, n: u32, flags: u8) {
        match self.bits.get_mut(n as usize) {
            Some(slot) => *slot = flags,
            None => log::warn!(target: "flags", "ignoring flags for sprite {n}, only {} sprites", self.bits.len()),
        }
    }

    /// One flag bit of sprite `n`.
    pub fn get_bit(&self, n: u32, bit: u8) -> bool {
        bit < 8 && self.get(n) & (1 << bit) != 0
    }

    /// Sets one flag bit of sprite `n`.
    pub fn set_bit(&mut self, n: u32, bit: u8, value: bool) {
        if bit >= 8 {
            log::warn!(target: "flags", "flag bit {bit} out of range");
            return;
        }
        let mask = 1u8 << bit;
        let flags = if value {
            self.get(n) | mask
        } else {
            self.get(n) & !mask
        };
        self.set(n, flags);
    }

    /// `true` when every bit of `layer` is set for sprite `n`.
    #[inline]
    pub fn matches(&self, n: u32, layer: u8) -> bool {
        self.get(n) & layer == layer
    }
}
