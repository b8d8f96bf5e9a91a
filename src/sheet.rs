use crate::bitmap::Rect;
use crate::error::CartError;

/// Pixel dimensions of one sprite/tile cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    /// Width in pixels
    pub w: u32,
    /// Height in pixels
    pub h: u32,
}

impl Default for CellSize {
    fn default() -> Self {
        Self { w: 8, h: 8 }
    }
}

/// Indexed pixel buffer holding every sprite's source pixels.
///
/// The sheet is `cols × rows` cells; pixels are palette indices, stored
/// row-major. This is the only source of truth for sprite pixels, the
/// compositor's bitmap is derived from it.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    cols: u32,
    rows: u32,
    cell: CellSize,
    pixels: Vec<u32>,
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self::new(16, 16, CellSize::default())
    }
}

impl SpriteSheet {
    /// Sheet of `cols × rows` cells, all index 0.
    pub fn new(cols: u32, rows: u32, cell: CellSize) -> Self {
        let mut sheet = Self {
            cols: 0,
            rows: 0,
            cell,
            pixels: Vec::new(),
        };
        sheet.resize(cols, rows, cell);
        sheet
    }

    /// Reallocates to `cols*cell.w × rows*cell.h` zeroed pixels. Previous
    /// contents are dropped, not copied.
    pub fn resize(&mut self, cols: u32, rows: u32, cell: CellSize) {
        self.cols = cols;
        self.rows = rows;
        self.cell = cell;
        self.pixels = vec![0; self.width() as usize * self.height() as usize];
        log::debug!(target: "sheet", "sprite sheet reallocated to {}x{} px", self.width(), self.height());
    }

    /// Cells per row.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Cells per column.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Cell size in pixels.
    pub fn cell(&self) -> CellSize {
        self.cell
    }

    /// Width in pixels, saturating at `u32::MAX`.
    pub fn width(&self) -> u32 {
        self.cols.saturating_mul(self.cell.w)
    }

    /// Height in pixels, saturating at `u32::MAX`.
    pub fn height(&self) -> u32 {
        self.rows.saturating_mul(self.cell.h)
    }

    /// Number of sprites.
    pub fn sprite_count(&self) -> u32 {
        self.cols.saturating_mul(self.rows)
    }

    /// Row-major palette indices.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return None;
        }
        Some(y as usize * self.width() as usize + x as usize)
    }

    /// Index at pixel `(x, y)`, `None` outside the sheet.
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Sets pixel `(x, y)`, fails outside the sheet.
    pub fn set(&mut self, x: i32, y: i32, index: u32) -> Result<(), CartError> {
        let i = self.offset(x, y).ok_or_else(|| CartError::OutOfBounds {
            what: "sprite sheet",
            x,
            y,
            width: self.width(),
            height: self.height(),
        })?;
        self.pixels[i] = index;
        Ok(())
    }

    /// Sheet column of sprite `n`.
    #[inline]
    pub fn sheet_x(&self, n: u32) -> u32 {
        if self.cols == 0 {
            return 0;
        }
        n % self.cols
    }

    /// Sheet row of sprite `n`. Indices past the last sprite wrap around to
    /// the start of the sheet instead of addressing pixels that don't exist.
    #[inline]
    pub fn sheet_y(&self, n: u32) -> u32 {
        match self.sprite_count() {
            0 => 0,
            count => (n % count) / self.cols,
        }
    }

    /// Pixel rectangle covering `w × h` cells starting at sprite `n`.
    pub fn source_rect(&self, n: u32, w: u32, h: u32) -> Rect {
        Rect::new(
            (self.sheet_x(n) * self.cell.w) as i32,
            (self.sheet_y(n) * self.cell.h) as i32,
            (w * self.cell.w) as i32,
            (h * self.cell.h) as i32,
        )
    }

    /// Sprite whose cell contains pixel `(x, y)`.
    pub fn sprite_at(&self, x: u32, y: u32) -> u32 {
        (y / self.cell.h.max(1)) * self.cols + x / self.cell.w.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_and_bounds() {
        let mut sheet = SpriteSheet::new(2, 2, CellSize { w: 4, h: 4 });
        assert_eq!((sheet.width(), sheet.height()), (8, 8));
        sheet.set(7, 7, 3).unwrap();
        assert_eq!(sheet.get(7, 7), Some(3));
        assert_eq!(sheet.get(8, 0), None);

        let err = sheet.set(8, 0, 1).unwrap_err();
        assert!(matches!(err, CartError::OutOfBounds { x: 8, y: 0, .. }));
        assert!(sheet.set(-1, 0, 1).is_err());
    }

    #[test]
    fn resize_drops_contents() {
        let mut sheet = SpriteSheet::default();
        sheet.set(3, 3, 9).unwrap();
        sheet.resize(16, 16, CellSize { w: 4, h: 4 });
        assert_eq!(sheet.pixels().len(), 64 * 64);
        assert!(sheet.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn sprite_index_wraps_past_the_sheet() {
        let sheet = SpriteSheet::default();
        let n = sheet.cols() * sheet.rows() + 5;
        assert_eq!(sheet.sheet_y(n), sheet.sheet_y(5));
        assert_eq!(sheet.sheet_x(n), sheet.sheet_x(5));
        assert_eq!((sheet.sheet_x(17), sheet.sheet_y(17)), (1, 1));
    }

    #[test]
    fn source_rect_and_sprite_at() {
        let sheet = SpriteSheet::default();
        assert_eq!(sheet.source_rect(18, 2, 1), Rect::new(16, 8, 16, 8));
        assert_eq!(sheet.sprite_at(17, 9), 18);
    }
}
