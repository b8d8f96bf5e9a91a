//! RGBA bitmap surfaces and the blit primitive everything composites with.

use macroquad::color::Color;
use macroquad::texture::Image;

/// Fully transparent RGBA.
pub const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// Longest side, in pixels, a bitmap can have.
pub const MAX_SURFACE_SIDE: u32 = u16::MAX as u32;

/// Integer pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Rectangle with its top-left corner at `(x, y)`.
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether `(x, y)` lies inside.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w && y < self.y + self.h
    }

    /// No area left.
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Overlap of two rectangles; empty (zero-sized) when they are disjoint.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.w).min(other.x + other.w);
        let y1 = (self.y + self.h).min(other.y + other.h);
        Rect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }
}

/// Translate-then-scale placement of a blit, with the scale restricted to ±1
/// per axis. A mirrored blit is a translation to the far edge followed by a
/// negative scale; no pixels are reversed by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    /// Horizontal offset
    pub tx: i32,
    /// Vertical offset
    pub ty: i32,
    /// Horizontal scale, `1` or `-1`
    pub sx: i32,
    /// Vertical scale, `1` or `-1`
    pub sy: i32,
}

impl Transform {
    /// Pure translation.
    pub const fn translate(tx: i32, ty: i32) -> Self {
        Self { tx, ty, sx: 1, sy: 1 }
    }

    /// Placement of a `w × h` blit at `(x, y)`, optionally flipped.
    pub fn mirrored(x: i32, y: i32, w: i32, h: i32, flip_x: bool, flip_y: bool) -> Self {
        Self::translate(x + if flip_x { w } else { 0 }, y + if flip_y { h } else { 0 })
            .scale(if flip_x { -1 } else { 1 }, if flip_y { -1 } else { 1 })
    }

    /// Same offset with the given axis scales.
    pub fn scale(self, sx: i32, sy: i32) -> Self {
        Self {
            sx: self.sx * sx.signum(),
            sy: self.sy * sy.signum(),
            ..self
        }
    }

    /// Shifts the origin, leaving the scale alone.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            tx: self.tx + dx,
            ty: self.ty + dy,
            ..self
        }
    }

    /// Destination pixel covering local pixel `(u, v)`. Pixel centers are
    /// mapped, so a -1 scale lands one pixel left of the origin.
    #[inline]
    pub fn apply(&self, u: i32, v: i32) -> (i32, i32) {
        let x = if self.sx < 0 { self.tx - 1 - u } else { self.tx + u };
        let y = if self.sy < 0 { self.ty - 1 - v } else { self.ty + v };
        (x, y)
    }
}

/// Pixel-writable target the compositor blits into.
pub trait Surface {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);
    /// Fills the part of `rect` inside the surface.
    fn fill_rect(&mut self, rect: Rect, rgba: [u8; 4]);
    /// Sets the part of `rect` inside the surface to `CLEAR`.
    fn clear_rect(&mut self, rect: Rect);
    /// Copies `src_rect` of `src` through `transform`. Transparent source
    /// pixels leave the destination untouched.
    fn draw_bitmap(&mut self, src: &Bitmap, src_rect: Rect, transform: Transform);
    /// Pixel at `(x, y)`, `None` outside.
    fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]>;
    /// Writes one pixel, ignored outside.
    fn put_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]);
}

/// RGBA surface backed by a macroquad [`Image`].
#[derive(Clone)]
pub struct Bitmap {
    image: Image,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Bitmap {
    /// Fully transparent bitmap. Dimensions saturate at [`MAX_SURFACE_SIDE`];
    /// the engine rejects sizes past it before allocating.
    pub fn new(width: u32, height: u32) -> Self {
        let w = u16::try_from(width).unwrap_or(u16::MAX);
        let h = u16::try_from(height).unwrap_or(u16::MAX);
        Self {
            image: Image::gen_image_color(w, h, Color::new(0.0, 0.0, 0.0, 0.0)),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width() as u32
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height() as u32
    }

    /// The whole bitmap as a rect at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width() as i32, self.height() as i32)
    }

    /// Backing image, e.g. for uploading into a texture.
    pub fn image(&self) -> &Image {
        &self.image
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return None;
        }
        Some(y as usize * self.width() as usize + x as usize)
    }

    /// Fills every pixel with `CLEAR`.
    pub fn clear(&mut self) {
        self.image.get_image_data_mut().fill(CLEAR);
    }

    /// Like [`Surface::draw_bitmap`], additionally discarding writes outside `clip`.
    pub fn draw_bitmap_clipped(
        &mut self,
        src: &Bitmap,
        src_rect: Rect,
        transform: Transform,
        clip: Option<Rect>,
    ) {
        let visible = src_rect.intersect(&src.bounds());
        // local coordinates stay relative to the requested source origin
        let (du, dv) = (visible.x - src_rect.x, visible.y - src_rect.y);
        let src_px = src.image.get_image_data();
        let src_w = src.width() as usize;
        for v in 0..visible.h {
            for u in 0..visible.w {
                let px = src_px[(visible.y + v) as usize * src_w + (visible.x + u) as usize];
                if px[3] == 0 {
                    continue;
                }
                let (dx, dy) = transform.apply(u + du, v + dv);
                if clip.is_some_and(|c| !c.contains(dx, dy)) {
                    continue;
                }
                if let Some(i) = self.offset(dx, dy) {
                    self.image.get_image_data_mut()[i] = px;
                }
            }
        }
    }

    fn fill_clipped(&mut self, rect: Rect, rgba: [u8; 4]) {
        let r = rect.intersect(&self.bounds());
        if r.is_empty() {
            return;
        }
        let w = self.width() as usize;
        let data = self.image.get_image_data_mut();
        for y in r.y..r.y + r.h {
            let row = y as usize * w;
            data[row + r.x as usize..row + (r.x + r.w) as usize].fill(rgba);
        }
    }
}

impl Surface for Bitmap {
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn fill_rect(&mut self, rect: Rect, rgba: [u8; 4]) {
        self.fill_clipped(rect, rgba);
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.fill_clipped(rect, CLEAR);
    }

    fn draw_bitmap(&mut self, src: &Bitmap, src_rect: Rect, transform: Transform) {
        self.draw_bitmap_clipped(src, src_rect, transform, None);
    }

    fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        self.offset(x, y).map(|i| self.image.get_image_data()[i])
    }

    fn put_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if let Some(i) = self.offset(x, y) {
            self.image.get_image_data_mut()[i] = rgba;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn new_bitmap_is_transparent() {
        let b = Bitmap::new(3, 2);
        assert_eq!(b.size(), (3, 2));
        assert_eq!(b.pixel(2, 1), Some(CLEAR));
        assert_eq!(b.pixel(3, 0), None);
        assert_eq!(b.pixel(-1, 0), None);
    }

    #[test]
    fn fill_is_clamped_to_bounds() {
        let mut b = Bitmap::new(4, 4);
        b.fill_rect(Rect::new(-2, 2, 4, 10), RED);
        assert_eq!(b.pixel(0, 2), Some(RED));
        assert_eq!(b.pixel(1, 3), Some(RED));
        assert_eq!(b.pixel(2, 2), Some(CLEAR));
        assert_eq!(b.pixel(0, 1), Some(CLEAR));
    }

    #[test]
    fn fills_past_the_right_and_bottom_edges_are_dropped() {
        let mut b = Bitmap::new(4, 4);
        b.fill_rect(Rect::new(10, 3, 2, 1), RED);
        b.fill_rect(Rect::new(0, 9, 4, 4), RED);
        b.clear_rect(Rect::new(4, 0, 1, 4));
        b.fill_rect(Rect::new(3, 3, 5, 5), RED);
        assert_eq!(b.pixel(3, 3), Some(RED));
        assert_eq!(b.pixel(2, 3), Some(CLEAR));
    }

    #[test]
    fn transparent_source_pixels_do_not_overwrite() {
        let mut src = Bitmap::new(2, 1);
        src.put_pixel(0, 0, RED);
        let mut dst = Bitmap::new(2, 1);
        dst.fill_rect(dst.bounds(), BLUE);
        dst.draw_bitmap(&src, src.bounds(), Transform::translate(0, 0));
        assert_eq!(dst.pixel(0, 0), Some(RED));
        assert_eq!(dst.pixel(1, 0), Some(BLUE));
    }

    #[test]
    fn negative_scale_mirrors_about_the_far_edge() {
        let mut src = Bitmap::new(3, 1);
        src.put_pixel(0, 0, RED);
        src.put_pixel(2, 0, BLUE);
        let mut dst = Bitmap::new(5, 1);
        dst.draw_bitmap(&src, src.bounds(), Transform::mirrored(1, 0, 3, 1, true, false));
        assert_eq!(dst.pixel(1, 0), Some(BLUE));
        assert_eq!(dst.pixel(3, 0), Some(RED));
        assert_eq!(dst.pixel(0, 0), Some(CLEAR));
        assert_eq!(dst.pixel(4, 0), Some(CLEAR));
    }

    #[test]
    fn clip_discards_outside_writes() {
        let mut src = Bitmap::new(2, 2);
        src.fill_rect(src.bounds(), RED);
        let mut dst = Bitmap::new(2, 2);
        dst.draw_bitmap_clipped(
            &src,
            src.bounds(),
            Transform::translate(0, 0),
            Some(Rect::new(1, 1, 5, 5)),
        );
        assert_eq!(dst.pixel(0, 0), Some(CLEAR));
        assert_eq!(dst.pixel(1, 1), Some(RED));
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 4, 4);
        assert_eq!(a.intersect(&Rect::new(2, 3, 10, 10)), Rect::new(2, 3, 2, 1));
        assert!(a.intersect(&Rect::new(8, 8, 1, 1)).is_empty());
    }
}
