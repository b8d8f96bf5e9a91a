use crate::bitmap::{Bitmap, Rect, Surface, Transform};

/// One display layer: a bitmap plus the camera offset and clip region that
/// apply to every draw call routed through it.
///
/// `pixel`/`put_pixel` address raw display pixels and ignore both.
#[derive(Debug, Clone)]
pub struct Screen {
    bitmap: Bitmap,
    camera: (i32, i32),
    clip: Option<Rect>,
}

impl Screen {
    /// Layer of the given size, no camera and no clip.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bitmap: Bitmap::new(width, height),
            camera: (0, 0),
            clip: None,
        }
    }

    /// Reallocates the bitmap; contents are lost, camera and clip survive.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.bitmap = Bitmap::new(width, height);
    }

    /// Pixels of this layer.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Camera offset.
    pub fn camera(&self) -> (i32, i32) {
        self.camera
    }

    /// Offset added to the position of every subsequent draw.
    pub fn set_camera(&mut self, x: i32, y: i32) {
        self.camera = (x, y);
    }

    /// Restricts drawing to `rect` (camera-relative). Successive clips
    /// intersect with each other.
    pub fn set_clip(&mut self, rect: Rect) {
        let rect = Rect::new(rect.x + self.camera.0, rect.y + self.camera.1, rect.w, rect.h);
        self.clip = Some(match self.clip {
            Some(current) => current.intersect(&rect),
            None => rect,
        });
    }

    /// Removes the clip rect.
    pub fn reset_clip(&mut self) {
        self.clip = None;
    }

    /// Current clip rect, if any.
    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    /// Clears every pixel, regardless of camera and clip.
    pub fn cls(&mut self) {
        self.bitmap.clear();
    }

    fn to_device(&self, rect: Rect) -> Rect {
        let r = Rect::new(rect.x + self.camera.0, rect.y + self.camera.1, rect.w, rect.h);
        match self.clip {
            Some(clip) => r.intersect(&clip),
            None => r,
        }
    }
}

impl Surface for Screen {
    fn size(&self) -> (u32, u32) {
        self.bitmap.size()
    }

    fn fill_rect(&mut self, rect: Rect, rgba: [u8; 4]) {
        let r = self.to_device(rect);
        self.bitmap.fill_rect(r, rgba);
    }

    fn clear_rect(&mut self, rect: Rect) {
        let r = self.to_device(rect);
        self.bitmap.clear_rect(r);
    }

    fn draw_bitmap(&mut self, src: &Bitmap, src_rect: Rect, transform: Transform) {
        let transform = transform.offset(self.camera.0, self.camera.1);
        self.bitmap.draw_bitmap_clipped(src, src_rect, transform, self.clip);
    }

    fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        self.bitmap.pixel(x, y)
    }

    fn put_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        self.bitmap.put_pixel(x, y, rgba);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::CLEAR;

    const INK: [u8; 4] = [9, 9, 9, 255];

    #[test]
    fn camera_offsets_draws_but_not_raw_pixels() {
        let mut s = Screen::new(8, 8);
        s.set_camera(2, 1);
        s.fill_rect(Rect::new(0, 0, 1, 1), INK);
        assert_eq!(s.pixel(2, 1), Some(INK));
        assert_eq!(s.pixel(0, 0), Some(CLEAR));
        s.put_pixel(0, 0, INK);
        assert_eq!(s.pixel(0, 0), Some(INK));
    }

    #[test]
    fn clips_accumulate() {
        let mut s = Screen::new(8, 8);
        s.set_clip(Rect::new(0, 0, 4, 4));
        s.set_clip(Rect::new(2, 2, 6, 6));
        assert_eq!(s.clip(), Some(Rect::new(2, 2, 2, 2)));
        let all = s.bitmap().bounds();
        s.fill_rect(all, INK);
        assert_eq!(s.pixel(1, 1), Some(CLEAR));
        assert_eq!(s.pixel(3, 3), Some(INK));
        assert_eq!(s.pixel(4, 4), Some(CLEAR));
        s.reset_clip();
        assert_eq!(s.clip(), None);
    }
}
