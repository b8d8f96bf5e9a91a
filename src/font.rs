//! Built-in 4×5 pixel font.

use crate::bitmap::{Rect, Surface};

/// Glyph width in pixels
pub const GLYPH_W: i32 = 4;
/// Glyph height in pixels
pub const GLYPH_H: i32 = 5;
/// Vertical distance between lines of a multi-line print.
pub const LINE_HEIGHT: i32 = 8;

const CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789.,^?()[]:/\\=\"a+-!{}<>;_|&*~";

// one u32 per glyph, bit (y * 4 + x) set for lit pixels
const GLYPHS: [u32; 63] = [
    0x55757, 0x75357, 0x61116, 0x75553, 0x71317, 0x11317, 0x75116, 0x55755, 0x72227, 0x32227,
    0x55355, 0x71111, 0x55577, 0x55553, 0x35556, 0x11757, 0x63552, 0x55357, 0x34716, 0x22227,
    0x65555, 0x27555, 0x77555, 0x55255, 0x74755, 0x71247, 0x75557, 0x72223, 0x71747, 0x74647,
    0x44755, 0x74717, 0x75711, 0x44447, 0x75757, 0x44757, 0x20000, 0x12000, 0x00052, 0x20647,
    0x21112, 0x24442, 0x31113, 0x64446, 0x02020, 0x12224, 0x42221, 0x07070, 0x00055, 0x00012,
    0x02720, 0x00700, 0x20222, 0x62126, 0x32423, 0x42124, 0x12421, 0x24040, 0x70000, 0x22222,
    0x75216, 0x52725, 0x01740,
];

fn glyph(c: char) -> Option<u32> {
    CHARS.chars().position(|g| g == c).map(|i| GLYPHS[i])
}

/// Draws `text` upper-cased with its top-left corner at `(x, y)`. Characters
/// without a glyph leave a blank cell; `\n` moves down one line.
pub fn draw_text<S: Surface>(target: &mut S, text: &str, x: i32, y: i32, rgba: [u8; 4]) {
    for (line_no, line) in text.split('\n').enumerate() {
        let ly = y + line_no as i32 * LINE_HEIGHT;
        for (i, c) in line.to_uppercase().chars().enumerate() {
            let Some(bits) = glyph(c) else {
                continue;
            };
            let gx = x + i as i32 * GLYPH_W;
            for py in 0..GLYPH_H {
                for px in 0..GLYPH_W {
                    if bits & (1 << (py * GLYPH_W + px)) != 0 {
                        target.fill_rect(Rect::new(gx + px, ly + py, 1, 1), rgba);
                    }
                }
            }
        }
    }
}

/// Width in pixels of the longest line of `text`.
pub fn text_width(text: &str) -> i32 {
    text.split('\n')
        .map(|l| l.chars().count() as i32 * GLYPH_W)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{Bitmap, CLEAR};

    const INK: [u8; 4] = [1, 2, 3, 255];

    #[test]
    fn glyph_table_covers_every_char() {
        assert_eq!(CHARS.chars().count(), GLYPHS.len());
    }

    #[test]
    fn lowercase_is_drawn_as_uppercase() {
        let mut a = Bitmap::new(8, 5);
        let mut b = Bitmap::new(8, 5);
        draw_text(&mut a, "hi", 0, 0, INK);
        draw_text(&mut b, "HI", 0, 0, INK);
        assert_eq!(a.image().bytes, b.image().bytes);
    }

    #[test]
    fn letter_a_shape() {
        let mut b = Bitmap::new(4, 5);
        draw_text(&mut b, "A", 0, 0, INK);
        // ###.
        // #.#.
        assert_eq!(b.pixel(0, 0), Some(INK));
        assert_eq!(b.pixel(2, 0), Some(INK));
        assert_eq!(b.pixel(3, 0), Some(CLEAR));
        assert_eq!(b.pixel(1, 1), Some(CLEAR));
    }

    #[test]
    fn newline_starts_a_new_line() {
        let mut b = Bitmap::new(4, 16);
        draw_text(&mut b, " \nI", 0, 0, INK);
        assert_eq!(b.pixel(1, 0), Some(CLEAR));
        assert_eq!(b.pixel(1, LINE_HEIGHT), Some(INK));
        assert_eq!(text_width("ab\nabc"), 12);
    }
}
