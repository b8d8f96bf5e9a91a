#![warn(missing_docs)]

//! Indexed-palette fantasy console core for Macroquad.
//!
//! Pixels live as palette indices in a sprite sheet and a tile map; they are
//! turned into RGBA only when drawn, through two lazily reconciled bitmap
//! caches. [`Engine`] owns all of it and exposes the drawing API,
//! [`Runtime`] drives a [`Cartridge`] at fixed 30/60 Hz steps and
//! [`Presenter`] puts the result in a window.

mod bitmap;
mod cart;
mod compositor;
mod config;
mod engine;
mod error;
mod font;
mod frontend;
mod input;
mod palette;
mod runtime;
mod screen;
mod sheet;
mod tilemap;

pub use bitmap::{Bitmap, Rect, Surface, Transform, CLEAR, MAX_SURFACE_SIDE};
pub use cart::{CartridgeData, CART_VERSION};
pub use compositor::{Compositor, MapRegion, SpriteParams};
pub use config::{EngineConfig, FitMode};
pub use engine::Engine;
pub use error::CartError;
pub use font::{draw_text, text_width, GLYPH_H, GLYPH_W, LINE_HEIGHT};
pub use frontend::{fit_scale, run_window, Presenter, Viewport};
pub use input::{InputState, BTN_A, BTN_B, BTN_DOWN, BTN_LEFT, BTN_RIGHT, BTN_UP};
pub use palette::{
    default_palette, int_to_hex, rgb_to_rgba, rgba_to_rgb, to_color, Palette, PaletteEntry,
    DEFAULT_PALETTE_SIZE,
};
pub use runtime::{Cartridge, Runtime, FIXED_STEP_MS, MAX_FRAME_MS, UPDATE_STEP_MS};
pub use screen::Screen;
pub use sheet::{CellSize, SpriteSheet};
pub use tilemap::{SpriteFlags, TileMap, DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH};
