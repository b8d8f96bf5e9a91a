use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::palette::default_palette;

/// How the frontend scales the screen into the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Largest integer scale that fits
    #[default]
    PixelPerfect,
    /// Largest fractional scale that fits
    Stretch,
}

/// Startup options for an [`Engine`](crate::Engine). Every field has a
/// default, so a config file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Screen width in pixels
    pub width: u32,
    /// Screen height in pixels
    pub height: u32,
    /// Sprite cell width in pixels
    pub cell_width: u32,
    /// Sprite cell height in pixels
    pub cell_height: u32,
    /// Map width in cells
    pub map_width: u32,
    /// Map height in cells
    pub map_height: u32,
    /// Sprite sheet is `sheet_size × sheet_size` sprites
    pub sheet_size: u32,
    /// Number of stacked display layers
    pub layers: usize,
    /// Palette as `0xRRGGBB`, default palette when empty
    pub palette: Vec<u32>,
    /// How the screen is scaled into the window
    pub fit: FitMode,
    /// Refit on every window resize
    pub auto_fit: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            cell_width: 8,
            cell_height: 8,
            map_width: crate::tilemap::DEFAULT_MAP_WIDTH,
            map_height: crate::tilemap::DEFAULT_MAP_HEIGHT,
            sheet_size: 16,
            layers: 1,
            palette: default_palette(),
            fit: FitMode::PixelPerfect,
            auto_fit: true,
        }
    }
}

impl EngineConfig {
    /// Parses a config from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CartError> {
        Ok(serde_json::from_str(json)?)
    }
}
