//! Cartridge save format.
//!
//! A cartridge is a JSON object holding the whole console state:
//!
//! ```json
//! { "version": 4, "width": 128, "height": 128, "cellwidth": 8, "cellheight": 8,
//!   "map": [...], "sprites": [...], "flags": [...], "palette": [...], "code": "..." }
//! ```
//!
//! `sprites` is row-major over the whole sheet, `map` row-major over the
//! map, `flags` one byte per sprite. Fields this crate does not use (`sfx`)
//! are accepted and dropped.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::{check_surfaces, Engine};
use crate::error::CartError;
use crate::sheet::CellSize;

/// Format version written by `Engine::save`.
pub const CART_VERSION: u32 = 4;

/// On-disk cartridge: stores, sizes and palette as flat arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartridgeData {
    /// Format version, absent in old carts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Screen width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Screen height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Sprite cell width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellwidth: Option<u32>,
    /// Sprite cell height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellheight: Option<u32>,
    /// Map cells, row-major
    pub map: Vec<u32>,
    /// Sheet pixels as palette indices, row-major
    pub sprites: Vec<u32>,
    /// One flag byte per sprite
    pub flags: Vec<u8>,
    /// Palette as `0xRRGGBB`
    pub palette: Vec<u32>,
    /// Opaque cartridge source, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CartridgeData {
    /// Parses a cartridge from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CartError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compact JSON text.
    pub fn to_json_string(&self) -> Result<String, CartError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads a `.json` cartridge file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CartError> {
        let p = path.as_ref();
        check_extension(p)?;
        let txt = std::fs::read_to_string(p).map_err(|source| CartError::Io {
            path: p.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&txt).map_err(|source| CartError::Json {
            path: Some(p.to_path_buf()),
            source,
        })
    }

    /// Writes a pretty-printed `.json` cartridge file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), CartError> {
        let p = path.as_ref();
        check_extension(p)?;
        let txt = serde_json::to_string_pretty(self).map_err(|source| CartError::Json {
            path: Some(p.to_path_buf()),
            source,
        })?;
        std::fs::write(p, txt).map_err(|source| CartError::Io {
            path: p.to_path_buf(),
            source,
        })
    }
}

fn check_extension(p: &Path) -> Result<(), CartError> {
    match p.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(()),
        other => Err(CartError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

fn malformed(msg: String) -> CartError {
    CartError::MalformedCartridge(msg)
}

impl Engine {
    /// Snapshot of every store in cartridge form.
    pub fn save(&self) -> CartridgeData {
        CartridgeData {
            version: Some(CART_VERSION),
            width: Some(self.width()),
            height: Some(self.height()),
            cellwidth: Some(self.cellwidth()),
            cellheight: Some(self.cellheight()),
            map: self.tilemap().cells().to_vec(),
            sprites: self.sheet().pixels().to_vec(),
            flags: self.flags().as_slice().to_vec(),
            palette: self.palette().colors().to_vec(),
            code: self.code().map(str::to_string),
        }
    }

    /// Replaces the console state with `data`.
    ///
    /// Every length is checked against the dimensions the cartridge asks
    /// for before anything is touched, so a rejected cartridge leaves the
    /// engine as it was.
    pub fn load(&mut self, data: &CartridgeData) -> Result<(), CartError> {
        if let Some(v) = data.version {
            if v > CART_VERSION {
                log::warn!("cartridge version {v} is newer than {CART_VERSION}");
            }
        }
        let width = data.width.unwrap_or(self.width());
        let height = data.height.unwrap_or(self.height());
        if width == 0 || height == 0 {
            return Err(malformed(format!("screen size {width}x{height}")));
        }
        let cell = CellSize {
            w: data.cellwidth.unwrap_or(self.cellwidth()),
            h: data.cellheight.unwrap_or(self.cellheight()),
        };
        if cell.w == 0 || cell.h == 0 {
            return Err(malformed(format!("cell size {}x{}", cell.w, cell.h)));
        }

        let (cols, rows) = (self.sheet().cols(), self.sheet().rows());
        let map_dims = (self.tilemap().width(), self.tilemap().height());
        check_surfaces((width, height), (cols, rows), cell, map_dims).map_err(malformed)?;

        // every side is within the bitmap limit now, so these cannot overflow
        let sheet_len = (cols * cell.w) as usize * (rows * cell.h) as usize;
        if data.sprites.len() != sheet_len {
            return Err(malformed(format!(
                "sprites has {} entries, sheet needs {sheet_len}",
                data.sprites.len()
            )));
        }
        let map_len = self.tilemap().cells().len();
        if data.map.len() != map_len {
            return Err(malformed(format!(
                "map has {} entries, map needs {map_len}",
                data.map.len()
            )));
        }
        let sprite_count = cols as usize * rows as usize;
        if data.flags.len() != sprite_count {
            return Err(malformed(format!(
                "flags has {} entries, sheet holds {sprite_count} sprites",
                data.flags.len()
            )));
        }
        if data.palette.is_empty() {
            return Err(malformed("palette is empty".to_string()));
        }

        if width != self.width() {
            self.set_width(width);
        }
        if height != self.height() {
            self.set_height(height);
        }
        if (cell.w, cell.h) != (self.cellwidth(), self.cellheight()) {
            self.set_cell_size(cell.w, cell.h);
        }
        for (n, &f) in data.flags.iter().enumerate() {
            self.fset(n as u32, f);
        }
        self.set_palette(&data.palette);

        self.restore_stores(&data.sprites, &data.map)?;
        self.set_code(data.code.clone());
        log::info!(
            "cartridge loaded: {width}x{height}, {}x{} cells, {} colors",
            cell.w,
            cell.h,
            data.palette.len()
        );
        Ok(())
    }
}
