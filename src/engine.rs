use crate::bitmap::{Bitmap, Rect, Surface, MAX_SURFACE_SIDE};
use crate::compositor::{Compositor, MapRegion, SpriteParams};
use crate::config::{EngineConfig, FitMode};
use crate::error::CartError;
use crate::font;
use crate::input::InputState;
use crate::palette::{rgb_to_rgba, rgba_to_rgb, Palette};
use crate::screen::Screen;
use crate::sheet::{CellSize, SpriteSheet};
use crate::tilemap::{SpriteFlags, TileMap};

/// Checks that every bitmap the engine would allocate for these dimensions
/// fits in [`MAX_SURFACE_SIDE`]: the screens, the sprite-sheet cache and the
/// map cache. `sheet` and `map` are in cells.
pub(crate) fn check_surfaces(
    screen: (u32, u32),
    sheet: (u32, u32),
    cell: CellSize,
    map: (u32, u32),
) -> Result<(), String> {
    let sides = [
        ("screen width", screen.0 as u64),
        ("screen height", screen.1 as u64),
        ("sprite sheet width", sheet.0 as u64 * cell.w as u64),
        ("sprite sheet height", sheet.1 as u64 * cell.h as u64),
        ("map cache width", map.0 as u64 * cell.w as u64),
        ("map cache height", map.1 as u64 * cell.h as u64),
    ];
    for (what, side) in sides {
        if side > MAX_SURFACE_SIDE as u64 {
            return Err(format!("{what} of {side} px is over the {MAX_SURFACE_SIDE} px limit"));
        }
    }
    Ok(())
}

/// The console: every store, both caches and the display layers, owned by
/// one value and handed to cartridge code by `&mut`.
#[derive(Debug)]
pub struct Engine {
    palette: Palette,
    sheet: SpriteSheet,
    map: TileMap,
    flags: SpriteFlags,
    compositor: Compositor,
    screens: Vec<Screen>,
    active: usize,
    width: u32,
    height: u32,
    default_color: u32,
    fit: FitMode,
    input: InputState,
    code: Option<String>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Engine {
    /// Builds an engine from `config`. Dimensions that would need a bitmap
    /// larger than [`MAX_SURFACE_SIDE`] are replaced by the defaults.
    pub fn new(config: &EngineConfig) -> Self {
        let defaults = EngineConfig::default();
        let fits = check_surfaces(
            (config.width, config.height),
            (config.sheet_size, config.sheet_size),
            CellSize {
                w: config.cell_width.max(1),
                h: config.cell_height.max(1),
            },
            (config.map_width, config.map_height),
        );
        let sized = match fits {
            Ok(()) => config,
            Err(msg) => {
                log::warn!("{msg}, using default sizes");
                &defaults
            }
        };

        let cell = CellSize {
            w: sized.cell_width.max(1),
            h: sized.cell_height.max(1),
        };
        let sheet = SpriteSheet::new(sized.sheet_size, sized.sheet_size, cell);
        let map = TileMap::new(sized.map_width, sized.map_height);
        let compositor = Compositor::new(&sheet, &map);
        let screens = (0..config.layers.max(1))
            .map(|_| Screen::new(sized.width, sized.height))
            .collect();
        log::info!(
            "engine up: {}x{} screen, {}x{} cells, {}x{} map",
            sized.width,
            sized.height,
            cell.w,
            cell.h,
            sized.map_width,
            sized.map_height
        );
        Self {
            palette: Palette::new(&config.palette),
            flags: SpriteFlags::new(sheet.sprite_count()),
            sheet,
            map,
            compositor,
            screens,
            active: 0,
            width: sized.width,
            height: sized.height,
            default_color: 0,
            fit: config.fit,
            input: InputState::default(),
            code: None,
        }
    }

    /// The color table.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The sprite sheet.
    pub fn sheet(&self) -> &SpriteSheet {
        &self.sheet
    }

    /// The tile map.
    pub fn tilemap(&self) -> &TileMap {
        &self.map
    }

    /// The sprite flags.
    pub fn flags(&self) -> &SpriteFlags {
        &self.flags
    }

    /// Scaling mode the frontend should use.
    pub fn fit(&self) -> FitMode {
        self.fit
    }

    /// Cartridge source text, saved and loaded with the cartridge.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Replaces the cartridge source text.
    pub fn set_code(&mut self, code: Option<String>) {
        self.code = code;
    }

    /// Checks a prospective size change against the bitmap limit.
    fn fits(&self, screen: (u32, u32), sheet: (u32, u32), cell: CellSize) -> Result<(), String> {
        check_surfaces(screen, sheet, cell, (self.map.width(), self.map.height()))
    }

    pub(crate) fn invalidate_caches(&mut self) {
        self.compositor.mark_sheet_dirty();
        self.map.mark_all_dirty();
    }

    /// Bulk restore of sheet pixels and map cells, both row-major. Caches
    /// are invalidated once at the end instead of per write.
    pub(crate) fn restore_stores(&mut self, sprites: &[u32], cells: &[u32]) -> Result<(), CartError> {
        let sheet_w = self.sheet.width().max(1) as usize;
        for (i, &col) in sprites.iter().enumerate() {
            self.sheet.set((i % sheet_w) as i32, (i / sheet_w) as i32, col)?;
        }
        let map_w = self.map.width().max(1) as usize;
        for (i, &n) in cells.iter().enumerate() {
            self.map.set_cell((i % map_w) as i32, (i / map_w) as i32, n)?;
        }
        self.invalidate_caches();
        Ok(())
    }

    /// Shared path of every cell-size and sheet-size change: sprite pixels
    /// and flags are discarded, both caches reallocated.
    fn reallocate_sheet(&mut self, cols: u32, rows: u32, cell: CellSize) {
        self.sheet.resize(cols, rows, cell);
        self.flags.reset(self.sheet.sprite_count());
        self.compositor.reallocate(&self.sheet, &self.map);
        self.map.mark_all_dirty();
        log::info!(
            "sprite sheet reset to {cols}x{rows} sprites of {}x{} px",
            cell.w,
            cell.h
        );
    }

    /// Replaces the whole palette; both caches are rebuilt on next use.
    pub fn set_palette(&mut self, colors: &[u32]) {
        self.palette.set_palette(colors);
        self.invalidate_caches();
    }

    /// Sets palette entry `n`, growing the table with black if needed.
    pub fn palset(&mut self, n: usize, rgb: u32) {
        self.palette.set_entry(n, rgb);
        self.invalidate_caches();
    }

    /// Palette entry `n`, `None` past the end of the table.
    pub fn palget(&self, n: u32) -> Option<u32> {
        self.palette.get(n)
    }

    /// Marks index `n` transparent (or opaque) in sprite draws.
    pub fn palt(&mut self, n: u32, transparent: bool) {
        if self.palette.set_transparent(n, transparent) {
            self.invalidate_caches();
        }
    }

    /// Whether palette index `n` is drawn as transparent.
    pub fn palt_get(&self, n: u32) -> bool {
        self.palette.is_transparent(n)
    }

    /// Screen width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Screen height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resizes every display layer; contents are lost. Widths past
    /// [`MAX_SURFACE_SIDE`] are ignored with a warning.
    pub fn set_width(&mut self, width: u32) {
        if let Err(msg) = self.fits((width, self.height), self.sheet_dims(), self.sheet.cell()) {
            log::warn!("set_width({width}) ignored: {msg}");
            return;
        }
        self.width = width;
        self.resize_screens();
    }

    /// See [`Engine::set_width`].
    pub fn set_height(&mut self, height: u32) {
        if let Err(msg) = self.fits((self.width, height), self.sheet_dims(), self.sheet.cell()) {
            log::warn!("set_height({height}) ignored: {msg}");
            return;
        }
        self.height = height;
        self.resize_screens();
    }

    fn resize_screens(&mut self) {
        for screen in &mut self.screens {
            screen.resize(self.width, self.height);
        }
    }

    fn sheet_dims(&self) -> (u32, u32) {
        (self.sheet.cols(), self.sheet.rows())
    }

    /// Cell width in pixels.
    pub fn cellwidth(&self) -> u32 {
        self.sheet.cell().w
    }

    /// Cell height in pixels.
    pub fn cellheight(&self) -> u32 {
        self.sheet.cell().h
    }

    /// Sets the cell width, keeping the height.
    pub fn set_cellwidth(&mut self, w: u32) {
        self.set_cell_size(w, self.cellheight());
    }

    /// Sets the cell height, keeping the width.
    pub fn set_cellheight(&mut self, h: u32) {
        self.set_cell_size(self.cellwidth(), h);
    }

    /// Changes the cell size. Sprite pixels and flags are lost. A size whose
    /// sheet or map bitmap would exceed [`MAX_SURFACE_SIDE`] is ignored with
    /// a warning.
    pub fn set_cell_size(&mut self, w: u32, h: u32) {
        let cell = CellSize {
            w: w.max(1),
            h: h.max(1),
        };
        if let Err(msg) = self.fits((self.width, self.height), self.sheet_dims(), cell) {
            log::warn!("cell size {}x{} ignored: {msg}", cell.w, cell.h);
            return;
        }
        self.reallocate_sheet(self.sheet.cols(), self.sheet.rows(), cell);
    }

    /// Sprite sheet size, in sprites per side.
    pub fn ssget(&self) -> u32 {
        self.sheet.cols()
    }

    /// Makes the sheet `n × n` sprites. Sprite pixels and flags are lost.
    /// Sizes past the bitmap limit are ignored with a warning.
    pub fn ssset(&mut self, n: u32) {
        if let Err(msg) = self.fits((self.width, self.height), (n, n), self.sheet.cell()) {
            log::warn!("sheet size {n} ignored: {msg}");
            return;
        }
        self.reallocate_sheet(n, n, self.sheet.cell());
    }

    /// Writes a sheet pixel, refreshes that pixel of the sheet bitmap and
    /// invalidates the map cells showing the sprite it belongs to.
    pub fn sset(&mut self, x: i32, y: i32, col: u32) -> Result<(), CartError> {
        self.sheet.set(x, y, col)?;
        self.compositor.redraw_pixel(&self.sheet, &self.palette, x, y);
        let n = self.sheet.sprite_at(x as u32, y as u32);
        self.map.mark_sprite_dirty(n, self.sheet.sprite_count());
        Ok(())
    }

    /// [`Engine::sset`] with the current default color.
    pub fn sset_default(&mut self, x: i32, y: i32) -> Result<(), CartError> {
        self.sset(x, y, self.default_color)
    }

    /// Sheet pixel at `(x, y)`, 0 outside the sheet.
    pub fn sget(&self, x: i32, y: i32) -> u32 {
        self.sheet.get(x, y).unwrap_or(0)
    }

    /// Writes map cell `(x, y)`.
    pub fn mset(&mut self, x: i32, y: i32, n: u32) -> Result<(), CartError> {
        self.map.set_cell(x, y, n).map(|_| ())
    }

    /// Map cell at `(x, y)`, 0 outside the map.
    pub fn mget(&self, x: i32, y: i32) -> u32 {
        self.map.get_cell(x, y).unwrap_or(0)
    }

    /// Flag byte of sprite `n`, 0 when out of range.
    pub fn fget(&self, n: u32) -> u8 {
        self.flags.get(n)
    }

    /// One flag bit of sprite `n`.
    pub fn fget_bit(&self, n: u32, bit: u8) -> bool {
        self.flags.get_bit(n, bit)
    }

    /// Sets the flag byte of sprite `n`.
    pub fn fset(&mut self, n: u32, flags: u8) {
        self.flags.set(n, flags);
    }

    /// Sets one flag bit of sprite `n`.
    pub fn fset_bit(&mut self, n: u32, bit: u8, value: bool) {
        self.flags.set_bit(n, bit, value);
    }

    /// Selects the display layer subsequent draws go to.
    pub fn canvas(&mut self, n: usize) -> Result<(), CartError> {
        if n >= self.screens.len() {
            return Err(CartError::NoSuchCanvas(n));
        }
        self.active = n;
        Ok(())
    }

    /// Index of the layer draws go to.
    pub fn active_canvas(&self) -> usize {
        self.active
    }

    /// The active layer.
    pub fn screen(&self) -> &Screen {
        &self.screens[self.active]
    }

    /// All layers, bottom first.
    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    /// Default color for draws that don't name one.
    pub fn color(&mut self, col: u32) {
        self.default_color = col;
    }

    fn ink(&self, col: Option<u32>) -> [u8; 4] {
        rgb_to_rgba(self.palette.resolve(col.unwrap_or(self.default_color)))
    }

    /// Clears the active layer, ignoring camera and clip.
    pub fn cls(&mut self) {
        self.screens[self.active].cls();
    }

    /// Sets the active layer's camera offset.
    pub fn camera(&mut self, x: i32, y: i32) {
        self.screens[self.active].set_camera(x, y);
    }

    /// Narrows the active layer's clip rect.
    pub fn clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.screens[self.active].set_clip(Rect::new(x, y, w, h));
    }

    /// Removes the active layer's clip rect.
    pub fn clip_reset(&mut self) {
        self.screens[self.active].reset_clip();
    }

    /// Filled rectangle with inclusive corners.
    pub fn rectfill(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, col: Option<u32>) {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (y0, y1) = (y0.min(y1), y0.max(y1));
        let ink = self.ink(col);
        self.screens[self.active].fill_rect(Rect::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1), ink);
    }

    /// One pixel wide outline with inclusive corners.
    pub fn rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, col: Option<u32>) {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (y0, y1) = (y0.min(y1), y0.max(y1));
        let (w, h) = (x1 - x0, y1 - y0);
        let ink = self.ink(col);
        let screen = &mut self.screens[self.active];
        screen.fill_rect(Rect::new(x0, y0, w, 1), ink);
        screen.fill_rect(Rect::new(x0, y0, 1, h), ink);
        screen.fill_rect(Rect::new(x1, y0, 1, h + 1), ink);
        screen.fill_rect(Rect::new(x0, y1, w + 1, 1), ink);
    }

    /// Draws sprite `n` with its top-left at `(x, y)`.
    pub fn spr(&mut self, n: u32, x: i32, y: i32) {
        self.spr_ex(n, x, y, SpriteParams::default());
    }

    /// Draws sprite `n` with size and flips.
    pub fn spr_ex(&mut self, n: u32, x: i32, y: i32, params: SpriteParams) {
        self.compositor.draw_sprite(
            &mut self.screens[self.active],
            &self.sheet,
            &self.palette,
            n,
            x,
            y,
            params,
        );
    }

    /// Draws `cel_w × cel_h` map cells starting at `(cel_x, cel_y)` to
    /// `(sx, sy)`. Layer 0 blits the cached map bitmap; any other layer draws
    /// the cells whose sprite flags contain every bit of `layer`, one sprite
    /// at a time.
    #[allow(clippy::too_many_arguments)]
    pub fn map(&mut self, cel_x: i32, cel_y: i32, sx: i32, sy: i32, cel_w: i32, cel_h: i32, layer: u8) {
        let region = MapRegion {
            cel_x,
            cel_y,
            sx,
            sy,
            cel_w,
            cel_h,
        };
        self.map_region(region, layer);
    }

    /// [`Engine::map`] taking a [`MapRegion`]; returns the number of cells
    /// drawn one by one (always 0 for layer 0).
    pub fn map_region(&mut self, region: MapRegion, layer: u8) -> usize {
        let screen = &mut self.screens[self.active];
        if layer == 0 {
            self.compositor
                .draw_map_cached(screen, &mut self.map, &self.sheet, &self.palette, region);
            0
        } else {
            self.compositor.draw_map_layer(
                screen,
                &self.map,
                &self.flags,
                &self.sheet,
                &self.palette,
                region,
                layer,
            )
        }
    }

    /// Draws `text` with the built-in font.
    pub fn print(&mut self, text: &str, x: i32, y: i32, col: Option<u32>) {
        let ink = self.ink(col);
        font::draw_text(&mut self.screens[self.active], text, x, y, ink);
    }

    /// Writes a display pixel directly, ignoring camera and clip.
    pub fn pset(&mut self, x: i32, y: i32, col: u32) {
        let ink = rgb_to_rgba(self.palette.resolve(col));
        self.screens[self.active].put_pixel(x, y, ink);
    }

    /// Palette index of a display pixel, by exact color match. Pixels whose
    /// color is not in the palette, or outside the screen, read as 0.
    pub fn pget(&self, x: i32, y: i32) -> u32 {
        let Some(px) = self.screens[self.active].pixel(x, y) else {
            return 0;
        };
        let rgb = rgba_to_rgb(px);
        self.palette.index_of(rgb).unwrap_or_else(|| {
            log::debug!("pget({x}, {y}): #{rgb:06x} is not in the palette");
            0
        })
    }

    /// The sprite-sheet bitmap, rebuilt first if stale.
    pub fn sprite_sheet_bitmap(&mut self) -> &Bitmap {
        self.compositor.sheet_bitmap(&self.sheet, &self.palette)
    }

    /// The map bitmap as of the last refresh.
    pub fn map_cache_bitmap(&self) -> &Bitmap {
        self.compositor.map_bitmap()
    }

    /// Reconciles the map bitmap; returns the number of cells recomposited.
    pub fn refresh_map_cache(&mut self) -> usize {
        self.compositor
            .refresh_map(&mut self.map, &self.sheet, &self.palette)
    }

    /// Whether the sheet cache awaits a rebuild.
    pub fn is_sheet_cache_dirty(&self) -> bool {
        self.compositor.is_sheet_dirty()
    }

    /// Current input snapshot.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Input snapshot for the frontend to fill.
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Whether button `i` is held.
    pub fn btn(&self, i: usize) -> bool {
        self.input.btn(i)
    }

    /// Whether mouse button `i` is held.
    pub fn mousebtn(&self, i: usize) -> bool {
        self.input.mousebtn(i)
    }

    /// Mouse x in screen pixels.
    pub fn mousex(&self) -> i32 {
        self.input.mousex(self.width)
    }

    /// Mouse y in screen pixels.
    pub fn mousey(&self) -> i32 {
        self.input.mousey(self.height)
    }
}
