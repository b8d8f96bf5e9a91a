//! Window glue on top of macroquad: uploads the display layers to textures,
//! scales them into the window and feeds keyboard/mouse state back.

use macroquad::prelude::*;

use crate::config::{EngineConfig, FitMode};
use crate::engine::Engine;
use crate::palette::to_color;
use crate::input::{BTN_A, BTN_B, BTN_DOWN, BTN_LEFT, BTN_RIGHT, BTN_UP};
use crate::runtime::{Cartridge, Runtime};

const KEYS: [(KeyCode, usize); 6] = [
    (KeyCode::Left, BTN_LEFT),
    (KeyCode::Right, BTN_RIGHT),
    (KeyCode::Up, BTN_UP),
    (KeyCode::Down, BTN_DOWN),
    (KeyCode::Z, BTN_A),
    (KeyCode::X, BTN_B),
];

const MOUSE: [MouseButton; 3] = [MouseButton::Left, MouseButton::Middle, MouseButton::Right];

/// Scale factor that fits a `w × h` screen into a `win_w × win_h` window.
pub fn fit_scale(win_w: f32, win_h: f32, w: f32, h: f32, fit: FitMode) -> f32 {
    if w <= 0.0 || h <= 0.0 {
        return 1.0;
    }
    let s = (win_w / w).min(win_h / h);
    match fit {
        FitMode::PixelPerfect => s.floor().max(1.0),
        FitMode::Stretch => s,
    }
}

/// Where the screen lands in the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in window pixels
    pub x: f32,
    /// Top edge in window pixels
    pub y: f32,
    /// Scaled width
    pub w: f32,
    /// Scaled height
    pub h: f32,
}

impl Viewport {
    /// Centered viewport for the given window and screen size.
    pub fn centered(win_w: f32, win_h: f32, w: f32, h: f32, scale: f32) -> Self {
        let (dw, dh) = (w * scale, h * scale);
        Self {
            x: ((win_w - dw) / 2.0).floor(),
            y: ((win_h - dh) / 2.0).floor(),
            w: dw,
            h: dh,
        }
    }

    /// Window position as a fraction of the viewport, clamped to `0..=1`.
    pub fn normalize(&self, px: f32, py: f32) -> (f32, f32) {
        let nx = if self.w > 0.0 { (px - self.x) / self.w } else { 0.0 };
        let ny = if self.h > 0.0 { (py - self.y) / self.h } else { 0.0 };
        (nx.clamp(0.0, 1.0), ny.clamp(0.0, 1.0))
    }
}

/// Keeps one texture per display layer and re-uploads it every frame.
#[derive(Default)]
pub struct Presenter {
    textures: Vec<Texture2D>,
    viewport: Option<Viewport>,
}

impl Presenter {
    /// Presenter with no texture uploaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the last frame was drawn.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Draws every display layer, bottom first, scaled per `fit`. With
    /// `auto_fit` off the screen is drawn 1:1.
    pub fn present(&mut self, engine: &Engine, fit: FitMode, auto_fit: bool) {
        let (w, h) = (engine.width() as f32, engine.height() as f32);
        let scale = if auto_fit {
            fit_scale(screen_width(), screen_height(), w, h, fit)
        } else {
            1.0
        };
        let vp = Viewport::centered(screen_width(), screen_height(), w, h, scale);

        for (i, screen) in engine.screens().iter().enumerate() {
            let image = screen.bitmap().image();
            let stale = self
                .textures
                .get(i)
                .map(|t| t.width() as u16 != image.width || t.height() as u16 != image.height)
                .unwrap_or(true);
            if stale {
                let tex = Texture2D::from_image(image);
                tex.set_filter(FilterMode::Nearest);
                if i < self.textures.len() {
                    self.textures[i] = tex;
                } else {
                    self.textures.push(tex);
                }
            } else {
                self.textures[i].update(image);
            }

            draw_texture_ex(
                &self.textures[i],
                vp.x,
                vp.y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(vp.w, vp.h)),
                    ..Default::default()
                },
            );
        }
        self.textures.truncate(engine.screens().len());
        self.viewport = Some(vp);
    }

    /// Copies keyboard and mouse state into the engine's input snapshot.
    pub fn poll_input(&self, engine: &mut Engine) {
        let input = engine.input_mut();
        for (key, btn) in KEYS {
            input.set_button(btn, is_key_down(key));
        }
        for (i, b) in MOUSE.iter().enumerate() {
            input.set_mouse_button(i, is_mouse_button_down(*b));
        }
        if let Some(vp) = self.viewport {
            let (mx, my) = mouse_position();
            let (nx, ny) = vp.normalize(mx, my);
            input.set_mouse_normalized(nx, ny);
        }
    }
}

/// Runs `cart` in the current macroquad window until the window closes.
pub async fn run_window<C: Cartridge>(cart: C, config: EngineConfig) {
    let mut runtime = Runtime::new(Engine::new(&config), cart);
    let mut presenter = Presenter::new();
    runtime.run();
    loop {
        presenter.poll_input(runtime.engine_mut());
        runtime.frame(get_time() * 1000.0);

        // transparent pixels show palette color 0
        clear_background(to_color(runtime.engine().palette().resolve(0)));
        presenter.present(runtime.engine(), config.fit, config.auto_fit);
        next_frame().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_perfect_scale_is_whole() {
        assert_eq!(fit_scale(1280.0, 720.0, 128.0, 128.0, FitMode::PixelPerfect), 5.0);
        assert_eq!(fit_scale(1280.0, 720.0, 128.0, 128.0, FitMode::Stretch), 5.625);
        assert_eq!(fit_scale(64.0, 64.0, 128.0, 128.0, FitMode::PixelPerfect), 1.0);
    }

    #[test]
    fn mouse_is_normalized_against_the_viewport() {
        let vp = Viewport::centered(1280.0, 720.0, 128.0, 128.0, 5.0);
        assert_eq!(vp.x, 320.0);
        assert_eq!(vp.y, 40.0);
        assert_eq!(vp.normalize(320.0 + 320.0, 40.0), (0.5, 0.0));
        assert_eq!(vp.normalize(0.0, 9999.0), (0.0, 1.0));
    }
}
