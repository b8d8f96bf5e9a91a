/// Snapshot of controller and mouse state, filled in by the frontend.
///
/// Buttons follow the usual fantasy console order: left, right, up, down,
/// then the two action buttons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    buttons: [bool; 8],
    mouse: (f32, f32),
    mouse_buttons: [bool; 3],
}

/// D-pad left
pub const BTN_LEFT: usize = 0;
/// D-pad right
pub const BTN_RIGHT: usize = 1;
/// D-pad up
pub const BTN_UP: usize = 2;
/// D-pad down
pub const BTN_DOWN: usize = 3;
/// Action button A
pub const BTN_A: usize = 4;
/// Action button B
pub const BTN_B: usize = 5;

impl InputState {
    /// Whether button `i` is held.
    pub fn btn(&self, i: usize) -> bool {
        self.buttons.get(i).copied().unwrap_or(false)
    }

    /// Updates button `i`, out of range is ignored.
    pub fn set_button(&mut self, i: usize, down: bool) {
        if let Some(b) = self.buttons.get_mut(i) {
            *b = down;
        }
    }

    /// Mouse position as a fraction of the screen, `0.0..=1.0` on each axis.
    pub fn set_mouse_normalized(&mut self, x: f32, y: f32) {
        self.mouse = (x, y);
    }

    /// Mouse position in `0.0..=1.0` screen space.
    pub fn mouse_normalized(&self) -> (f32, f32) {
        self.mouse
    }

    /// Whether mouse button `i` is held.
    pub fn mousebtn(&self, i: usize) -> bool {
        self.mouse_buttons.get(i).copied().unwrap_or(false)
    }

    /// Updates mouse button `i`, out of range is ignored.
    pub fn set_mouse_button(&mut self, i: usize, down: bool) {
        if let Some(b) = self.mouse_buttons.get_mut(i) {
            *b = down;
        }
    }

    /// Mouse x in screen pixels for a screen `width` pixels wide.
    pub fn mousex(&self, width: u32) -> i32 {
        (self.mouse.0 * width.saturating_sub(1) as f32).floor() as i32
    }

    /// Mouse y for a screen `height` pixels tall.
    pub fn mousey(&self, height: u32) -> i32 {
        (self.mouse.1 * height.saturating_sub(1) as f32).floor() as i32
    }
}
