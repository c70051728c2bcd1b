//! Pointer tracking for orbit controls.
//!
//! [`PointerState`] accumulates winit mouse events between frames. The frame
//! loop drains the left-drag delta and scroll lines once per frame with
//! [`take_drag`](PointerState::take_drag) and
//! [`take_scroll`](PointerState::take_scroll).

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of trackpad scroll treated as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Debug, Clone, Default)]
pub struct PointerState {
    position: Option<Vec2>,
    dragging: bool,
    drag: Vec2,
    scroll: f32,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `CursorMoved`. Movement only counts while the left button is held.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if self.dragging
            && let Some(prev) = self.position
        {
            self.drag += new_pos - prev;
        }
        self.position = Some(new_pos);
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state == ElementState::Pressed;
        }
    }

    /// `MouseWheel`. Positive is away from the user (zoom in).
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => self.scroll += y,
            MouseScrollDelta::PixelDelta(pos) => self.scroll += (pos.y / PIXELS_PER_LINE) as f32,
        }
    }

    /// `CursorLeft`. Ends any drag so a release outside the window cannot stick.
    pub fn on_cursor_left(&mut self) {
        self.position = None;
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Drag delta in physical pixels since the last call.
    pub fn take_drag(&mut self) -> Vec2 {
        std::mem::take(&mut self.drag)
    }

    /// Scroll in wheel lines since the last call.
    pub fn take_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_motion_without_button_is_ignored() {
        let mut pointer = PointerState::new();
        pointer.on_cursor_moved(10.0, 10.0);
        pointer.on_cursor_moved(50.0, 30.0);
        assert_eq!(pointer.take_drag(), Vec2::ZERO);
    }

    #[test]
    fn test_left_drag_accumulates_and_drains() {
        let mut pointer = PointerState::new();
        pointer.on_cursor_moved(10.0, 10.0);
        pointer.on_button(MouseButton::Left, ElementState::Pressed);
        pointer.on_cursor_moved(15.0, 8.0);
        pointer.on_cursor_moved(20.0, 4.0);
        assert!(pointer.is_dragging());
        assert_eq!(pointer.take_drag(), Vec2::new(10.0, -6.0));
        assert_eq!(pointer.take_drag(), Vec2::ZERO);

        pointer.on_button(MouseButton::Left, ElementState::Released);
        pointer.on_cursor_moved(100.0, 100.0);
        assert_eq!(pointer.take_drag(), Vec2::ZERO);
    }

    #[test]
    fn test_right_button_does_not_drag() {
        let mut pointer = PointerState::new();
        pointer.on_cursor_moved(0.0, 0.0);
        pointer.on_button(MouseButton::Right, ElementState::Pressed);
        pointer.on_cursor_moved(5.0, 5.0);
        assert!(!pointer.is_dragging());
        assert_eq!(pointer.take_drag(), Vec2::ZERO);
    }

    #[test]
    fn test_first_motion_after_press_has_no_jump() {
        let mut pointer = PointerState::new();
        pointer.on_button(MouseButton::Left, ElementState::Pressed);
        pointer.on_cursor_moved(300.0, 200.0);
        assert_eq!(pointer.take_drag(), Vec2::ZERO);
    }

    #[test]
    fn test_scroll_lines_and_pixels() {
        let mut pointer = PointerState::new();
        pointer.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        pointer.on_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 80.0)));
        assert!((pointer.take_scroll() - 3.0).abs() < 1e-6);
        assert_eq!(pointer.take_scroll(), 0.0);
    }

    #[test]
    fn test_cursor_left_ends_drag() {
        let mut pointer = PointerState::new();
        pointer.on_cursor_moved(0.0, 0.0);
        pointer.on_button(MouseButton::Left, ElementState::Pressed);
        pointer.on_cursor_left();
        assert!(!pointer.is_dragging());
        pointer.on_cursor_moved(40.0, 40.0);
        assert_eq!(pointer.take_drag(), Vec2::ZERO);
    }
}
