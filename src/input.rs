use winit::event::{ElementState, MouseButton, VirtualKeyCode};

/// User actions the pinball demo reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoAction {
    /// Remove every ball and restart spawning (Enter).
    ResetBalls,
    /// Kick every ball with a randomized velocity (Space).
    Impulse,
}

/// Maps a key release to a demo action. Both bindings fire on release, like
/// the original `keyup` handlers.
pub fn action_for_key(state: ElementState, key: VirtualKeyCode) -> Option<DemoAction> {
    if state != ElementState::Released {
        return None;
    }
    match key {
        VirtualKeyCode::Return => Some(DemoAction::ResetBalls),
        VirtualKeyCode::Space => Some(DemoAction::Impulse),
        _ => None,
    }
}

/// Converts raw mouse events into orbit deltas while the left button is held.
#[derive(Debug, Default)]
pub struct OrbitInput {
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

/// Radians of rotation per pixel of drag.
const DRAG_SPEED: f32 = 0.005;

impl OrbitInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        if button != MouseButton::Left {
            return;
        }
        self.dragging = state == ElementState::Pressed;
        if !self.dragging {
            self.last_cursor = None;
        }
    }

    /// Returns `(d_azimuth, d_polar)` in radians when a drag is in progress.
    pub fn handle_cursor(&mut self, x: f64, y: f64) -> Option<(f32, f32)> {
        if !self.dragging {
            self.last_cursor = None;
            return None;
        }
        let delta = self.last_cursor.map(|(last_x, last_y)| {
            (
                -(x - last_x) as f32 * DRAG_SPEED,
                -(y - last_y) as f32 * DRAG_SPEED,
            )
        });
        self.last_cursor = Some((x, y));
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_release_resets_and_space_release_impulses() {
        assert_eq!(
            action_for_key(ElementState::Released, VirtualKeyCode::Return),
            Some(DemoAction::ResetBalls)
        );
        assert_eq!(
            action_for_key(ElementState::Released, VirtualKeyCode::Space),
            Some(DemoAction::Impulse)
        );
        assert_eq!(
            action_for_key(ElementState::Released, VirtualKeyCode::A),
            None
        );
    }

    #[test]
    fn key_presses_do_not_trigger_actions() {
        assert_eq!(
            action_for_key(ElementState::Pressed, VirtualKeyCode::Return),
            None
        );
        assert_eq!(
            action_for_key(ElementState::Pressed, VirtualKeyCode::Space),
            None
        );
    }

    #[test]
    fn cursor_deltas_only_flow_while_dragging() {
        let mut input = OrbitInput::new();
        assert!(input.handle_cursor(10.0, 10.0).is_none());

        input.handle_mouse_button(ElementState::Pressed, MouseButton::Left);
        // first sample only anchors the drag
        assert!(input.handle_cursor(10.0, 10.0).is_none());
        let (d_azimuth, d_polar) = input.handle_cursor(20.0, 14.0).unwrap();
        assert!((d_azimuth - (-10.0 * DRAG_SPEED)).abs() < 1e-6);
        assert!((d_polar - (-4.0 * DRAG_SPEED)).abs() < 1e-6);

        input.handle_mouse_button(ElementState::Released, MouseButton::Left);
        assert!(input.handle_cursor(30.0, 30.0).is_none());
    }

    #[test]
    fn right_button_does_not_start_a_drag() {
        let mut input = OrbitInput::new();
        input.handle_mouse_button(ElementState::Pressed, MouseButton::Right);
        assert!(input.handle_cursor(5.0, 5.0).is_none());
    }
}
