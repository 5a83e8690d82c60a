//! Input mapping from raw events to semantic actions
//!
//! Maps keyboard, wheel, pointer and resize events to high-level actions.
//! Wheel deltas are passed through untouched; the flight controller decides
//! how many notches they are worth.

use shardgate_core::PortalQuad;
use shardgate_render::PerspectiveCamera;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Actions triggered by input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    /// Exit application (Escape)
    Exit,
    /// Reset camera and world switch (R key)
    Reset,
    /// Pause or resume the autopilot flight (Space)
    TogglePause,
    /// Mouse wheel moved
    Scroll(MouseScrollDelta),
    /// Left click landed on the portal surface
    PortalClicked,
    /// Pointer moved onto (true) or off (false) the portal surface
    PortalHover(bool),
    /// Viewport resized
    Resize { width: u32, height: u32 },
}

/// Maps raw input events to semantic actions
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Returns `Some(action)` for mapped keys on press, `None` otherwise
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<InputAction> {
        // Only handle key presses, not releases
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::Escape => Some(InputAction::Exit),
            KeyCode::KeyR => Some(InputAction::Reset),
            KeyCode::Space => Some(InputAction::TogglePause),
            _ => None,
        }
    }

    /// Map a wheel event; zero deltas are dropped
    pub fn map_scroll(delta: MouseScrollDelta) -> Option<InputAction> {
        let moved = match delta {
            MouseScrollDelta::LineDelta(_, y) => y != 0.0,
            MouseScrollDelta::PixelDelta(p) => p.y != 0.0,
        };
        moved.then_some(InputAction::Scroll(delta))
    }

    /// Map a mouse button press at `cursor` to a portal click
    ///
    /// Only a left press whose picking ray hits the portal quad counts.
    pub fn map_mouse_button(
        button: MouseButton,
        state: ElementState,
        cursor: PhysicalPosition<f64>,
        viewport: PhysicalSize<u32>,
        camera: &PerspectiveCamera,
        portal: &PortalQuad,
    ) -> Option<InputAction> {
        if button != MouseButton::Left || state != ElementState::Pressed {
            return None;
        }
        Self::pointer_hits_portal(cursor, viewport, camera, portal).then_some(InputAction::PortalClicked)
    }

    /// Map a pointer move to the portal hover state under the cursor
    pub fn map_cursor_moved(
        cursor: PhysicalPosition<f64>,
        viewport: PhysicalSize<u32>,
        camera: &PerspectiveCamera,
        portal: &PortalQuad,
    ) -> InputAction {
        InputAction::PortalHover(Self::pointer_hits_portal(cursor, viewport, camera, portal))
    }

    /// Whether the pixel under `cursor` shows the portal surface
    pub fn pointer_hits_portal(
        cursor: PhysicalPosition<f64>,
        viewport: PhysicalSize<u32>,
        camera: &PerspectiveCamera,
        portal: &PortalQuad,
    ) -> bool {
        if viewport.width == 0 || viewport.height == 0 {
            return false;
        }
        let ndc_x = (2.0 * cursor.x / viewport.width as f64 - 1.0) as f32;
        let ndc_y = (1.0 - 2.0 * cursor.y / viewport.height as f64) as f32;
        camera
            .screen_ray(ndc_x, ndc_y)
            .and_then(|(origin, dir)| portal.hit_test(origin, dir))
            .is_some()
    }

    /// Map a window resize; minimized (zero-sized) windows are ignored
    pub fn map_resize(size: PhysicalSize<u32>) -> Option<InputAction> {
        (size.width > 0 && size.height > 0).then_some(InputAction::Resize {
            width: size.width,
            height: size.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardgate_math::Vec3;

    fn viewport() -> PhysicalSize<u32> {
        PhysicalSize::new(800, 600)
    }

    #[test]
    fn test_escape_exits() {
        let action = InputMapper::map_keyboard(KeyCode::Escape, ElementState::Pressed);
        assert_eq!(action, Some(InputAction::Exit));
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::KeyR, ElementState::Pressed),
            Some(InputAction::Reset)
        );
        assert_eq!(
            InputMapper::map_keyboard(KeyCode::Space, ElementState::Pressed),
            Some(InputAction::TogglePause)
        );
        assert_eq!(InputMapper::map_keyboard(KeyCode::KeyW, ElementState::Pressed), None);
    }

    #[test]
    fn test_key_release_ignored() {
        let action = InputMapper::map_keyboard(KeyCode::Escape, ElementState::Released);
        assert_eq!(action, None);
    }

    #[test]
    fn test_scroll() {
        let delta = MouseScrollDelta::LineDelta(0.0, -1.0);
        assert_eq!(InputMapper::map_scroll(delta), Some(InputAction::Scroll(delta)));
        assert_eq!(InputMapper::map_scroll(MouseScrollDelta::LineDelta(0.0, 0.0)), None);
    }

    #[test]
    fn test_click_on_portal() {
        // Portal at (0, 1.5, 0), 4 wide and 6 tall; camera at (0, 0, 5) looking down -Z
        let camera = PerspectiveCamera::new(45.0, 800.0 / 600.0, 0.1, 60.0);
        let portal = PortalQuad::default();
        let center = PhysicalPosition::new(400.0, 300.0);
        assert_eq!(
            InputMapper::map_mouse_button(MouseButton::Left, ElementState::Pressed, center, viewport(), &camera, &portal),
            Some(InputAction::PortalClicked)
        );
        assert_eq!(
            InputMapper::map_mouse_button(MouseButton::Right, ElementState::Pressed, center, viewport(), &camera, &portal),
            None
        );
    }

    #[test]
    fn test_click_beside_portal() {
        let mut camera = PerspectiveCamera::new(45.0, 800.0 / 600.0, 0.1, 60.0);
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        let portal = PortalQuad::default();
        // Far right edge of the screen is ~2.75 units right of center at the portal plane
        let edge = PhysicalPosition::new(799.0, 300.0);
        assert!(!InputMapper::pointer_hits_portal(edge, viewport(), &camera, &portal));
    }

    #[test]
    fn test_cursor_hover() {
        let camera = PerspectiveCamera::new(45.0, 800.0 / 600.0, 0.1, 60.0);
        let portal = PortalQuad::default();
        assert_eq!(
            InputMapper::map_cursor_moved(PhysicalPosition::new(400.0, 300.0), viewport(), &camera, &portal),
            InputAction::PortalHover(true)
        );
        assert_eq!(
            InputMapper::map_cursor_moved(PhysicalPosition::new(799.0, 300.0), viewport(), &camera, &portal),
            InputAction::PortalHover(false)
        );
        // A minimized window has nothing under the cursor
        assert_eq!(
            InputMapper::map_cursor_moved(PhysicalPosition::new(0.0, 0.0), PhysicalSize::new(0, 0), &camera, &portal),
            InputAction::PortalHover(false)
        );
    }

    #[test]
    fn test_resize() {
        assert_eq!(
            InputMapper::map_resize(PhysicalSize::new(1024, 768)),
            Some(InputAction::Resize { width: 1024, height: 768 })
        );
        assert_eq!(InputMapper::map_resize(PhysicalSize::new(0, 768)), None);
    }
}
