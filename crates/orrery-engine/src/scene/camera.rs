use glam::{Mat4, Vec3};

use super::FrameInput;

/// Camera translation speed in units per second.
pub const MOVE_SPEED: f32 = 5.0;

/// Rotation rate in degrees per window-size of cursor travel.
///
/// Yaw is additionally scaled by the aspect ratio so horizontal and vertical
/// cursor travel feel the same on a non-square window.
pub const LOOK_RATE_DEG: f32 = 90.0;

/// Vertical field of view in degrees.
pub const FOV_Y_DEG: f32 = 45.0;

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// The camera's per-frame output: the matrices every draw call consumes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewTransforms {
    /// World-to-camera matrix (inverse of the camera-to-world transform).
    pub view: Mat4,

    /// Perspective projection for the current aspect ratio.
    pub projection: Mat4,
}

impl ViewTransforms {
    pub const IDENTITY: Self = Self {
        view: Mat4::IDENTITY,
        projection: Mat4::IDENTITY,
    };
}

impl Default for ViewTransforms {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// First-person camera: a world position plus yaw/pitch angles.
///
/// Not renderable; its whole output is the [`ViewTransforms`] returned from
/// [`Camera::update`].
pub struct Camera {
    position: Vec3,
    yaw_deg: f32,
    pitch_deg: f32,
}

impl Camera {
    /// Camera at the lesson start position, looking down -Z.
    pub fn new() -> Self {
        Self::with_position(Vec3::new(0.0, 0.0, 20.0))
    }

    pub fn with_position(position: Vec3) -> Self {
        Self {
            position,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Yaw in degrees, wrapped into [0, 360).
    pub fn yaw_deg(&self) -> f32 {
        self.yaw_deg
    }

    /// Pitch in degrees, clamped to [-90, 90].
    pub fn pitch_deg(&self) -> f32 {
        self.pitch_deg
    }

    /// Integrates mouse look and held movement keys, then produces the
    /// frame's view/projection matrices.
    pub fn update(&mut self, frame: &FrameInput<'_>) -> ViewTransforms {
        let viewport = frame.viewport;
        let aspect = viewport.aspect();

        // Mouse look. Cursor travel is normalized by the window size; moving
        // the cursor one window-width turns LOOK_RATE_DEG * aspect degrees.
        if viewport.is_valid() {
            let (dx, dy) = frame.input.cursor_delta();
            let yaw_delta = -(dx / viewport.width) * LOOK_RATE_DEG * aspect;
            let pitch_delta = -(dy / viewport.height) * LOOK_RATE_DEG;

            self.yaw_deg = (self.yaw_deg + yaw_delta).rem_euclid(360.0);
            self.pitch_deg = (self.pitch_deg + pitch_delta).clamp(-90.0, 90.0);
        }

        // Orientation: yaw about the vertical axis, then pitch about the
        // resulting local horizontal axis.
        let orientation = Mat4::from_rotation_y(self.yaw_deg.to_radians())
            * Mat4::from_rotation_x(self.pitch_deg.to_radians());

        // Translate along the orientation's basis columns: +X is right,
        // +Z is backward, so "forward" subtracts the Z column.
        let right = orientation.x_axis.truncate();
        let back = orientation.z_axis.truncate();
        let step = MOVE_SPEED * frame.dt;

        let movement = frame.input.movement();
        if movement.forward {
            self.position -= back * step;
        }
        if movement.back {
            self.position += back * step;
        }
        if movement.left {
            self.position -= right * step;
        }
        if movement.right {
            self.position += right * step;
        }

        let mut camera_to_world = orientation;
        camera_to_world.w_axis = self.position.extend(1.0);

        ViewTransforms {
            view: camera_to_world.inverse(),
            projection: Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect, Z_NEAR, Z_FAR),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputEvent, InputState, Key, KeyState};
    use crate::scene::Viewport;

    const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

    fn frame<'a>(dt: f32, input: &'a InputState) -> FrameInput<'a> {
        FrameInput {
            dt,
            viewport: VIEWPORT,
            input,
        }
    }

    fn input_with_cursor_delta(dx: f32, dy: f32) -> InputState {
        let mut input = InputState::default();
        input.apply_event(InputEvent::CursorMoved { x: 400.0, y: 300.0 });
        input.apply_event(InputEvent::CursorMoved {
            x: 400.0 + dx,
            y: 300.0 + dy,
        });
        input
    }

    fn input_with_key(key: Key) -> InputState {
        let mut input = InputState::default();
        input.apply_event(InputEvent::Key {
            key,
            state: KeyState::Pressed,
            repeat: false,
        });
        input
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new();

        let input = input_with_cursor_delta(0.0, -100_000.0);
        camera.update(&frame(1.0 / 60.0, &input));
        assert_eq!(camera.pitch_deg(), 90.0);

        let input = input_with_cursor_delta(0.0, 100_000.0);
        camera.update(&frame(1.0 / 60.0, &input));
        assert_eq!(camera.pitch_deg(), -90.0);
    }

    #[test]
    fn yaw_wraps_into_circle() {
        let mut camera = Camera::new();

        // A small positive cursor delta turns yaw negative; it must wrap.
        let input = input_with_cursor_delta(10.0, 0.0);
        camera.update(&frame(1.0 / 60.0, &input));
        assert!(camera.yaw_deg() >= 0.0 && camera.yaw_deg() < 360.0);
        assert!(camera.yaw_deg() > 180.0, "expected wrap below zero");

        let input = input_with_cursor_delta(-800.0 * 8.0, 0.0);
        camera.update(&frame(1.0 / 60.0, &input));
        assert!(camera.yaw_deg() >= 0.0 && camera.yaw_deg() < 360.0);
    }

    #[test]
    fn forward_moves_along_negative_local_z() {
        let input = input_with_key(Key::W);
        let mut camera = Camera::new();
        camera.update(&frame(2.0, &input));

        let p = camera.position();
        assert!((p.z - (20.0 - MOVE_SPEED * 2.0)).abs() < 1e-4);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
    }

    #[test]
    fn displacement_is_independent_of_frame_partitioning() {
        let input = input_with_key(Key::W);

        let mut one_step = Camera::new();
        one_step.update(&frame(1.0, &input));

        let mut many_steps = Camera::new();
        for _ in 0..60 {
            many_steps.update(&frame(1.0 / 60.0, &input));
        }

        assert!(one_step
            .position()
            .abs_diff_eq(many_steps.position(), 1e-3));
    }

    #[test]
    fn view_maps_camera_position_to_origin() {
        let input = input_with_cursor_delta(123.0, -45.0);
        let mut camera = Camera::with_position(Vec3::new(3.0, 1.0, -7.0));
        let transforms = camera.update(&frame(1.0 / 60.0, &input));

        let mapped = transforms.view.transform_point3(camera.position());
        assert!(mapped.abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn idle_input_leaves_camera_unchanged() {
        let input = InputState::default();
        let mut camera = Camera::new();
        camera.update(&frame(1.0 / 60.0, &input));

        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(camera.yaw_deg(), 0.0);
        assert_eq!(camera.pitch_deg(), 0.0);
    }
}
