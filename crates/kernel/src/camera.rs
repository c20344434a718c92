use glam::{Mat4, UVec2, Vec2, Vec3};
use tidewater_input::{InputFrame, MoveIntent};

use crate::config::CameraConfig;

/// First-person camera driven by yaw/pitch and WASD-style movement intent.
///
/// The camera is a passive state container. Anything may rewrite
/// `position` or `pitch` between frames (the reflection pass does), as long
/// as it calls [`Camera::recompute`] before reading the view matrix.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Radians. Unclamped; wraps through trigonometric periodicity.
    pub yaw: f32,
    /// Radians, kept within the configured pitch limit by [`Camera::rotate`].
    pub pitch: f32,
    speed: f32,
    sensitivity: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    pitch_limit: f32,
    viewport: UVec2,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    pub fn new(config: &CameraConfig, viewport: UVec2) -> Self {
        let mut camera = Self {
            position: config.spawn,
            yaw: 0.0,
            pitch: 0.0,
            speed: config.speed,
            sensitivity: config.sensitivity,
            fov_y: config.fov_y_degrees.to_radians(),
            near: config.near,
            far: config.far,
            pitch_limit: config.pitch_limit_degrees.abs().to_radians(),
            viewport: viewport.max(UVec2::ONE),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.recompute_projection();
        camera.recompute();
        camera
    }

    /// Integrate pointer movement in pixels.
    ///
    /// Moving the pointer right turns right and moving it up looks up.
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw += -delta.x * self.sensitivity;
        self.pitch = (self.pitch - delta.y * self.sensitivity)
            .clamp(-self.pitch_limit, self.pitch_limit);
    }

    /// Move along the XZ plane. Y is left to whoever else owns it.
    ///
    /// Backward only applies when forward is not held. Strafing is
    /// independent, and left and right cancel when both are held.
    pub fn translate(&mut self, intent: MoveIntent) {
        let (sin, cos) = self.yaw.sin_cos();
        let step = self.speed;
        if intent.forward {
            self.position.x -= sin * step;
            self.position.z -= cos * step;
        } else if intent.backward {
            self.position.x += sin * step;
            self.position.z += cos * step;
        }
        if intent.left {
            self.position.x -= cos * step;
            self.position.z += sin * step;
        }
        if intent.right {
            self.position.x += cos * step;
            self.position.z -= sin * step;
        }
    }

    /// Look first, then move, so movement uses this frame's heading.
    pub fn apply_input(&mut self, frame: &InputFrame) {
        self.rotate(frame.pointer_delta);
        self.translate(frame.intent);
    }

    /// Rebuild the view matrix: `rotX(-pitch) * rotY(-yaw) * translate(-position)`.
    pub fn recompute(&mut self) {
        self.view = Mat4::from_rotation_x(-self.pitch)
            * Mat4::from_rotation_y(-self.yaw)
            * Mat4::from_translation(-self.position);
    }

    /// Apply one frame of input and return `(view, projection)`.
    pub fn update(&mut self, frame: &InputFrame) -> (Mat4, Mat4) {
        self.apply_input(frame);
        self.recompute();
        (self.view, self.projection)
    }

    /// Resize the viewport. Zero extents are clamped to 1. Returns whether
    /// the projection changed.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        let size = UVec2::new(width, height).max(UVec2::ONE);
        if size == self.viewport {
            return false;
        }
        self.viewport = size;
        self.recompute_projection();
        tracing::debug!(width = size.x, height = size.y, "camera viewport resized");
        true
    }

    fn recompute_projection(&mut self) {
        let aspect = self.viewport.x as f32 / self.viewport.y as f32;
        self.projection = Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far);
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    pub fn pitch_limit(&self) -> f32 {
        self.pitch_limit
    }

    /// World-space look direction.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), UVec2::new(800, 600))
    }

    fn intent(forward: bool, backward: bool, left: bool, right: bool) -> MoveIntent {
        MoveIntent {
            forward,
            backward,
            left,
            right,
        }
    }

    #[test]
    fn spawns_at_configured_position() {
        let cam = camera();
        assert_eq!(cam.position, Vec3::new(0.0, 33.0, -4.0));
        assert_eq!(cam.pitch, 0.0);
        assert!(!cam.view_projection().col(0).x.is_nan());
    }

    #[test]
    fn forward_at_zero_yaw_moves_toward_negative_z() {
        let mut cam = camera();
        cam.translate(intent(true, false, false, false));
        assert!((cam.position - Vec3::new(0.0, 33.0, -4.1)).length() < 1e-6);
    }

    #[test]
    fn forward_wins_over_backward() {
        let mut both = camera();
        let mut fwd = camera();
        both.translate(intent(true, true, false, false));
        fwd.translate(intent(true, false, false, false));
        assert_eq!(both.position, fwd.position);
    }

    #[test]
    fn backward_applies_alone() {
        let mut cam = camera();
        cam.translate(intent(false, true, false, false));
        assert!((cam.position.z - -3.9).abs() < 1e-6);
    }

    #[test]
    fn strafe_combines_with_forward() {
        let mut cam = camera();
        cam.translate(intent(true, false, true, false));
        assert!((cam.position.x - -0.1).abs() < 1e-6);
        assert!((cam.position.z - -4.1).abs() < 1e-6);
    }

    #[test]
    fn left_and_right_cancel() {
        let mut cam = camera();
        cam.translate(intent(false, false, true, true));
        assert!((cam.position - Vec3::new(0.0, 33.0, -4.0)).length() < 1e-6);
    }

    #[test]
    fn movement_never_changes_y() {
        let mut cam = camera();
        cam.pitch = 1.0;
        cam.yaw = 0.7;
        for _ in 0..50 {
            cam.translate(intent(true, false, false, true));
        }
        assert_eq!(cam.position.y, 33.0);
    }

    #[test]
    fn movement_follows_yaw() {
        let mut cam = camera();
        cam.yaw = std::f32::consts::FRAC_PI_2;
        cam.translate(intent(true, false, false, false));
        assert!((cam.position.x - -0.1).abs() < 1e-6);
        assert!((cam.position.z - -4.0).abs() < 1e-6);
        // Forward movement agrees with the look direction.
        let dir = cam.forward();
        assert!((dir - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn pointer_right_turns_right_and_up_looks_up() {
        let mut cam = camera();
        cam.rotate(Vec2::new(100.0, -100.0));
        assert!((cam.yaw - -0.3).abs() < 1e-6);
        assert!((cam.pitch - 0.3).abs() < 1e-6);
        let dir = cam.forward();
        assert!(dir.x > 0.0 && dir.y > 0.0 && dir.z < 0.0);
    }

    #[test]
    fn pitch_never_leaves_limit() {
        let mut cam = camera();
        let limit = 89.0_f32.to_radians();
        for dy in [-5000.0, 10.0, 100_000.0, -3.0, -1e9, 1e9, 0.5] {
            cam.rotate(Vec2::new(0.0, dy));
            assert!(cam.pitch.abs() <= limit, "pitch {} escaped", cam.pitch);
        }
    }

    #[test]
    fn yaw_is_unclamped() {
        let mut cam = camera();
        cam.rotate(Vec2::new(-10_000.0, 0.0));
        assert!((cam.yaw - 30.0).abs() < 1e-3);
    }

    #[test]
    fn view_moves_world_opposite_to_camera() {
        let mut cam = camera();
        cam.recompute();
        let eye = cam.view() * cam.position.extend(1.0);
        assert!((eye - Vec4::W).length() < 1e-5);
        let ahead = cam.view() * (cam.position + Vec3::NEG_Z).extend(1.0);
        assert!((ahead.truncate() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn view_matches_rotation_order() {
        let mut cam = camera();
        cam.yaw = 0.4;
        cam.pitch = -0.2;
        cam.position = Vec3::new(3.0, 1.0, 2.0);
        cam.recompute();
        let expected = Mat4::from_rotation_x(0.2)
            * Mat4::from_rotation_y(-0.4)
            * Mat4::from_translation(Vec3::new(-3.0, -1.0, -2.0));
        assert!(cam.view().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn stale_view_until_recompute() {
        let mut cam = camera();
        let before = cam.view();
        cam.position.x += 10.0;
        assert_eq!(cam.view(), before);
        cam.recompute();
        assert_ne!(cam.view(), before);
    }

    #[test]
    fn update_returns_current_matrices() {
        let mut cam = camera();
        let frame = InputFrame {
            intent: intent(true, false, false, false),
            pointer_delta: Vec2::new(5.0, 0.0),
        };
        let (view, projection) = cam.update(&frame);
        assert_eq!(view, cam.view());
        assert_eq!(projection, cam.projection());
        assert!(cam.position.z < -4.0);
    }

    #[test]
    fn projection_only_changes_with_viewport() {
        let mut cam = camera();
        let before = cam.projection();
        assert!(!cam.set_viewport(800, 600));
        assert_eq!(cam.projection(), before);
        assert!(cam.set_viewport(1920, 1080));
        let expected = Mat4::perspective_rh(45.0_f32.to_radians(), 1920.0 / 1080.0, 0.1, 1000.0);
        assert!(cam.projection().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn zero_viewport_is_clamped() {
        let mut cam = camera();
        cam.set_viewport(0, 0);
        assert_eq!(cam.viewport(), UVec2::ONE);
        assert!(cam.projection().is_finite());
    }

    #[test]
    fn nan_position_propagates() {
        let mut cam = camera();
        cam.position.x = f32::NAN;
        cam.recompute();
        assert!(cam.view().is_nan());
    }
}
