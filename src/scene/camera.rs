use glam::{Mat4, Vec2, Vec3};

pub const MIN_DISTANCE: f32 = 1.0;
pub const MAX_DISTANCE: f32 = 60.0;
const MAX_PITCH: f32 = 1.5;
const ROTATE_SPEED: f32 = 0.005;
const ZOOM_SPEED: f32 = 1.0;

/// Pointer input collected between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraInput {
    /// Accumulated drag in pixels.
    pub rotate: Vec2,
    /// Accumulated wheel lines; positive zooms in.
    pub zoom: f32,
}

impl CameraInput {
    pub fn is_idle(&self) -> bool {
        self.rotate == Vec2::ZERO && self.zoom == 0.0
    }
}

/// Perspective look-at camera orbiting its target.
///
/// Input only accumulates; nothing moves until [`Camera::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    yaw: f32,
    pitch: f32,
    distance: f32,
    pending: CameraInput,
}

impl Camera {
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let pitch = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .asin()
            .clamp(-MAX_PITCH, MAX_PITCH);
        let yaw = offset.x.atan2(offset.z);

        let mut camera = Self {
            eye,
            target,
            up: Vec3::Y,
            fov_y_radians: 60f32.to_radians(),
            near: 0.1,
            far: 100.0,
            yaw,
            pitch,
            distance,
            pending: CameraInput::default(),
        };
        camera.eye = camera.orbit_eye();
        camera
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
    pub fn proj(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, aspect, self.near, self.far)
    }
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.proj(aspect) * self.view()
    }
    pub fn position(&self) -> Vec3 {
        self.eye
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn pending(&self) -> CameraInput {
        self.pending
    }

    pub fn queue_rotation(&mut self, delta: Vec2) {
        self.pending.rotate += delta;
    }

    pub fn queue_zoom(&mut self, lines: f32) {
        self.pending.zoom += lines;
    }

    /// Applies and consumes pending input. Returns whether the eye moved.
    pub fn update(&mut self) -> bool {
        let input = std::mem::take(&mut self.pending);
        if input.is_idle() {
            return false;
        }

        self.yaw -= input.rotate.x * ROTATE_SPEED;
        self.pitch = (self.pitch + input.rotate.y * ROTATE_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
        self.distance = (self.distance - input.zoom * ZOOM_SPEED).clamp(MIN_DISTANCE, MAX_DISTANCE);

        let eye = self.orbit_eye();
        let moved = eye != self.eye;
        self.eye = eye;
        moved
    }

    fn orbit_eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch) * self.distance
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn view_proj_is_reasonable() {
        let cam = Camera::default();
        let vp = cam.view_proj(16.0 / 9.0);
        // Just ensure it's invertible and finite
        let inv = vp.inverse();
        let id = vp * inv;
        let eps = 1e-4;
        assert!(id.abs_diff_eq(Mat4::IDENTITY, eps));
    }

    #[test]
    fn looking_at_keeps_the_requested_eye() {
        let eye = Vec3::new(4.0, 6.0, 18.0);
        let cam = Camera::looking_at(eye, Vec3::new(0.0, -4.0, 2.0));
        assert!(cam.eye.abs_diff_eq(eye, 1e-4));
    }

    #[test]
    fn input_waits_for_update() {
        let mut cam = Camera::default();
        let before = cam.eye;

        cam.queue_rotation(Vec2::new(120.0, 0.0));
        assert_eq!(cam.eye, before);
        assert!(!cam.pending().is_idle());

        assert!(cam.update());
        assert_ne!(cam.eye, before);
        assert!(cam.pending().is_idle());
        assert!(!cam.update());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = Camera::default();
        cam.queue_zoom(1000.0);
        cam.update();
        assert_eq!(cam.distance(), MIN_DISTANCE);

        cam.queue_zoom(-1000.0);
        cam.update();
        assert_eq!(cam.distance(), MAX_DISTANCE);
        assert!(((cam.eye - cam.target).length() - MAX_DISTANCE).abs() < 1e-3);
    }
}
