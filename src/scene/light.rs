use glam::Vec3;

/// The scene's key light. Fixed once the scene is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    position: Vec3,
}

impl LightSource {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}
