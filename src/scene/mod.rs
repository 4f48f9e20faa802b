// scene/mod.rs

pub mod camera;
pub mod drawable;
pub mod input;
pub mod jungle;
pub mod light;
pub mod objects;
pub mod scatter;
pub mod scene;

pub use camera::{Camera, CameraInput};
pub use drawable::{Drawable, Model, ModelPart, ObjectGroup};
pub use input::{Axis, TransformEdit, TransformEditor};
pub use jungle::JungleLayout;
pub use light::LightSource;
pub use objects::SceneObjects;
pub use scatter::{in_water, scatter, vegetation_transform};
pub use scene::{Scene, SceneParts};
