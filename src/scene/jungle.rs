//! The jungle clearing: terrain, a pond, scattered trees, a few animals, a
//! temple and a reflective diamond.

use std::f32::consts::{FRAC_PI_4, PI};
use std::path::PathBuf;
use std::rc::Rc;

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::asset::ModelLoader;
use crate::error::SceneError;
use crate::renderer::passes::{
    CubeCapture, DepthOverlay, EnvironmentCapture, ShadowPass, SkyBackdrop,
};
use crate::renderer::{
    EnvironmentSampling, PlainLit, RenderDevice, ShadingTechnique, ShadowSampling,
};
use crate::scene::camera::Camera;
use crate::scene::drawable::{Drawable, Model, ModelPart};
use crate::scene::light::LightSource;
use crate::scene::objects::SceneObjects;
use crate::scene::scatter::{in_water, scatter};
use crate::scene::scene::{Scene, SceneParts};
use crate::settings::RenderSettings;

pub const LIGHT_POSITION: Vec3 = Vec3::new(9.0, 9.0, 5.0);
pub const TREE_VARIANTS: [&str; 3] = ["single_tree", "double_tree", "triple_tree"];
const MODEL_EXTENSION: &str = "gltf";
const CAMERA_EYE: Vec3 = Vec3::new(0.0, 2.0, 18.0);
const CAMERA_TARGET: Vec3 = Vec3::new(0.0, -4.0, 2.0);

pub fn ground_transform() -> Mat4 {
    Mat4::from_scale(Vec3::new(0.75, 1.0, 0.75))
        * Mat4::from_translation(Vec3::new(0.0, -3.5, 0.0))
        * Mat4::from_rotation_y(PI)
}

pub fn water_transform() -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, -4.0, 2.0)) * Mat4::from_scale(Vec3::new(2.0, 1.0, 2.0))
}

pub fn hippo_transform() -> Mat4 {
    Mat4::from_translation(Vec3::new(-3.0, -4.0, 3.5))
        * Mat4::from_scale(Vec3::splat(0.5))
        * Mat4::from_rotation_y(FRAC_PI_4)
}

pub fn tiger_transform() -> Mat4 {
    Mat4::from_translation(Vec3::new(-0.75, -4.25, 4.5))
        * Mat4::from_scale(Vec3::splat(0.25))
        * Mat4::from_rotation_y(-FRAC_PI_4)
}

pub fn aztec_transform() -> Mat4 {
    Mat4::from_translation(Vec3::new(2.0, -4.5, 5.0)) * Mat4::from_rotation_y(-FRAC_PI_4)
}

pub fn diamond_transform() -> Mat4 {
    Mat4::from_translation(Vec3::new(2.0, -3.25, 5.0))
        * Mat4::from_scale(Vec3::splat(0.4))
        * Mat4::from_rotation_y(FRAC_PI_4)
}

/// Tunables for [`build`].
#[derive(Debug, Clone)]
pub struct JungleLayout {
    pub model_dir: PathBuf,
    pub vegetation: Vec<String>,
    pub attempts: usize,
    pub extent: f32,
    /// Candidates for which this returns true are dropped.
    pub exclusion: fn(f32, f32) -> bool,
    pub shadow_map_size: u32,
    pub environment_map_size: u32,
    pub show_shadow_map: bool,
}

impl JungleLayout {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            model_dir: settings.model_dir.clone(),
            vegetation: TREE_VARIANTS.iter().map(|name| name.to_string()).collect(),
            attempts: settings.vegetation.attempts,
            extent: settings.vegetation.extent,
            exclusion: in_water,
            shadow_map_size: settings.shadow_map_size,
            environment_map_size: settings.environment_map_size,
            show_shadow_map: settings.show_shadow_map,
        }
    }
}

impl Default for JungleLayout {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}

fn load(
    gfx: &mut dyn RenderDevice,
    loader: &dyn ModelLoader,
    layout: &JungleLayout,
    name: &str,
) -> Result<Model, SceneError> {
    let path = layout.model_dir.join(format!("{name}.{MODEL_EXTENSION}"));
    let meshes = loader.load_model(&path).map_err(|source| SceneError::Model {
        name: name.to_owned(),
        source,
    })?;
    Ok(Model::upload(gfx, name, &meshes))
}

fn first_part(model: &Model) -> Result<&ModelPart, SceneError> {
    model
        .first_part()
        .ok_or_else(|| SceneError::EmptyModel(model.name.clone()))
}

/// Loads every model, allocates the off-screen targets and places
/// everything.
pub fn build<R: Rng + ?Sized>(
    gfx: &mut dyn RenderDevice,
    loader: &dyn ModelLoader,
    layout: &JungleLayout,
    rng: &mut R,
) -> Result<Scene, SceneError> {
    if !(layout.extent.is_finite() && layout.extent > 0.0) {
        return Err(SceneError::InvalidSetting {
            name: "vegetation.extent",
            reason: format!("{} is not a positive number", layout.extent),
        });
    }

    let ground = *first_part(&load(gfx, loader, layout, "ground")?)?;
    let water = *first_part(&load(gfx, loader, layout, "water")?)?;
    let hippo = *first_part(&load(gfx, loader, layout, "hippo")?)?;
    let diamond = *first_part(&load(gfx, loader, layout, "diamond")?)?;
    let variants = layout
        .vegetation
        .iter()
        .map(|name| load(gfx, loader, layout, name))
        .collect::<Result<Vec<_>, _>>()?;
    let tiger = load(gfx, loader, layout, "tiger")?.skip_parts(1);
    if tiger.parts().is_empty() {
        return Err(SceneError::EmptyModel(tiger.name));
    }
    let aztec = load(gfx, loader, layout, "aztec")?;

    // Models first so a failed load leaves no targets behind.
    let shadows = ShadowPass::new(gfx, layout.shadow_map_size)?;
    let capture = match CubeCapture::new(gfx, layout.environment_map_size) {
        Ok(capture) => capture,
        Err(err) => {
            shadows.release(gfx);
            return Err(err.into());
        }
    };

    let plain: Rc<dyn ShadingTechnique> = Rc::new(PlainLit);
    let shadowed: Rc<dyn ShadingTechnique> = Rc::new(ShadowSampling {
        shadow_map: shadows.shadow_map(),
    });
    let reflective: Rc<dyn ShadingTechnique> = Rc::new(EnvironmentSampling {
        environment_map: capture.environment_map(),
    });

    let opaque = vec![
        Drawable::new(&ground, Rc::clone(&shadowed), ground_transform()).with_name("ground"),
        Drawable::new(&water, Rc::clone(&shadowed), water_transform()).with_name("water"),
        Drawable::new(&hippo, Rc::clone(&plain), hippo_transform()).with_name("hippo"),
    ];
    let diamond =
        Drawable::new(&diamond, reflective, diamond_transform()).with_name("diamond");
    let mut objects = SceneObjects::new(opaque, diamond);

    objects.vegetation = scatter(
        rng,
        &variants,
        layout.attempts,
        layout.extent,
        layout.exclusion,
        &plain,
    );

    objects.models.push(tiger.instantiate(&plain, tiger_transform()));
    objects
        .models
        .push(aztec.instantiate(&plain, aztec_transform()).without_shadow());

    log::info!(
        "Jungle scene: {} vegetation groups, {} model groups",
        objects.vegetation.len(),
        objects.models.len()
    );

    Ok(Scene::new(SceneParts {
        camera: Camera::looking_at(CAMERA_EYE, CAMERA_TARGET),
        light: LightSource::new(LIGHT_POSITION),
        objects,
        shadows,
        capture: Box::new(capture),
        sky: SkyBackdrop::new(gfx),
        overlay: DepthOverlay::new(gfx, layout.show_shadow_map),
    }))
}
