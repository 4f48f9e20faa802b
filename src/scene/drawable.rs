use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::asset::{Mesh, MeshHandle};
use crate::renderer::{DrawInput, FrameUniforms, RenderDevice, ShadingTechnique};

/// A mesh placed in the world with the technique that shades it.
///
/// Mesh and technique are shared with every other drawable made from the
/// same model; only the transform belongs to this drawable.
#[derive(Clone, Debug)]
pub struct Drawable {
    pub name: Option<String>,
    mesh: MeshHandle,
    color: [f32; 4],
    technique: Rc<dyn ShadingTechnique>,
    transform: Mat4,
    dirty: bool,
}

impl Drawable {
    pub fn new(part: &ModelPart, technique: Rc<dyn ShadingTechnique>, transform: Mat4) -> Self {
        Self {
            name: None,
            mesh: part.mesh,
            color: part.color,
            technique,
            transform,
            dirty: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn world_position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// Post-multiplies `edit` onto the current transform and marks the
    /// drawable dirty.
    pub fn apply_edit(&mut self, edit: Mat4) {
        self.transform *= edit;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether the drawable was dirty.
    pub fn clear_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn input(&self) -> DrawInput {
        DrawInput {
            mesh: self.mesh,
            transform: self.transform,
            color: self.color,
        }
    }

    /// Draws with the drawable's own technique into the bound target.
    pub fn draw(&self, gfx: &mut dyn RenderDevice, frame: &FrameUniforms) {
        self.technique.apply(gfx, &self.input(), frame);
    }

    /// Draws with another technique, e.g. depth-only for the shadow pass.
    pub fn draw_with(
        &self,
        technique: &dyn ShadingTechnique,
        gfx: &mut dyn RenderDevice,
        frame: &FrameUniforms,
    ) {
        technique.apply(gfx, &self.input(), frame);
    }
}

/// Drawables made from the parts of one multi-mesh model. Always drawn
/// together.
#[derive(Clone, Debug)]
pub struct ObjectGroup {
    pub name: String,
    pub casts_shadow: bool,
    drawables: Vec<Drawable>,
}

impl ObjectGroup {
    pub fn new(name: impl Into<String>, drawables: Vec<Drawable>) -> Self {
        Self {
            name: name.into(),
            casts_shadow: true,
            drawables,
        }
    }

    pub fn without_shadow(mut self) -> Self {
        self.casts_shadow = false;
        self
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    pub fn draw(&self, gfx: &mut dyn RenderDevice, frame: &FrameUniforms) {
        for drawable in &self.drawables {
            drawable.draw(gfx, frame);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelPart {
    pub mesh: MeshHandle,
    pub color: [f32; 4],
}

/// A loaded model whose parts have been uploaded to the device. Cheap to
/// instantiate many times.
#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    parts: Vec<ModelPart>,
}

impl Model {
    /// Uploads every part with at least one triangle; empty parts are
    /// dropped.
    pub fn upload(gfx: &mut dyn RenderDevice, name: impl Into<String>, meshes: &[Mesh]) -> Self {
        let name = name.into();
        let parts = meshes
            .iter()
            .filter(|mesh| {
                if mesh.is_empty() {
                    log::debug!("Model {:?}: dropping empty part {:?}", name, mesh.name);
                }
                !mesh.is_empty()
            })
            .map(|mesh| ModelPart {
                mesh: gfx.upload_mesh(mesh),
                color: mesh.color,
            })
            .collect();
        Self { name, parts }
    }

    pub fn parts(&self) -> &[ModelPart] {
        &self.parts
    }

    /// Drops the first `count` parts.
    pub fn skip_parts(mut self, count: usize) -> Self {
        self.parts.drain(..count.min(self.parts.len()));
        self
    }

    pub fn first_part(&self) -> Option<&ModelPart> {
        self.parts.first()
    }

    pub fn instantiate(
        &self,
        technique: &Rc<dyn ShadingTechnique>,
        transform: Mat4,
    ) -> ObjectGroup {
        let drawables = self
            .parts
            .iter()
            .map(|part| {
                Drawable::new(part, Rc::clone(technique), transform).with_name(self.name.clone())
            })
            .collect();
        ObjectGroup::new(self.name.clone(), drawables)
    }
}
