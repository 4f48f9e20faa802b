use crate::scene::drawable::{Drawable, ObjectGroup};

/// Every drawable in the scene, grouped by how the frame treats it.
#[derive(Clone, Debug)]
pub struct SceneObjects {
    /// Single-mesh entities drawn in the blended opaque pass (ground, water,
    /// large actors). Also seen by the environment capture.
    pub opaque: Vec<Drawable>,
    /// The object the environment map is captured around. Editable.
    pub reflective: Drawable,
    /// Scattered foliage; starts empty and may stay empty.
    pub vegetation: Vec<ObjectGroup>,
    /// Multi-part models drawn after the vegetation.
    pub models: Vec<ObjectGroup>,
}

impl SceneObjects {
    pub fn new(opaque: Vec<Drawable>, reflective: Drawable) -> Self {
        Self {
            opaque,
            reflective,
            vegetation: Vec::new(),
            models: Vec::new(),
        }
    }

    /// Everything the light's depth map is rendered from.
    pub fn shadow_casters(&self) -> impl Iterator<Item = &Drawable> {
        self.opaque
            .iter()
            .chain(std::iter::once(&self.reflective))
            .chain(self.vegetation.iter().flat_map(|group| group.drawables()))
            .chain(
                self.models
                    .iter()
                    .filter(|group| group.casts_shadow)
                    .flat_map(|group| group.drawables()),
            )
    }

    /// What the reflective object sees: everything but itself and the model
    /// groups.
    pub fn reflected(&self) -> impl Iterator<Item = &Drawable> {
        self.opaque
            .iter()
            .chain(self.vegetation.iter().flat_map(|group| group.drawables()))
    }

    /// Drawables of the main opaque pass, reflective object last.
    pub fn opaque_pass(&self) -> impl Iterator<Item = &Drawable> {
        self.opaque.iter().chain(std::iter::once(&self.reflective))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glam::Mat4;

    use super::*;
    use crate::asset::MeshHandle;
    use crate::renderer::PlainLit;
    use crate::scene::drawable::ModelPart;

    fn drawable(mesh: usize) -> Drawable {
        let part = ModelPart {
            mesh: MeshHandle::new(mesh),
            color: [1.0; 4],
        };
        Drawable::new(&part, Rc::new(PlainLit), Mat4::IDENTITY)
    }

    fn meshes<'a>(drawables: impl Iterator<Item = &'a Drawable>) -> Vec<usize> {
        drawables.map(|d| d.mesh().index()).collect()
    }

    #[test]
    fn subsets_follow_the_frame_roles() {
        let mut objects = SceneObjects::new(vec![drawable(0), drawable(1)], drawable(9));
        objects.vegetation.push(ObjectGroup::new("tree", vec![drawable(2)]));
        objects.models.push(ObjectGroup::new("tiger", vec![drawable(3), drawable(4)]));
        objects
            .models
            .push(ObjectGroup::new("aztec", vec![drawable(5)]).without_shadow());

        assert_eq!(meshes(objects.shadow_casters()), vec![0, 1, 9, 2, 3, 4]);
        assert_eq!(meshes(objects.reflected()), vec![0, 1, 2]);
        assert_eq!(meshes(objects.opaque_pass()), vec![0, 1, 9]);
    }
}
