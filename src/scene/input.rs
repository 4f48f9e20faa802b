use std::f32::consts::PI;

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::scene::drawable::Drawable;

pub const ROTATION_STEP: f32 = PI / 8.0;
pub const TRANSLATION_STEP: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// One incremental change to a transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformEdit {
    Translate { axis: Axis, amount: f32 },
    Rotate { axis: Axis, angle: f32 },
}

impl TransformEdit {
    pub fn matrix(&self) -> Mat4 {
        match *self {
            TransformEdit::Translate { axis, amount } => {
                Mat4::from_translation(axis.unit() * amount)
            }
            TransformEdit::Rotate { axis: Axis::X, angle } => Mat4::from_rotation_x(angle),
            TransformEdit::Rotate { axis: Axis::Y, angle } => Mat4::from_rotation_y(angle),
            TransformEdit::Rotate { axis: Axis::Z, angle } => Mat4::from_rotation_z(angle),
        }
    }
}

/// Maps key presses to edits of a single drawable.
///
/// Edits are applied to the drawable's transform and flag it dirty; drawing
/// is left to the next frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransformEditor;

impl TransformEditor {
    pub fn edit_for(key: KeyCode) -> Option<TransformEdit> {
        use TransformEdit::{Rotate, Translate};

        let step = TRANSLATION_STEP;
        let turn = ROTATION_STEP;
        let edit = match key {
            KeyCode::ArrowRight => Rotate { axis: Axis::Y, angle: turn },
            KeyCode::ArrowLeft => Rotate { axis: Axis::Y, angle: -turn },
            KeyCode::ArrowUp => Rotate { axis: Axis::X, angle: turn },
            KeyCode::ArrowDown => Rotate { axis: Axis::X, angle: -turn },
            KeyCode::PageUp => Rotate { axis: Axis::Z, angle: turn },
            KeyCode::PageDown => Rotate { axis: Axis::Z, angle: -turn },
            KeyCode::KeyW => Translate { axis: Axis::Y, amount: step },
            KeyCode::KeyS => Translate { axis: Axis::Y, amount: -step },
            KeyCode::KeyD => Translate { axis: Axis::X, amount: step },
            KeyCode::KeyA => Translate { axis: Axis::X, amount: -step },
            KeyCode::ShiftLeft => Translate { axis: Axis::Z, amount: step },
            KeyCode::ControlLeft => Translate { axis: Axis::Z, amount: -step },
            _ => return None,
        };
        Some(edit)
    }

    /// Returns `false` for keys outside the table; those change nothing.
    pub fn on_key(&self, key: KeyCode, target: &mut Drawable) -> bool {
        let Some(edit) = Self::edit_for(key) else {
            return false;
        };
        log::debug!("{:?}: {:?}", key, edit);
        target.apply_edit(edit.matrix());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_keys_cancel() {
        let pairs = [
            (KeyCode::KeyW, KeyCode::KeyS),
            (KeyCode::KeyD, KeyCode::KeyA),
            (KeyCode::ShiftLeft, KeyCode::ControlLeft),
            (KeyCode::ArrowRight, KeyCode::ArrowLeft),
            (KeyCode::ArrowUp, KeyCode::ArrowDown),
            (KeyCode::PageUp, KeyCode::PageDown),
        ];
        for (forward, back) in pairs {
            let a = TransformEditor::edit_for(forward).unwrap().matrix();
            let b = TransformEditor::edit_for(back).unwrap().matrix();
            assert!((a * b).abs_diff_eq(Mat4::IDENTITY, 1e-6), "{forward:?}/{back:?}");
        }
    }

    #[test]
    fn unmapped_keys_have_no_edit() {
        assert_eq!(TransformEditor::edit_for(KeyCode::KeyQ), None);
        assert_eq!(TransformEditor::edit_for(KeyCode::Tab), None);
        assert_eq!(TransformEditor::edit_for(KeyCode::ShiftRight), None);
    }
}
