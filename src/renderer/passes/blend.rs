use std::ops::{Deref, DerefMut};

use crate::renderer::RenderDevice;

/// Alpha blending held for the guard's lifetime.
///
/// Enables blending on acquisition and disables it on drop, so every exit
/// from the scoped region (including `?`) leaves blending off.
pub struct BlendScope<'a> {
    gfx: &'a mut dyn RenderDevice,
}

impl<'a> BlendScope<'a> {
    pub fn acquire(gfx: &'a mut dyn RenderDevice) -> Self {
        gfx.set_blend(true);
        Self { gfx }
    }
}

impl<'a> Deref for BlendScope<'a> {
    type Target = dyn RenderDevice + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.gfx
    }
}

impl<'a> DerefMut for BlendScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.gfx
    }
}

impl Drop for BlendScope<'_> {
    fn drop(&mut self) {
        self.gfx.set_blend(false);
    }
}
