use std::collections::HashMap;

use crate::asset::{AssetCache, Mesh, MeshHandle};
use crate::renderer::device::{
    ClearFlags, DrawCall, Program, RenderDevice, RenderError, RenderTarget, TargetDescriptor,
    TargetHandle, TargetKind,
};

/// Everything a [`HeadlessDevice`] was asked to do, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    CreateTarget(TargetHandle, TargetKind),
    ReleaseTarget(TargetHandle),
    BindTarget(RenderTarget),
    Clear {
        target: RenderTarget,
        flags: ClearFlags,
    },
    SetBlend(bool),
    Draw {
        target: RenderTarget,
        program: Program,
        mesh: MeshHandle,
        texture: Option<TargetHandle>,
        blend: bool,
    },
    Flush,
    Present,
}

/// One draw as it landed in a target, with the exact uniform bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDraw {
    pub program: Program,
    pub mesh: MeshHandle,
    pub texture: Option<TargetHandle>,
    pub blend: bool,
    pub uniforms: Vec<u8>,
}

/// A [`RenderDevice`] that renders nothing and remembers everything.
///
/// Each destination keeps the list of draws issued since its last clear,
/// which stands in for its pixel contents: two frames that leave equal lists
/// behind would have produced identical images.
pub struct HeadlessDevice {
    screen_size: (u32, u32),
    max_target_size: u32,
    meshes: AssetCache<Mesh>,
    targets: Vec<Option<TargetDescriptor>>,
    active: RenderTarget,
    blend: bool,
    events: Vec<DeviceEvent>,
    contents: HashMap<RenderTarget, Vec<RecordedDraw>>,
    hazards: Vec<DeviceEvent>,
}

impl HeadlessDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            screen_size: (width, height),
            max_target_size: 8192,
            meshes: AssetCache::new(),
            targets: Vec::new(),
            active: RenderTarget::Screen,
            blend: false,
            events: Vec::new(),
            contents: HashMap::new(),
            hazards: Vec::new(),
        }
    }

    /// Rejects target allocations above `size`, like a device limit would.
    pub fn with_max_target_size(mut self, size: u32) -> Self {
        self.max_target_size = size;
        self
    }

    pub fn events(&self) -> &[DeviceEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Draws issued into `target` since it was last cleared.
    pub fn contents(&self, target: RenderTarget) -> &[RecordedDraw] {
        self.contents.get(&target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Draws that sampled the target they were rendering into.
    pub fn sampling_hazards(&self) -> &[DeviceEvent] {
        &self.hazards
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    pub fn is_live(&self, target: TargetHandle) -> bool {
        self.descriptor(target).is_some()
    }

    pub fn live_targets(&self) -> usize {
        self.targets.iter().filter(|slot| slot.is_some()).count()
    }

    fn descriptor(&self, target: TargetHandle) -> Option<&TargetDescriptor> {
        self.targets.get(target.index()).and_then(Option::as_ref)
    }

    fn is_valid(&self, target: RenderTarget) -> bool {
        match target.handle() {
            None => true,
            Some(handle) => match (self.descriptor(handle), target) {
                (Some(d), RenderTarget::Depth(_)) => d.kind == TargetKind::Depth,
                (Some(d), RenderTarget::CubeFace(..)) => d.kind == TargetKind::ColorCube,
                _ => false,
            },
        }
    }
}

impl RenderDevice for HeadlessDevice {
    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle {
        self.meshes.insert(mesh.clone())
    }

    fn create_target(&mut self, descriptor: TargetDescriptor) -> Result<TargetHandle, RenderError> {
        if descriptor.size == 0 || descriptor.size > self.max_target_size {
            return Err(RenderError::TargetAllocation {
                reason: format!("size must be within 1..={}", self.max_target_size),
                label: descriptor.label,
                kind: descriptor.kind,
                size: descriptor.size,
            });
        }

        let handle = TargetHandle::new(self.targets.len());
        self.events.push(DeviceEvent::CreateTarget(handle, descriptor.kind));
        self.targets.push(Some(descriptor));
        Ok(handle)
    }

    fn release_target(&mut self, target: TargetHandle) {
        if let Some(slot) = self.targets.get_mut(target.index()) {
            *slot = None;
        }
        self.contents.retain(|key, _| key.handle() != Some(target));
        self.events.push(DeviceEvent::ReleaseTarget(target));
    }

    fn target_size(&self, target: RenderTarget) -> (u32, u32) {
        match target.handle() {
            None => self.screen_size,
            Some(handle) => self
                .descriptor(handle)
                .map(|d| (d.size, d.size))
                .unwrap_or((0, 0)),
        }
    }

    fn bind_target(&mut self, target: RenderTarget) {
        if !self.is_valid(target) {
            log::warn!("Binding unknown render target {:?}", target);
        }
        self.active = target;
        self.events.push(DeviceEvent::BindTarget(target));
    }

    fn active_target(&self) -> RenderTarget {
        self.active
    }

    fn clear(&mut self, flags: ClearFlags, _color: [f32; 4]) {
        self.contents.insert(self.active, Vec::new());
        self.events.push(DeviceEvent::Clear {
            target: self.active,
            flags,
        });
    }

    fn set_blend(&mut self, enabled: bool) {
        self.blend = enabled;
        self.events.push(DeviceEvent::SetBlend(enabled));
    }

    fn blend_enabled(&self) -> bool {
        self.blend
    }

    fn draw(&mut self, call: &DrawCall) {
        let event = DeviceEvent::Draw {
            target: self.active,
            program: call.program,
            mesh: call.mesh,
            texture: call.texture,
            blend: self.blend,
        };

        if call.texture.is_some() && call.texture == self.active.handle() {
            log::warn!("{:?} samples its own render target", call.program);
            self.hazards.push(event.clone());
        }
        if self.meshes.get(call.mesh).is_none() {
            log::warn!("Draw with unknown mesh {:?}", call.mesh);
        }

        self.contents.entry(self.active).or_default().push(RecordedDraw {
            program: call.program,
            mesh: call.mesh,
            texture: call.texture,
            blend: self.blend,
            uniforms: call.uniforms.bytes().to_vec(),
        });
        self.events.push(event);
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.events.push(DeviceEvent::Flush);
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.events.push(DeviceEvent::Present);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::renderer::primitives::cube_mesh;
    use crate::renderer::uniforms::{DrawUniform, FrameUniforms};

    fn call(device: &mut HeadlessDevice, texture: Option<TargetHandle>) -> DrawCall {
        let frame = FrameUniforms::from_light(Vec3::ONE, Mat4::IDENTITY);
        DrawCall {
            program: Program::Lit,
            mesh: device.upload_mesh(&cube_mesh()),
            uniforms: DrawUniform::new(Mat4::IDENTITY, [1.0; 4], &frame),
            texture,
        }
    }

    #[test]
    fn clear_discards_previous_contents() {
        let mut device = HeadlessDevice::new(64, 64);
        let draw = call(&mut device, None);

        device.draw(&draw);
        device.draw(&draw);
        assert_eq!(device.contents(RenderTarget::Screen).len(), 2);

        device.clear(ClearFlags::COLOR | ClearFlags::DEPTH, [0.0; 4]);
        assert!(device.contents(RenderTarget::Screen).is_empty());
    }

    #[test]
    fn oversized_targets_are_rejected() {
        let mut device = HeadlessDevice::new(64, 64).with_max_target_size(256);
        let err = device
            .create_target(TargetDescriptor::depth("shadow", 512))
            .unwrap_err();
        assert!(matches!(err, RenderError::TargetAllocation { size: 512, .. }));
        assert_eq!(device.live_targets(), 0);
    }

    #[test]
    fn sampling_the_bound_target_is_flagged() {
        let mut device = HeadlessDevice::new(64, 64);
        let shadow = device
            .create_target(TargetDescriptor::depth("shadow", 128))
            .unwrap();
        let draw = call(&mut device, Some(shadow));

        device.bind_target(RenderTarget::Screen);
        device.draw(&draw);
        assert!(device.sampling_hazards().is_empty());

        device.bind_target(RenderTarget::Depth(shadow));
        device.draw(&draw);
        assert_eq!(device.sampling_hazards().len(), 1);
    }

    #[test]
    fn released_targets_report_zero_size() {
        let mut device = HeadlessDevice::new(64, 64);
        let cube = device
            .create_target(TargetDescriptor::color_cube("env", 32))
            .unwrap();
        assert_eq!(device.target_size(RenderTarget::Depth(cube)), (32, 32));

        device.release_target(cube);
        assert!(!device.is_live(cube));
        assert_eq!(device.target_size(RenderTarget::Depth(cube)), (0, 0));
        assert_eq!(device.target_size(RenderTarget::Screen), (64, 64));
    }
}
