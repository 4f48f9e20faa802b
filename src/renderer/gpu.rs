// renderer/gpu.rs
use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::asset::{Mesh, MeshHandle};
use crate::renderer::device::{
    ClearFlags, DrawCall, RenderDevice, RenderError, RenderTarget, TargetDescriptor, TargetHandle,
    TargetKind,
};
use crate::renderer::internal::{
    DrawUniformBuffer, GpuMesh, GpuTarget, PipelineCache, PipelineKey, RenderContext, TextureSlot,
    CAPTURE_FORMAT,
};
use crate::settings::RenderSettings;

const INITIAL_DRAW_CAPACITY: u32 = 1024;

struct DrawRecord {
    key: PipelineKey,
    mesh: MeshHandle,
    uniform_offset: u32,
    texture: Option<(TextureSlot, TargetHandle)>,
}

/// Draws into one destination, started by a bind or a clear.
struct PassRecord {
    target: RenderTarget,
    clear: ClearFlags,
    clear_color: wgpu::Color,
    draws: Vec<DrawRecord>,
}

/// [`RenderDevice`] backed by wgpu.
///
/// Clears and draws are recorded into passes as they arrive and encoded on
/// `present` or `flush`, one render pass per recorded destination change.
pub struct GpuDevice {
    context: RenderContext,
    pipelines: PipelineCache,
    uniforms: DrawUniformBuffer,
    meshes: Vec<GpuMesh>,
    targets: Vec<Option<(TargetDescriptor, GpuTarget)>>,
    texture_bind_groups: HashMap<(TextureSlot, TargetHandle), wgpu::BindGroup>,
    passes: Vec<PassRecord>,
    active: RenderTarget,
    blend: bool,
}

impl GpuDevice {
    pub async fn new(window: Arc<Window>, settings: &RenderSettings) -> Result<Self, RenderError> {
        let context = RenderContext::new(window, settings).await?;
        let uniforms = DrawUniformBuffer::new(&context.device, INITIAL_DRAW_CAPACITY);
        let pipelines = PipelineCache::new(&context.device, &uniforms.bind_layout);

        log::info!(
            "GPU device ready: {}x{} {:?}",
            context.config.width,
            context.config.height,
            context.config.format
        );

        Ok(Self {
            context,
            pipelines,
            uniforms,
            meshes: Vec::new(),
            targets: Vec::new(),
            texture_bind_groups: HashMap::new(),
            passes: Vec::new(),
            active: RenderTarget::Screen,
            blend: false,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    fn target(&self, handle: TargetHandle) -> Option<&(TargetDescriptor, GpuTarget)> {
        self.targets.get(handle.index()).and_then(Option::as_ref)
    }

    fn color_format(&self, target: RenderTarget) -> Option<wgpu::TextureFormat> {
        match target {
            RenderTarget::Screen => Some(self.context.config.format),
            RenderTarget::CubeFace(..) => Some(CAPTURE_FORMAT),
            RenderTarget::Depth(_) => None,
        }
    }

    fn current_pass(&mut self) -> &mut PassRecord {
        let reuse = self
            .passes
            .last()
            .is_some_and(|pass| pass.target == self.active);
        if !reuse {
            self.passes.push(PassRecord {
                target: self.active,
                clear: ClearFlags::empty(),
                clear_color: wgpu::Color::BLACK,
                draws: Vec::new(),
            });
        }
        let last = self.passes.len() - 1;
        &mut self.passes[last]
    }

    fn ensure_texture_bind_group(&mut self, slot: TextureSlot, handle: TargetHandle) -> bool {
        if self.texture_bind_groups.contains_key(&(slot, handle)) {
            return true;
        }
        let Some((descriptor, target)) = self.target(handle) else {
            return false;
        };
        let Some(layout) = self.pipelines.texture_layout(slot) else {
            return false;
        };

        let device = &self.context.device;
        let label = format!("{}BindGroup", descriptor.label);
        let bind_group = match (slot, target) {
            (TextureSlot::ShadowCompare, GpuTarget::Depth(depth)) => {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&label),
                    layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&depth.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(
                                &self.pipelines.shadow_sampler,
                            ),
                        },
                    ],
                })
            }
            (TextureSlot::EnvironmentCube, GpuTarget::Cube(cube)) => {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&label),
                    layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&cube.cube_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(
                                &self.pipelines.environment_sampler,
                            ),
                        },
                    ],
                })
            }
            (TextureSlot::DepthLoad, GpuTarget::Depth(depth)) => {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&label),
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&depth.view),
                    }],
                })
            }
            _ => return false,
        };

        self.texture_bind_groups.insert((slot, handle), bind_group);
        true
    }

    /// Encodes every recorded pass. Screen passes need `screen`; without it
    /// they are dropped.
    fn submit(&mut self, screen: Option<&wgpu::TextureView>) {
        let passes = mem::take(&mut self.passes);
        self.uniforms.upload(&self.context.device, &self.context.queue);

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("FrameEncoder"),
            });

        for pass in &passes {
            let (color_view, depth_view) = match pass.target {
                RenderTarget::Screen => match screen {
                    Some(view) => (Some(view), &self.context.depth.view),
                    None => {
                        log::warn!(
                            "Dropping {} screen draws recorded without a present",
                            pass.draws.len()
                        );
                        continue;
                    }
                },
                RenderTarget::Depth(handle) => match self.target(handle) {
                    Some((_, GpuTarget::Depth(depth))) => (None, &depth.view),
                    _ => continue,
                },
                RenderTarget::CubeFace(handle, face) => match self.target(handle) {
                    Some((_, GpuTarget::Cube(cube))) => {
                        (Some(cube.face_view(face)), &cube.depth.view)
                    }
                    _ => continue,
                },
            };

            let color_attachments = color_attachments(color_view, pass);
            let depth_load = if pass.clear.contains(ClearFlags::DEPTH) {
                wgpu::LoadOp::Clear(1.0)
            } else {
                wgpu::LoadOp::Load
            };

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(&format!("{:?}Pass", pass.target)),
                color_attachments: &color_attachments,
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for draw in &pass.draws {
                let Some(pipeline) = self.pipelines.get(&draw.key) else {
                    continue;
                };
                let Some(mesh) = self.meshes.get(draw.mesh.index()) else {
                    continue;
                };

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &self.uniforms.bind_group, &[draw.uniform_offset]);
                if let Some(bind_group) = draw
                    .texture
                    .and_then(|key| self.texture_bind_groups.get(&key))
                {
                    rpass.set_bind_group(1, bind_group, &[]);
                }
                rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.context.queue.submit(Some(encoder.finish()));
        self.uniforms.clear();
    }
}

/// Attachments for a pass; depth-only passes get none.
fn color_attachments<'a>(
    view: Option<&'a wgpu::TextureView>,
    pass: &PassRecord,
) -> Vec<Option<wgpu::RenderPassColorAttachment<'a>>> {
    let load = if pass.clear.contains(ClearFlags::COLOR) {
        wgpu::LoadOp::Clear(pass.clear_color)
    } else {
        wgpu::LoadOp::Load
    };
    view.into_iter()
        .map(|view| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })
        })
        .collect()
}

impl RenderDevice for GpuDevice {
    fn upload_mesh(&mut self, mesh: &Mesh) -> MeshHandle {
        let handle = MeshHandle::new(self.meshes.len());
        self.meshes.push(GpuMesh::new(&self.context.device, mesh));
        handle
    }

    fn create_target(&mut self, descriptor: TargetDescriptor) -> Result<TargetHandle, RenderError> {
        let max = self.context.device.limits().max_texture_dimension_2d;
        if descriptor.size == 0 || descriptor.size > max {
            return Err(RenderError::TargetAllocation {
                reason: format!("size must be within 1..={max}"),
                label: descriptor.label,
                kind: descriptor.kind,
                size: descriptor.size,
            });
        }

        log::debug!(
            "Creating {:?} target {:?} ({}x{})",
            descriptor.kind,
            descriptor.label,
            descriptor.size,
            descriptor.size
        );
        let target = GpuTarget::new(&self.context.device, &descriptor);
        let handle = TargetHandle::new(self.targets.len());
        self.targets.push(Some((descriptor, target)));
        Ok(handle)
    }

    fn release_target(&mut self, target: TargetHandle) {
        if let Some(slot) = self.targets.get_mut(target.index()) {
            *slot = None;
        }
        self.texture_bind_groups.retain(|(_, handle), _| *handle != target);
        self.passes.retain(|pass| pass.target.handle() != Some(target));
    }

    fn target_size(&self, target: RenderTarget) -> (u32, u32) {
        match target.handle() {
            None => (self.context.config.width, self.context.config.height),
            Some(handle) => self
                .target(handle)
                .map(|(d, _)| (d.size, d.size))
                .unwrap_or((0, 0)),
        }
    }

    fn bind_target(&mut self, target: RenderTarget) {
        let known = match target {
            RenderTarget::Screen => true,
            RenderTarget::Depth(handle) => {
                matches!(self.target(handle), Some((d, _)) if d.kind == TargetKind::Depth)
            }
            RenderTarget::CubeFace(handle, _) => {
                matches!(self.target(handle), Some((d, _)) if d.kind == TargetKind::ColorCube)
            }
        };
        if !known {
            log::warn!("Binding unknown render target {:?}", target);
        }
        self.active = target;
    }

    fn active_target(&self) -> RenderTarget {
        self.active
    }

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4]) {
        let pass = self.current_pass();
        if !pass.draws.is_empty() {
            let target = pass.target;
            self.passes.push(PassRecord {
                target,
                clear: ClearFlags::empty(),
                clear_color: wgpu::Color::BLACK,
                draws: Vec::new(),
            });
        }
        let pass = self.current_pass();
        pass.clear |= flags;
        pass.clear_color = wgpu::Color {
            r: color[0] as f64,
            g: color[1] as f64,
            b: color[2] as f64,
            a: color[3] as f64,
        };
    }

    fn set_blend(&mut self, enabled: bool) {
        self.blend = enabled;
    }

    fn blend_enabled(&self) -> bool {
        self.blend
    }

    fn draw(&mut self, call: &DrawCall) {
        let target = self.active;
        if call.program.writes_color() != target.has_color() {
            log::warn!("Skipping {:?} draw into {:?}", call.program, target);
            return;
        }
        if call.texture.is_some() && call.texture == target.handle() {
            log::warn!(
                "Skipping {:?} draw sampling its own target {:?}",
                call.program,
                target
            );
            return;
        }

        if self
            .meshes
            .get(call.mesh.index())
            .is_none_or(|mesh| mesh.index_count == 0)
        {
            log::debug!("Skipping {:?} draw of empty mesh {:?}", call.program, call.mesh);
            return;
        }

        let texture = match (TextureSlot::for_program(call.program), call.texture) {
            (Some(slot), Some(handle)) => {
                if !self.ensure_texture_bind_group(slot, handle) {
                    log::warn!("Skipping {:?} draw: cannot bind {:?}", call.program, handle);
                    return;
                }
                Some((slot, handle))
            }
            (Some(_), None) => {
                log::warn!("Skipping {:?} draw without a texture", call.program);
                return;
            }
            (None, _) => None,
        };

        let key = PipelineKey {
            program: call.program,
            alpha_blend: self.blend && target.has_color(),
            color_format: self.color_format(target),
        };
        self.pipelines.ensure(&self.context.device, key);

        let uniform_offset = self.uniforms.push(&call.uniforms);
        self.current_pass().draws.push(DrawRecord {
            key,
            mesh: call.mesh,
            uniform_offset,
            texture,
        });
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.submit(None);
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.context.reconfigure();
                self.passes.clear();
                self.uniforms.clear();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                self.passes.clear();
                self.uniforms.clear();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.submit(Some(&view));
        output.present();
        Ok(())
    }
}
