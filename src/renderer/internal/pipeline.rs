use std::collections::HashMap;

use crate::renderer::device::Program;
use crate::renderer::internal::targets::DEPTH_FORMAT;
use crate::renderer::{PipelineBuilder, Vertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    pub(crate) program: Program,
    pub(crate) alpha_blend: bool,
    /// `None` for depth-only passes.
    pub(crate) color_format: Option<wgpu::TextureFormat>,
}

/// What a program binds at group 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TextureSlot {
    ShadowCompare,
    EnvironmentCube,
    DepthLoad,
}

impl TextureSlot {
    pub(crate) fn for_program(program: Program) -> Option<Self> {
        match program {
            Program::ShadowLit => Some(TextureSlot::ShadowCompare),
            Program::Reflective => Some(TextureSlot::EnvironmentCube),
            Program::DepthOverlay => Some(TextureSlot::DepthLoad),
            Program::Lit | Program::DepthOnly | Program::Sky => None,
        }
    }
}

fn shader_source(program: Program) -> String {
    let body = match program {
        Program::Lit => include_str!("../../shader/lit.wgsl"),
        Program::ShadowLit => include_str!("../../shader/shadowed.wgsl"),
        Program::Reflective => include_str!("../../shader/reflective.wgsl"),
        Program::DepthOnly => include_str!("../../shader/depth.wgsl"),
        Program::Sky => include_str!("../../shader/sky.wgsl"),
        Program::DepthOverlay => include_str!("../../shader/overlay.wgsl"),
    };
    format!("{}\n{}", include_str!("../../shader/common.wgsl"), body)
}

fn texture_layout(device: &wgpu::Device, slot: TextureSlot) -> wgpu::BindGroupLayout {
    let (label, texture, sampler) = match slot {
        TextureSlot::ShadowCompare => (
            "ShadowMapLayout",
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Depth,
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            Some(wgpu::SamplerBindingType::Comparison),
        ),
        TextureSlot::EnvironmentCube => (
            "EnvironmentMapLayout",
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::Cube,
                multisampled: false,
            },
            Some(wgpu::SamplerBindingType::Filtering),
        ),
        TextureSlot::DepthLoad => (
            "DepthOverlayLayout",
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Depth,
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            None,
        ),
    };

    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: texture,
        count: None,
    }];
    if let Some(sampler) = sampler {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(sampler),
            count: None,
        });
    }

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

/// Lazily built pipelines for every (program, blend, target format)
/// combination actually drawn.
pub(crate) struct PipelineCache {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    shaders: HashMap<Program, wgpu::ShaderModule>,
    layouts: HashMap<Program, wgpu::PipelineLayout>,
    texture_layouts: HashMap<TextureSlot, wgpu::BindGroupLayout>,
    pub(crate) shadow_sampler: wgpu::Sampler,
    pub(crate) environment_sampler: wgpu::Sampler,
}

impl PipelineCache {
    pub(crate) fn new(device: &wgpu::Device, uniform_layout: &wgpu::BindGroupLayout) -> Self {
        let texture_layouts: HashMap<TextureSlot, wgpu::BindGroupLayout> = [
            TextureSlot::ShadowCompare,
            TextureSlot::EnvironmentCube,
            TextureSlot::DepthLoad,
        ]
        .into_iter()
        .map(|slot| (slot, texture_layout(device, slot)))
        .collect();

        let programs = [
            Program::Lit,
            Program::ShadowLit,
            Program::Reflective,
            Program::DepthOnly,
            Program::Sky,
            Program::DepthOverlay,
        ];

        let mut layouts = HashMap::new();
        for program in programs {
            let mut groups = vec![uniform_layout];
            if let Some(layout) =
                TextureSlot::for_program(program).and_then(|slot| texture_layouts.get(&slot))
            {
                groups.push(layout);
            }
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{program:?}PipelineLayout")),
                bind_group_layouts: &groups,
                push_constant_ranges: &[],
            });
            layouts.insert(program, layout);
        }

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ShadowSampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let environment_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("EnvironmentSampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            pipelines: HashMap::new(),
            shaders: HashMap::new(),
            layouts,
            texture_layouts,
            shadow_sampler,
            environment_sampler,
        }
    }

    pub(crate) fn texture_layout(&self, slot: TextureSlot) -> Option<&wgpu::BindGroupLayout> {
        self.texture_layouts.get(&slot)
    }

    pub(crate) fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    pub(crate) fn ensure(&mut self, device: &wgpu::Device, key: PipelineKey) {
        if self.pipelines.contains_key(&key) {
            return;
        }

        let shader = self.shaders.entry(key.program).or_insert_with(|| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{:?}Shader", key.program)),
                source: wgpu::ShaderSource::Wgsl(shader_source(key.program).into()),
            })
        });
        let Some(layout) = self.layouts.get(&key.program) else {
            return;
        };

        log::debug!("Creating pipeline {:?}", key);
        let label = format!("{:?}Pipeline", key.program);
        let mut builder = PipelineBuilder::new(device, layout, shader)
            .with_label(&label)
            .with_vertex_buffer(Vertex::layout())
            .with_no_culling();

        if let Some(format) = key.color_format {
            let blend = if key.alpha_blend {
                wgpu::BlendState::ALPHA_BLENDING
            } else {
                wgpu::BlendState::REPLACE
            };
            builder = builder.with_color_target(format, Some(blend));
        }

        builder = match key.program {
            Program::Lit | Program::ShadowLit | Program::Reflective => {
                builder.with_depth_stencil(DEPTH_FORMAT, true, wgpu::CompareFunction::Less)
            }
            Program::DepthOnly => builder.depth_only().with_depth_stencil_biased(
                DEPTH_FORMAT,
                true,
                wgpu::CompareFunction::LessEqual,
                2,
                2.0,
            ),
            Program::Sky => {
                builder.with_depth_stencil(DEPTH_FORMAT, false, wgpu::CompareFunction::LessEqual)
            }
            Program::DepthOverlay => {
                builder.with_depth_stencil(DEPTH_FORMAT, false, wgpu::CompareFunction::Always)
            }
        };

        self.pipelines.insert(key, builder.build());
    }
}
