pub mod buffers;
pub mod context;
pub mod pipeline;
pub mod targets;

pub(crate) use buffers::{DrawUniformBuffer, GpuMesh};
pub(crate) use context::RenderContext;
pub(crate) use pipeline::{PipelineCache, PipelineKey, TextureSlot};
pub(crate) use targets::{GpuTarget, CAPTURE_FORMAT};
