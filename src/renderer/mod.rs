pub mod device;
pub mod gpu;
pub mod headless;
mod internal;
pub mod passes;
pub mod pipeline_builder;
pub mod primitives;
pub mod technique;
pub mod uniforms;
pub mod vertex;

pub use device::{
    ClearFlags, CubeFace, DrawCall, Program, RenderDevice, RenderError, RenderTarget,
    TargetDescriptor, TargetHandle, TargetKind,
};
pub use gpu::GpuDevice;
pub use headless::{DeviceEvent, HeadlessDevice, RecordedDraw};
pub use pipeline_builder::PipelineBuilder;
pub use technique::{
    DepthOnly, DrawInput, EnvironmentSampling, PlainLit, ShadingTechnique, ShadowSampling,
};
pub use uniforms::{DrawUniform, FrameUniforms};
pub use vertex::Vertex;
