pub mod blend;
pub mod capture;
pub mod composer;
pub mod overlay;
pub mod shadow;
pub mod sky;

pub use blend::BlendScope;
pub use capture::{CaptureView, CubeCapture, EnvironmentCapture};
pub use composer::{FrameComposer, FrameInputs, FrameStep, Stage};
pub use overlay::DepthOverlay;
pub use shadow::ShadowPass;
pub use sky::SkyBackdrop;
