use thiserror::Error;

use crate::asset::AssetError;
use crate::renderer::RenderError;

/// Failures while building the scene. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to load model {name:?}: {source}")]
    Model {
        name: String,
        #[source]
        source: AssetError,
    },
    #[error("model {0:?} has no mesh parts to draw")]
    EmptyModel(String),
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
