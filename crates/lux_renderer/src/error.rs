use lux_core::{MeshError, TextureError};
use thiserror::Error;

/// Errors surfaced by scene assembly and rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("scene has no primitives")]
    EmptyScene,

    #[error("invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("render cancelled")]
    Cancelled,

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to parse render configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;
