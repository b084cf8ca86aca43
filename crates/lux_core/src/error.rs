use thiserror::Error;

/// Errors that can occur while loading or building a texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to open texture {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture is {width}x{height} but {len} pixels were supplied")]
    SizeMismatch { width: u32, height: u32, len: usize },

    #[error("texture has zero size")]
    Empty,
}

/// Errors produced when mesh topology is inconsistent.
#[derive(Error, Debug, PartialEq)]
pub enum MeshError {
    #[error("index count {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("{attribute} has {len} entries, expected {vertex_count}")]
    AttributeLength {
        attribute: &'static str,
        len: usize,
        vertex_count: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;
pub type MeshResult<T> = Result<T, MeshError>;
