//! Lux Core - scene inputs for the path tracer.
//!
//! This crate provides the collaborator types the renderer consumes:
//!
//! - **Textures**: solid or image-backed RGBA lookups by `uv`
//! - **Meshes**: indexed triangle lists with optional normals and uvs

pub mod error;
pub mod mesh;
pub mod texture;

pub use error::{MeshError, TextureError};
pub use mesh::Mesh;
pub use texture::Texture;
