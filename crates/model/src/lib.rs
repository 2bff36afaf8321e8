//! Model definitions and the textures they reference.
//!
//! [`load`] decodes a model archive into a [`ModelDefinition`]. Lighting
//! normals and texture UVs are derived on demand with
//! [`ModelDefinition::compute_normals`] and
//! [`ModelDefinition::compute_texture_uv_coordinates`].
//!
//! [`TextureManager`] resolves the texture ids faces refer to.

mod definition;
pub mod error;
mod loader;
mod normals;
mod texture;
mod textures;

pub use crate::definition::{FaceNormal, FaceUv, ModelDefinition, Triangle, Vertex, VertexNormal};
pub use crate::loader::load;
pub use crate::texture::TextureDefinition;
pub use crate::textures::TextureManager;
