//! Wavefront OBJ/MTL export.
//!
//! [`ObjExporter`] writes a [`ModelDefinition`](modeldump_model::ModelDefinition)
//! as a geometry file and a material library, resolving face textures to
//! sprite paths through a [`TextureManager`](modeldump_model::TextureManager).

pub mod colour;
pub mod error;
mod obj;

pub use crate::obj::ObjExporter;
