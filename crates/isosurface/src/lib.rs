//! Isosurface layers and mesh buffers for volumetric data
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod extract;
mod mesh;
mod settings;

#[doc(inline)]
pub use settings::{generate_layers, IsosurfaceLayer, IsosurfaceSettings};

#[doc(inline)]
pub use mesh::{build_mesh, MarchingCubesOutput, MeshBuffers};

#[doc(inline)]
pub use extract::{extract_layers, plan_passes, IsosurfaceExtractor, IsosurfacePass, LayerMesh, Lobe};

#[doc(inline)]
pub use error::{Error, Result};
