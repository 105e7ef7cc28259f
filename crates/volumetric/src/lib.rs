//! Volumetric data readers, sampling, and plane slicing
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod element;
mod error;
mod grid;
mod lattice;
mod sample;
mod slice;
mod structure;
mod volume;

pub mod reader;

// inline important the reader functions for a nice public API
#[doc(inline)]
pub use reader::{detect_and_parse, parse_chgcar, parse_cube, read_volumetric};

#[doc(inline)]
pub use reader::{detect_format, FileFormat, PeriodicKind};

#[doc(inline)]
pub use volume::{VolumetricData, VolumetricFileData};

#[doc(inline)]
pub use grid::{assemble_grid, DataOrder, DataRange, Grid};

#[doc(inline)]
pub use lattice::Lattice;

#[doc(inline)]
pub use structure::{Site, Structure};

#[doc(inline)]
pub use element::symbol_from_atomic_number;

#[doc(inline)]
pub use sample::trilinear;

#[doc(inline)]
pub use slice::{slice_hkl, slice_hkl_with_resolution, SliceResult};

#[doc(inline)]
pub use error::{Error, Result};
