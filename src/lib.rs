//! `voltools` is a modular toolkit for volumetric data from electronic
//! structure and quantum chemistry codes
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use voltools_utils as utils;

#[cfg(feature = "volumetric")]
#[cfg_attr(docsrs, doc(cfg(feature = "volumetric")))]
#[doc(inline)]
pub use voltools_volumetric as volumetric;

#[cfg(feature = "isosurface")]
#[cfg_attr(docsrs, doc(cfg(feature = "isosurface")))]
#[doc(inline)]
pub use voltools_isosurface as isosurface;
