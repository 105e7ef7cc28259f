//! Result and Error types for voltools-isosurface

/// Type alias for Result<T, isosurface::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `voltools-isosurface` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to (de)serialise isosurface settings")]
    JsonError(#[from] serde_json::Error),

    #[error("isovalue must be finite, found {0}")]
    InvalidIsovalue(f64),

    #[error("opacity must be within [0, 1], found {0}")]
    InvalidOpacity(f32),
}
