//! Result and Error types for voltools-volumetric

/// Type alias for Result<T, volumetric::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `voltools-volumetric` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("parser failed: {0}")]
    ParseError(String),

    #[error("too few lines for a {format} file (expected at least {expected}, found {found})")]
    TooFewLines {
        format: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("scale factor is not a number: \"{0}\"")]
    InvalidScaleFactor(String),

    #[error("file ended before the {section} section")]
    Truncated { section: &'static str },

    #[error("no volumetric data blocks could be read")]
    NoVolumes,

    #[error("no grid values could be read")]
    NoGridValues,

    #[error("grid dimensions {0:?} are too large for the content")]
    InvalidGridDimensions([usize; 3]),

    #[error("atom counts {0:?} do not add up to a usable total")]
    InvalidAtomCounts(Vec<usize>),

    #[error("unexpected number of values on {line} line (expected {expected}, found {found})")]
    WrongTokenCount {
        line: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("could not identify the format of \"{0}\"")]
    UnknownFormat(String),

    #[error("compressed input \"{0}\" must be decompressed before reading")]
    CompressedInput(String),

    #[error("lattice must be 3x3 (found {rows} rows with lengths {columns:?})")]
    InvalidLatticeShape { rows: usize, columns: Vec<usize> },

    #[error("lattice matrix is singular and has no inverse")]
    SingularLattice,

    #[error("miller indices (0, 0, 0) do not define a plane")]
    ZeroMillerIndices,

    #[error("slice distance {0} is outside of [0, 1]")]
    InvalidDistance(f64),

    #[error("slice resolution must be at least 1")]
    InvalidResolution,

    #[error("failed to initialise progress bar: {0}")]
    ProgressBar(String),
}

impl From<nom::Err<nom::error::Error<&str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Self {
        Self::ParseError(format!("{err:?}"))
    }
}
