//! Parsers and logic for reading volumetric data files
//!
//! All public functions are re-exported to the crate root for easy access.
//!
//! # Quickstart
//!
//! The simplest methods for reading volumetric data are the convenience
//! functions:
//!
//! ```rust, no_run
//! # use voltools_volumetric::{read_volumetric, detect_and_parse};
//! // Read a file from disk, detecting the format from the name and content
//! let data = read_volumetric("/path/to/CHGCAR").unwrap();
//! println!("{}", data.volumes[0]);
//!
//! // Content already in memory, e.g. from a decompression step upstream
//! let content = std::fs::read_to_string("/path/to/orbital.cube").unwrap();
//! if let Some(data) = detect_and_parse(&content, Some("orbital.cube")) {
//!     println!("{} volumes", data.volumes.len());
//! }
//! ```
//!
//! Under the hood these initialise the [VolumetricReader]. This is made public
//! for fine control over progress output, chunking, and cube periodicity.
//!
//! ```rust, no_run
//! # use voltools_volumetric::reader::VolumetricReader;
//! # use std::path::Path;
//! let mut reader = VolumetricReader::new();
//! reader.disable_progress();   // no progress bar on stderr
//! reader.set_periodic(false);  // treat cube files as molecular
//!
//! let data = reader.read(Path::new("/path/to/density.cube")).unwrap();
//! ```
//!
//! # Supported formats
//!
//! | Format       | Files                                      | Grid order  |
//! | ------------ | ------------------------------------------ | ----------- |
//! | VASP         | CHGCAR, CHG, AECCAR*, PARCHG, ELFCAR, LOCPOT | x fastest |
//! | Gaussian     | `.cube`, `.cub`                            | z fastest   |
//!
//! VASP density blocks are stored as `ρ·V` and are divided by the cell
//! volume on read. ELFCAR and LOCPOT blocks are not.
//!
//! Cube files are in Bohr when the first voxel count is negative and in Å
//! otherwise. Everything is converted to Å on read.
//!
//! # Implementation overview
//!
//! Headers are small and are walked line by line with the [nom] parsers in
//! [parsers]. The grid blocks hold almost all of the bytes, so these are
//! handed to [scan_f64()] which works directly on the byte buffer, in chunks
//! so that progress can be reported. The numeric scan stops by itself at
//! the next text section (e.g. `augmentation occupancies`).
//!
//! Compressed files are not handled here. Decompress upstream and use
//! [detect_and_parse()] on the text.

// Split into modules to make it a bit more manageable
mod chgcar;
mod cube;
mod cursor;
mod detect;
mod number;
pub mod parsers;

// inline the important public API
#[doc(inline)]
pub use chgcar::PeriodicKind;
#[doc(inline)]
pub use detect::{detect_format, strip_compression_suffix, FileFormat};
#[doc(inline)]
pub use number::scan_f64;

// crate modules
use crate::error::{Error, Result};
use crate::volume::VolumetricFileData;
use cursor::Cursor;

// standard library
use std::path::Path;

// external crates
use kdam::{Bar, BarBuilder, BarExt};
use log::{debug, error};

/// Default number of values scanned between progress updates
const CHUNK_SIZE: usize = 1 << 16;

/// Grids up to this size are zero padded no matter how short the content is
const PAD_LIMIT: usize = 1 << 20;

/// Read a volumetric data file, detecting the format automatically
///
/// Progress output is disabled. See [VolumetricReader] for more control.
///
/// Fails for compressed files (`.gz`, `.bz2`, `.xz`, `.zst`), which need to
/// be decompressed upstream, and for files of unknown format.
pub fn read_volumetric<P: AsRef<Path>>(path: P) -> Result<VolumetricFileData> {
    let mut reader = VolumetricReader::new();
    reader.disable_progress();
    reader.read(path.as_ref())
}

/// Detect the format of some text content and parse it
///
/// The optional `filename` is checked first, then the content itself. Any
/// failure is logged and `None` returned so that callers can try other
/// loaders.
///
/// ```rust
/// # use voltools_volumetric::detect_and_parse;
/// assert!(detect_and_parse("not a volumetric file", None).is_none());
/// ```
pub fn detect_and_parse(content: &str, filename: Option<&str>) -> Option<VolumetricFileData> {
    let mut reader = VolumetricReader::new();
    reader.disable_progress();
    match reader.parse(content, filename) {
        Ok(data) => Some(data),
        Err(e) => {
            error!("Unable to read volumetric data: {e}");
            None
        }
    }
}

/// Parse the content of a VASP CHGCAR style file
///
/// Blocks are labelled and scaled as a charge density. Use
/// [VolumetricReader::parse_chgcar()] with a [PeriodicKind] for ELFCAR and
/// LOCPOT content.
pub fn parse_chgcar(content: &str) -> Result<VolumetricFileData> {
    let mut reader = VolumetricReader::new();
    reader.disable_progress();
    reader.parse_chgcar(content, PeriodicKind::Density)
}

/// Parse the content of a Gaussian cube file
///
/// With `periodic` unset, grids with an origin at zero are treated as
/// periodic and anything else as molecular.
pub fn parse_cube(content: &str, periodic: Option<bool>) -> Result<VolumetricFileData> {
    let mut reader = VolumetricReader::new();
    reader.disable_progress();
    if let Some(periodic) = periodic {
        reader.set_periodic(periodic);
    }
    reader.parse_cube(content)
}

/// Reader for every supported volumetric data format
///
/// Options are set on the reader before parsing and apply to every file it
/// is used on.
///
/// Minimal Example:
/// ```rust, no_run
/// # use voltools_volumetric::reader::VolumetricReader;
/// # use std::path::Path;
/// let mut reader = VolumetricReader::new();
/// let data = reader.read(Path::new("path/to/CHGCAR")).unwrap();
/// ```
#[derive(Debug)]
pub struct VolumetricReader {
    /// Forced periodicity for cube files
    periodic: Option<bool>,
    /// Number of values scanned between progress updates
    chunk_size: usize,
    /// Disable progress bar?
    disable_progress: bool,
}

impl Default for VolumetricReader {
    fn default() -> Self {
        Self {
            periodic: None,
            chunk_size: CHUNK_SIZE,
            disable_progress: false,
        }
    }
}

// ! ------------------------------------------------------------------------
// !                                Public API
// ! ------------------------------------------------------------------------

/// High level methods
impl VolumetricReader {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Read and parse a file from disk
    pub fn read(&self, path: &Path) -> Result<VolumetricFileData> {
        let name = path.to_string_lossy();
        if strip_compression_suffix(&name).len() != name.len() {
            return Err(Error::CompressedInput(name.to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let filename = path.file_name().map(|n| n.to_string_lossy());
        self.parse(&content, filename.as_deref())
    }

    /// Detect the format of the content and parse it
    pub fn parse(&self, content: &str, filename: Option<&str>) -> Result<VolumetricFileData> {
        let format = detect_format(content, filename).ok_or_else(|| {
            Error::UnknownFormat(filename.unwrap_or("<unnamed content>").to_string())
        })?;
        debug!("Reading as {format:?}");

        match format {
            FileFormat::Chgcar => {
                let kind = filename.map(PeriodicKind::from_filename).unwrap_or_default();
                self.parse_chgcar(content, kind)
            }
            FileFormat::Cube => self.parse_cube(content),
        }
    }

    /// Force cube files to be treated as periodic, or not
    ///
    /// By default this is inferred from the grid origin.
    pub fn set_periodic(&mut self, periodic: bool) {
        self.periodic = Some(periodic);
    }

    /// Number of values to scan between progress updates
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size.max(1);
    }

    /// Do not print the tqdm progress indicators
    pub fn disable_progress(&mut self) {
        self.disable_progress = true;
    }
}

// ! ------------------------------------------------------------------------
// !                          Shared grid extraction
// ! ------------------------------------------------------------------------

impl VolumetricReader {
    /// Read up to `n` values from the cursor position
    ///
    /// Stops early at the end of the text or at the next text section, in
    /// which case fewer values are returned. The cursor is left at the point
    /// where scanning stopped.
    fn read_values(&self, cursor: &mut Cursor, n: usize) -> Result<Vec<f64>> {
        let mut progress_bar = self.init_progress_bar(n)?;
        if !self.disable_progress {
            progress_bar.refresh()?;
        }

        // a value needs at least two bytes, which bounds absurd headers
        let mut values = Vec::with_capacity(n.min(cursor.remaining() / 2 + 1));
        let mut buffer = vec![0.0; self.chunk_size.min(n).max(1)];

        while values.len() < n {
            let wanted = buffer.len().min(n - values.len());
            let (found, offset) =
                number::scan_f64(cursor.text(), cursor.offset(), &mut buffer[..wanted]);
            cursor.seek(offset);
            values.extend_from_slice(&buffer[..found]);
            progress_bar.update(found)?;

            if found < wanted {
                break;
            }
        }

        Ok(values)
    }

    /// Number of points in a grid of `dims` read from the cursor position
    ///
    /// Short blocks are zero padded, so the grid is allocated in full
    /// regardless of how many values follow. Sizes that overflow, or that are
    /// both beyond the padding limit and larger than the remaining content in
    /// bytes, cannot come from a real file and are rejected.
    fn grid_points(dims: [usize; 3], cursor: &Cursor) -> Result<usize> {
        let n = dims
            .iter()
            .try_fold(1_usize, |acc, &d| acc.checked_mul(d))
            .ok_or(Error::InvalidGridDimensions(dims))?;

        if n > PAD_LIMIT && n > cursor.remaining() {
            return Err(Error::InvalidGridDimensions(dims));
        }
        Ok(n)
    }

    /// Initialise the progress bar, if wanted
    fn init_progress_bar(&self, total: usize) -> Result<Bar> {
        BarBuilder::default()
            .total(total)
            .unit(" values")
            .unit_scale(true)
            .disable(self.disable_progress)
            .bar_format("{count} values [{rate} values/s]   ")
            .build()
            .map_err(Error::ProgressBar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_reader(chunk_size: usize) -> VolumetricReader {
        let mut reader = VolumetricReader::new();
        reader.disable_progress();
        reader.set_chunk_size(chunk_size);
        reader
    }

    #[test]
    fn chunked_values() {
        let text = "1 2 3\n4 5 6\n7 8\naugmentation occupancies 1 2\n 9 9";
        let mut cursor = Cursor::new(text);

        // chunk sizes should make no difference to the result
        for chunk_size in [1, 3, 100] {
            cursor.seek(0);
            let values = quiet_reader(chunk_size).read_values(&mut cursor, 8).unwrap();
            assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        }
    }

    #[test]
    fn short_values_stop_at_section() {
        let text = "1 2 3\naugmentation occupancies 1 2\n";
        let mut cursor = Cursor::new(text);
        let values = quiet_reader(2).read_values(&mut cursor, 8).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert!(text[cursor.offset()..].starts_with("augmentation"));
    }

    #[test]
    fn grid_sizes() {
        let cursor = Cursor::new("1 2 3");
        assert_eq!(VolumetricReader::grid_points([3, 4, 5], &cursor).unwrap(), 60);
        assert_eq!(VolumetricReader::grid_points([0, 4, 5], &cursor).unwrap(), 0);

        // small grids are always allowed, and padded later
        let n = VolumetricReader::grid_points([128, 128, 64], &cursor).unwrap();
        assert_eq!(n, PAD_LIMIT);

        for dims in [[usize::MAX, 2, 1], [4_000_000; 3], [1024, 1024, 2]] {
            assert!(matches!(
                VolumetricReader::grid_points(dims, &cursor),
                Err(Error::InvalidGridDimensions(d)) if d == dims
            ));
        }
    }

    #[test]
    fn compressed_paths_are_refused() {
        let result = read_volumetric("/some/path/CHGCAR.gz");
        assert!(matches!(result, Err(Error::CompressedInput(_))));
    }
}
