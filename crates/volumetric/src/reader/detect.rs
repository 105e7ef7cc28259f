//! Format detection from file names and content

// crate modules
use crate::reader::parsers;

/// Compression suffixes that must be handled upstream
const COMPRESSION_SUFFIXES: [&str; 4] = [".gz", ".bz2", ".xz", ".zst"];

/// Lines checked for a grid dimensions line after the atom positions
const DIMENSIONS_WINDOW: usize = 8;

/// Largest atom count skipped over when detecting from content
const MAX_DETECT_ATOMS: usize = 100_000;

/// Supported volumetric file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// VASP CHGCAR, CHG, AECCAR*, PARCHG, ELFCAR, LOCPOT
    Chgcar,
    /// Gaussian cube
    Cube,
}

/// Remove a single trailing compression suffix, if any
///
/// ```rust
/// # use voltools_volumetric::reader::strip_compression_suffix;
/// assert_eq!(strip_compression_suffix("CHGCAR.gz"), "CHGCAR");
/// assert_eq!(strip_compression_suffix("density.cube.zst"), "density.cube");
/// assert_eq!(strip_compression_suffix("LOCPOT"), "LOCPOT");
/// ```
pub fn strip_compression_suffix(name: &str) -> &str {
    COMPRESSION_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix_ignore_case(name, suffix))
        .unwrap_or(name)
}

/// Identify the format from a file name and/or the content
///
/// Names are checked first after removing any compression suffix. Failing
/// that, the first lines of the content are inspected.
///
/// - Cube: numeric header lines with four tokens (five allowed on the first)
/// - CHGCAR: a single number for the scale factor and a grid dimensions line
///   shortly after the atom positions
///
/// Only a bounded number of lines is inspected, independent of file size.
///
/// ```rust
/// # use voltools_volumetric::reader::{detect_format, FileFormat};
/// assert_eq!(detect_format("", Some("run/PARCHG.0012")), Some(FileFormat::Chgcar));
/// assert_eq!(detect_format("", Some("homo.CUBE.gz")), Some(FileFormat::Cube));
/// assert_eq!(detect_format("hello", Some("notes.txt")), None);
/// ```
pub fn detect_format(content: &str, filename: Option<&str>) -> Option<FileFormat> {
    filename
        .and_then(format_from_filename)
        .or_else(|| format_from_content(content))
}

/// The part of a path after the last separator
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(suffix.len())?;
    let tail = name.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &name[..split])
}

fn format_from_filename(filename: &str) -> Option<FileFormat> {
    let name = base_name(strip_compression_suffix(filename)).to_uppercase();

    if name.ends_with(".CUBE") || name.ends_with(".CUB") {
        Some(FileFormat::Cube)
    } else if ["CHGCAR", "AECCAR", "ELFCAR", "LOCPOT", "PARCHG"]
        .iter()
        .any(|tag| name.contains(tag))
        || name.starts_with("CHG")
        || name.ends_with(".VASP")
    {
        Some(FileFormat::Chgcar)
    } else {
        None
    }
}

fn format_from_content(content: &str) -> Option<FileFormat> {
    if looks_like_cube(content) {
        Some(FileFormat::Cube)
    } else if looks_like_chgcar(content) {
        Some(FileFormat::Chgcar)
    } else {
        None
    }
}

/// Two title lines then numeric header and voxel lines
fn looks_like_cube(content: &str) -> bool {
    let lines: Vec<&str> = content.lines().skip(2).take(4).collect();
    if lines.len() < 4 {
        return false;
    }

    let header = parsers::numeric_token_count(lines[0]);
    matches!(header, 4 | 5)
        && lines[0].split_whitespace().count() == header
        && lines[1..]
            .iter()
            .all(|l| l.split_whitespace().count() == 4 && parsers::numeric_token_count(l) == 4)
}

/// Scale factor, lattice, counts, and then a grid dimensions line
fn looks_like_chgcar(content: &str) -> bool {
    let mut lines = content.lines();

    // comment, scale, then three lattice vectors
    let scale = lines.nth(1).map(parsers::numeric_token_count);
    if scale != Some(1) {
        return false;
    }
    if !lines.by_ref().take(3).all(|l| parsers::vector3(l).is_ok()) {
        return false;
    }

    let Some(mut line) = lines.next() else {
        return false;
    };
    if parsers::is_symbol_line(line) {
        match lines.next() {
            Some(l) => line = l,
            None => return false,
        }
    }
    let Ok((_, counts)) = parsers::usize_list(line) else {
        return false;
    };

    // coordinate mode, possibly after selective dynamics
    match lines.next() {
        Some(l) if parsers::is_selective_dynamics(l) => {
            lines.next();
        }
        Some(_) => (),
        None => return false,
    }

    let n_atoms = counts.iter().try_fold(0_usize, |total, &n| total.checked_add(n));
    let Some(n_atoms) = n_atoms.filter(|&n| n <= MAX_DETECT_ATOMS) else {
        return false;
    };
    lines
        .skip(n_atoms)
        .take(DIMENSIONS_WINDOW)
        .any(parsers::is_grid_dimensions)
}
