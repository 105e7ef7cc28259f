//! VASP CHGCAR family reader

// crate modules
use crate::element::fallback_symbol;
use crate::error::{Error, Result};
use crate::grid::{assemble_grid, DataOrder};
use crate::lattice::{wrap_unit, Lattice, MIN_CELL_VOLUME};
use crate::reader::cursor::Cursor;
use crate::reader::detect::{base_name, strip_compression_suffix};
use crate::reader::{parsers, VolumetricReader};
use crate::structure::{Site, Structure};
use crate::volume::{VolumetricData, VolumetricFileData};

// voltools modules
use voltools_utils::StringExt;

// external crates
use log::{debug, warn};
use nalgebra::Matrix3;

/// Anything shorter cannot hold a header and one data block
const MIN_LINES: usize = 10;

/// Total and magnetisation blocks, anything after is ignored
const MAX_VOLUMES: usize = 2;

/// The quantity held in the data blocks of a VASP style file
///
/// This changes how the blocks are labelled and whether the values are
/// divided by the cell volume. It is inferred from the file name.
///
/// ```rust
/// # use voltools_volumetric::reader::PeriodicKind;
/// assert_eq!(PeriodicKind::from_filename("ELFCAR"), PeriodicKind::Elf);
/// assert_eq!(PeriodicKind::from_filename("run/LOCPOT.gz"), PeriodicKind::Potential);
/// assert_eq!(PeriodicKind::from_filename("AECCAR0"), PeriodicKind::Density);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodicKind {
    /// Charge densities stored as `ρ·V` (CHGCAR, CHG, AECCAR*, PARCHG)
    #[default]
    Density,
    /// Electron localisation function (ELFCAR)
    Elf,
    /// Local potential in eV (LOCPOT)
    Potential,
}

impl PeriodicKind {
    /// Infer the kind from a file name, defaulting to a charge density
    pub fn from_filename(name: &str) -> Self {
        let name = base_name(strip_compression_suffix(name)).to_uppercase();
        if name.contains("ELFCAR") {
            Self::Elf
        } else if name.contains("LOCPOT") {
            Self::Potential
        } else {
            Self::Density
        }
    }

    /// True if the raw values are scaled by the cell volume
    pub fn divides_by_volume(&self) -> bool {
        matches!(self, Self::Density)
    }

    /// Label for the data block at `index`
    pub fn label(&self, index: usize) -> &'static str {
        match (self, index) {
            (Self::Density, 0) => "charge density",
            (Self::Density, _) => "magnetization density",
            (Self::Elf, 0) => "electron localization function",
            (Self::Elf, _) => "electron localization function (spin down)",
            (Self::Potential, 0) => "local potential",
            (Self::Potential, _) => "local potential (spin down)",
        }
    }
}

/// POSCAR style header shared by the whole CHGCAR family
#[derive(Debug)]
struct PoscarHeader {
    lattice: Lattice,
    /// Multiplier applied to the raw lattice vectors
    scale: f64,
    species: Vec<String>,
    counts: Vec<usize>,
    n_atoms: usize,
}

impl PoscarHeader {
    /// Species symbol for every atom in file order
    fn atom_species(&self) -> impl Iterator<Item = &str> {
        self.species
            .iter()
            .zip(&self.counts)
            .flat_map(|(s, n)| std::iter::repeat(s.as_str()).take(*n))
    }
}

/// Parsing of VASP CHGCAR style content
impl VolumetricReader {
    /// Parse CHGCAR style content holding blocks of the given kind
    ///
    /// Fails for content that is too short, has an invalid scale factor, or
    /// ends before the structure is complete. At least one data block must
    /// be present. A data block that ends early is zero padded with a warning.
    pub fn parse_chgcar(&self, content: &str, kind: PeriodicKind) -> Result<VolumetricFileData> {
        let found = content.lines().take(MIN_LINES).count();
        if found < MIN_LINES {
            return Err(Error::TooFewLines {
                format: "CHGCAR",
                expected: MIN_LINES,
                found,
            });
        }

        let mut cursor = Cursor::new(content);
        let header = Self::read_poscar_header(&mut cursor)?;
        let sites = Self::read_sites(&mut cursor, &header)?;
        let volumes = self.read_chgcar_volumes(&mut cursor, &header.lattice, kind)?;

        Ok(VolumetricFileData {
            structure: Structure {
                lattice: header.lattice,
                sites,
                pbc: [true; 3],
            },
            volumes,
        })
    }

    /// Comment, scale, lattice, species, and counts
    fn read_poscar_header(cursor: &mut Cursor) -> Result<PoscarHeader> {
        let comment = cursor.next_line().ok_or(Error::Truncated { section: "comment" })?;
        debug!("CHGCAR comment: \"{}\"", comment.trim());

        let line = cursor.next_line().ok_or(Error::Truncated { section: "scale factor" })?;
        let scale = parsers::parse_line(line, parsers::leading_f64)
            .ok()
            .filter(|s| s.is_finite() && *s != 0.0)
            .ok_or_else(|| Error::InvalidScaleFactor(line.trim().to_string()))?;

        let mut rows = [[0.0; 3]; 3];
        for row in rows.iter_mut() {
            let line = cursor.next_line().ok_or(Error::Truncated { section: "lattice" })?;
            *row = parsers::parse_line(line, parsers::vector3)?;
        }
        let (lattice, scale) = Self::scale_lattice(Lattice::from_rows(rows), scale);

        let line = cursor.next_line().ok_or(Error::Truncated { section: "atom counts" })?;
        let (symbols, line) = if parsers::is_symbol_line(line) {
            let symbols = line.split_whitespace().map(clean_symbol).collect();
            let counts = cursor.next_line().ok_or(Error::Truncated { section: "atom counts" })?;
            (Some(symbols), counts)
        } else {
            (None, line)
        };
        let counts = parsers::parse_line(line, parsers::usize_list)?;
        let n_atoms = counts
            .iter()
            .try_fold(0_usize, |total, &n| total.checked_add(n))
            .ok_or_else(|| Error::InvalidAtomCounts(counts.clone()))?;

        let species = match symbols {
            Some(symbols) => Self::match_species(symbols, counts.len()),
            None => {
                warn!("No species symbols in header, using placeholder elements");
                (0..counts.len()).map(|i| fallback_symbol(i).to_string()).collect()
            }
        };

        Ok(PoscarHeader {
            lattice,
            scale,
            species,
            counts,
            n_atoms,
        })
    }

    /// Apply the universal scale factor, returning the multiplier used
    ///
    /// A negative factor is the target cell volume rather than a multiplier.
    fn scale_lattice(lattice: Lattice, scale: f64) -> (Lattice, f64) {
        if scale > 0.0 {
            return (lattice.scaled(scale), scale);
        }

        let raw_volume = lattice.volume();
        if raw_volume < MIN_CELL_VOLUME {
            warn!("Cannot scale a degenerate lattice to a volume of {}", -scale);
            return (lattice, 1.0);
        }
        let factor = (-scale / raw_volume).cbrt();
        (lattice.scaled(factor), factor)
    }

    /// Pad or trim the symbol list to one entry per count
    fn match_species(mut symbols: Vec<String>, n_counts: usize) -> Vec<String> {
        if symbols.len() != n_counts {
            warn!(
                "Found {} species symbols for {} atom counts",
                symbols.len(),
                n_counts
            );
        }
        symbols.truncate(n_counts);
        for i in symbols.len()..n_counts {
            symbols.push(fallback_symbol(i).to_string());
        }
        symbols
    }

    /// Coordinate mode and one position per atom
    fn read_sites(cursor: &mut Cursor, header: &PoscarHeader) -> Result<Vec<Site>> {
        let mut line = cursor.next_line().ok_or(Error::Truncated { section: "coordinate mode" })?;
        if parsers::is_selective_dynamics(line) {
            line = cursor.next_line().ok_or(Error::Truncated { section: "coordinate mode" })?;
        }
        let cartesian = parsers::is_cartesian(line);

        let inverse = match (cartesian, header.lattice.inverse()) {
            (false, _) => Matrix3::identity(),
            (true, Some(inverse)) => inverse,
            (true, None) => {
                warn!("Singular lattice, cartesian positions used as fractional");
                Matrix3::identity()
            }
        };

        // every position line takes more than two bytes
        let mut positions = Vec::with_capacity(header.n_atoms.min(cursor.remaining() / 2));
        for _ in 0..header.n_atoms {
            let line = cursor.next_line().ok_or(Error::Truncated {
                section: "atom coordinates",
            })?;
            positions.push(parsers::parse_line(line, parsers::vector3)?);
        }

        let sites = header
            .atom_species()
            .zip(positions)
            .map(|(species, position)| {
                let abc = match cartesian {
                    // cartesian positions share the lattice scale factor
                    true => {
                        let position = position.map(|x| x * header.scale);
                        Lattice::cart_to_frac_with(&inverse, position)
                    }
                    false => position,
                }
                .map(wrap_unit);

                Site {
                    species: species.to_string(),
                    abc,
                    xyz: header.lattice.frac_to_cart(abc),
                }
            })
            .collect();

        Ok(sites)
    }

    /// Every data block up to the limit
    fn read_chgcar_volumes(
        &self,
        cursor: &mut Cursor,
        lattice: &Lattice,
        kind: PeriodicKind,
    ) -> Result<Vec<VolumetricData>> {
        let divisor = kind
            .divides_by_volume()
            .then(|| lattice.volume().max(MIN_CELL_VOLUME));

        let mut volumes = Vec::with_capacity(MAX_VOLUMES);
        while volumes.len() < MAX_VOLUMES {
            let Some(dims) = Self::next_grid_dimensions(cursor) else {
                break;
            };

            let n_expected = Self::grid_points(dims, cursor)?;
            if n_expected == 0 {
                warn!("Skipping data block with zero dimensions {dims:?}");
                continue;
            }

            let values = self.read_values(cursor, n_expected)?;
            if values.is_empty() {
                warn!("No values found for data block {}", volumes.len() + 1);
                break;
            }

            let (grid, data_range) = assemble_grid(&values, dims, divisor, DataOrder::XFastest);
            let volume = VolumetricData::from_assembled(grid, data_range, *lattice)
                .with_label(kind.label(volumes.len()))
                .with_data_order(DataOrder::XFastest)
                .with_periodic(true);
            volumes.push(volume);
        }

        if volumes.is_empty() {
            return Err(Error::NoVolumes);
        }

        if volumes.len() == MAX_VOLUMES && !cursor.is_finished() {
            debug!("Stopped after {MAX_VOLUMES} data blocks, any further blocks ignored");
        }

        Ok(volumes)
    }

    /// Skip ahead to the next grid dimensions line
    fn next_grid_dimensions(cursor: &mut Cursor) -> Option<[usize; 3]> {
        while let Some(line) = cursor.next_line() {
            if let Ok((_, dims)) = parsers::grid_dimensions(line) {
                return Some(dims);
            }
        }
        None
    }
}

/// Element symbol from a header token
///
/// POTCAR style labels are trimmed to the element, e.g. `Fe_pv` and
/// `O/a1b2c3` become `Fe` and `O`.
fn clean_symbol(token: &str) -> String {
    let symbol: String = token
        .split(['_', '/'])
        .next()
        .unwrap_or(token)
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();

    if symbol.is_empty() {
        "X".to_string()
    } else {
        symbol.capitalise()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols() {
        assert_eq!(clean_symbol("Fe_pv"), "Fe");
        assert_eq!(clean_symbol("O/a1b2c3"), "O");
        assert_eq!(clean_symbol("FE"), "Fe");
        assert_eq!(clean_symbol("Si1"), "Si");
        assert_eq!(clean_symbol("_x"), "X");
    }

    #[test]
    fn labels() {
        assert_eq!(PeriodicKind::Density.label(0), "charge density");
        assert_eq!(PeriodicKind::Density.label(1), "magnetization density");
        assert!(!PeriodicKind::Elf.divides_by_volume());
        assert!(!PeriodicKind::Potential.divides_by_volume());
        assert_eq!(PeriodicKind::from_filename("/a/b/CHGCAR.bz2"), PeriodicKind::Density);
    }

    #[test]
    fn volume_scaling() {
        // -64 requests a cell volume of 64 from a unit cube
        let (lattice, factor) = VolumetricReader::scale_lattice(Lattice::cubic(1.0), -64.0);
        assert!((lattice.volume() - 64.0).abs() < 1e-9);
        assert!((factor - 4.0).abs() < 1e-12);

        let (lattice, factor) = VolumetricReader::scale_lattice(Lattice::cubic(2.0), 1.5);
        assert!((lattice.lengths()[0] - 3.0).abs() < 1e-12);
        assert_eq!(factor, 1.5);

        // degenerate cells are left alone
        let flat = Lattice::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]);
        let (_, factor) = VolumetricReader::scale_lattice(flat, -8.0);
        assert_eq!(factor, 1.0);
    }

    #[test]
    fn overflowing_atom_counts() {
        let content = format!(
            "comment\n1.0\n1 0 0\n0 1 0\n0 0 1\nNa Cl\n{} 2\nDirect\n0 0 0\n\n1 1 1\n1.0\n",
            usize::MAX
        );
        let mut cursor = Cursor::new(&content);
        let result = VolumetricReader::read_poscar_header(&mut cursor);
        assert!(matches!(result, Err(Error::InvalidAtomCounts(c)) if c == vec![usize::MAX, 2]));
    }

    #[test]
    fn species_padding() {
        let species = VolumetricReader::match_species(vec!["Fe".to_string()], 3);
        assert_eq!(species, vec!["Fe", "He", "Li"]);

        let species =
            VolumetricReader::match_species(vec!["Fe".to_string(), "O".to_string()], 1);
        assert_eq!(species, vec!["Fe"]);
    }
}
