//! Gaussian cube reader

// crate modules
use crate::element::symbol_from_atomic_number;
use crate::error::{Error, Result};
use crate::grid::{assemble_grid, DataOrder};
use crate::lattice::Lattice;
use crate::reader::cursor::Cursor;
use crate::reader::{parsers, VolumetricReader};
use crate::structure::{Site, Structure};
use crate::volume::{VolumetricData, VolumetricFileData};

// external crates
use log::{debug, warn};
use nalgebra::{Matrix3, Vector3};

/// Bohr radius in Å
pub(crate) const BOHR_TO_ANGSTROM: f64 = 0.529177249;

/// Two titles, the header, and three voxel axes
const MIN_HEADER_LINES: usize = 6;

/// Origins closer to zero than this (Å) are taken as periodic grids
const ORIGIN_TOLERANCE: f64 = 1e-4;

/// Everything in the cube header needed to place the grid, in Å
#[derive(Debug)]
struct CubeHeader {
    title: String,
    n_atoms: i64,
    origin: [f64; 3],
    values_per_point: usize,
    dims: [usize; 3],
    lattice: Lattice,
    /// Conversion from file units to Å
    unit: f64,
}

/// Parsing of Gaussian cube content
impl VolumetricReader {
    /// Parse Gaussian cube content
    ///
    /// The lattice, origin, and atom positions are converted to Å. Atom
    /// positions are stored relative to the grid origin.
    ///
    /// Fails for fewer than six header lines, header lines with the wrong
    /// number of values, or no grid values at all. Malformed atom lines are
    /// skipped with a warning.
    pub fn parse_cube(&self, content: &str) -> Result<VolumetricFileData> {
        let found = content.lines().take(MIN_HEADER_LINES).count();
        if found < MIN_HEADER_LINES {
            return Err(Error::TooFewLines {
                format: "cube",
                expected: MIN_HEADER_LINES,
                found,
            });
        }

        let mut cursor = Cursor::new(content);
        let header = Self::read_cube_header(&mut cursor)?;
        let sites = Self::read_cube_atoms(&mut cursor, &header)?;

        // orbital files list the orbitals after the atoms
        let orbitals = match header.n_atoms < 0 {
            true => Self::read_orbital_line(&mut cursor)?,
            false => Vec::new(),
        };
        let stride = match orbitals.first() {
            Some(&m) => usize::try_from(m).unwrap_or(1).max(1),
            None => header.values_per_point,
        };

        let n_values = Self::grid_points(header.dims, &cursor)?
            .checked_mul(stride)
            .ok_or(Error::InvalidGridDimensions(header.dims))?;
        let values = self.read_values(&mut cursor, n_values)?;
        if values.is_empty() {
            return Err(Error::NoGridValues);
        }

        let values = match stride {
            1 => values,
            _ => {
                warn!("Found {stride} values per grid point, only the first is kept");
                values.into_iter().step_by(stride).collect()
            }
        };

        let periodic = self.periodic.unwrap_or_else(|| {
            Vector3::from(header.origin).norm() < ORIGIN_TOLERANCE
        });
        debug!("Cube grid treated as periodic: {periodic}");

        let label = match (orbitals.get(1), header.title.is_empty()) {
            (Some(orbital), _) => format!("molecular orbital {orbital}"),
            (None, false) => header.title.clone(),
            (None, true) => "cube data".to_string(),
        };

        let (grid, data_range) = assemble_grid(&values, header.dims, None, DataOrder::ZFastest);
        let volume = VolumetricData::from_assembled(grid, data_range, header.lattice)
            .with_label(label)
            .with_origin(header.origin)
            .with_data_order(DataOrder::ZFastest)
            .with_periodic(periodic);

        Ok(VolumetricFileData {
            structure: Structure {
                lattice: header.lattice,
                sites,
                pbc: [periodic; 3],
            },
            volumes: vec![volume],
        })
    }

    /// Titles, atom count, origin, and the voxel axes
    fn read_cube_header(cursor: &mut Cursor) -> Result<CubeHeader> {
        let title = cursor.next_line().unwrap_or_default().trim().to_string();
        let subtitle = cursor.next_line().unwrap_or_default();
        debug!("Cube titles: \"{title}\", \"{}\"", subtitle.trim());

        let line = cursor.next_line().ok_or(Error::Truncated { section: "header" })?;
        let found = line.split_whitespace().count();
        if !matches!(found, 4 | 5) {
            return Err(Error::WrongTokenCount {
                line: "header",
                expected: 4,
                found,
            });
        }
        let (n_atoms, origin, n_values) = parsers::parse_line(line, parsers::cube_header)?;

        let mut counts = [0_i64; 3];
        let mut steps = [[0.0; 3]; 3];
        for (count, step) in counts.iter_mut().zip(steps.iter_mut()) {
            let line = cursor.next_line().ok_or(Error::Truncated { section: "voxel axes" })?;
            let found = line.split_whitespace().count();
            if found != 4 {
                return Err(Error::WrongTokenCount {
                    line: "voxel axis",
                    expected: 4,
                    found,
                });
            }
            (*count, *step) = parsers::parse_line(line, parsers::cube_axis)?;
        }

        // negative counts are Bohr, anything else is Å
        let unit = match counts[0] < 0 {
            true => BOHR_TO_ANGSTROM,
            false => 1.0,
        };

        let dims = counts.map(|n| n.unsigned_abs() as usize);
        let mut rows = [[0.0; 3]; 3];
        for (row, (step, n)) in rows.iter_mut().zip(steps.iter().zip(dims)) {
            *row = step.map(|s| s * n as f64 * unit);
        }

        Ok(CubeHeader {
            title,
            n_atoms,
            origin: origin.map(|o| o * unit),
            values_per_point: n_values.and_then(|n| usize::try_from(n).ok()).unwrap_or(1).max(1),
            dims,
            lattice: Lattice::from_rows(rows),
            unit,
        })
    }

    /// One site per atom line, relative to the grid origin
    fn read_cube_atoms(cursor: &mut Cursor, header: &CubeHeader) -> Result<Vec<Site>> {
        let inverse = header.lattice.inverse().unwrap_or_else(|| {
            warn!("Singular cube lattice, fractional positions will be wrong");
            Matrix3::identity()
        });

        let n_atoms = header.n_atoms.unsigned_abs() as usize;
        let mut sites = Vec::with_capacity(n_atoms.min(cursor.remaining() / 2));
        for _ in 0..n_atoms {
            let line = cursor.next_line().ok_or(Error::Truncated { section: "atoms" })?;
            let (z, _charge, position) = match parsers::cube_atom(line) {
                Ok((_, atom)) => atom,
                Err(_) => {
                    warn!("Skipping malformed atom line \"{}\"", line.trim());
                    continue;
                }
            };

            let xyz = [0, 1, 2].map(|i| position[i] * header.unit - header.origin[i]);
            sites.push(Site {
                species: symbol_from_atomic_number(z).to_string(),
                abc: Lattice::cart_to_frac_with(&inverse, xyz),
                xyz,
            });
        }

        Ok(sites)
    }

    /// Number of orbitals followed by their indices
    fn read_orbital_line(cursor: &mut Cursor) -> Result<Vec<i64>> {
        let line = cursor.next_line().ok_or(Error::Truncated {
            section: "orbital list",
        })?;
        parsers::parse_line(line, parsers::i64_list)
    }
}
