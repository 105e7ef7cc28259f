//! Atomic structure recovered from the file headers

// crate modules
use crate::lattice::Lattice;

// voltools modules
use voltools_utils::{f, ValueExt};

/// A single atomic site
///
/// Both coordinate forms are kept so that downstream code never needs the
/// lattice inverse again.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// Element symbol, `X` for dummy or unknown species
    pub species: String,
    /// Fractional coordinates, wrapped into `[0, 1)` for periodic files
    pub abc: [f64; 3],
    /// Cartesian coordinates in Å, in the lattice frame
    pub xyz: [f64; 3],
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:<3}{:>12}{:>12}{:>12}",
            self.species,
            self.abc[0].sci(4, 2),
            self.abc[1].sci(4, 2),
            self.abc[2].sci(4, 2)
        )
    }
}

/// Sites and lattice parsed alongside the volumetric data
///
/// This is only populated by the readers and handed off as-is. Periodicity
/// is tracked per axis for consistency with common structure models, though
/// both supported formats set all three flags together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Structure {
    /// Real-space lattice
    pub lattice: Lattice,
    /// Every site in file order
    pub sites: Vec<Site>,
    /// Periodic boundary flags for a, b, c
    pub pbc: [bool; 3],
}

impl Structure {
    /// Number of sites
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// True if there are no sites at all
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Distinct species in order of first appearance
    ///
    /// ```rust
    /// # use voltools_volumetric::{Site, Structure};
    /// let site = |s: &str| Site { species: s.to_string(), abc: [0.0; 3], xyz: [0.0; 3] };
    /// let structure = Structure {
    ///     sites: vec![site("Fe"), site("O"), site("Fe")],
    ///     ..Default::default()
    /// };
    /// assert_eq!(structure.species(), vec!["Fe", "O"]);
    /// ```
    pub fn species(&self) -> Vec<&str> {
        self.sites.iter().fold(Vec::new(), |mut acc, site| {
            if !acc.contains(&site.species.as_str()) {
                acc.push(site.species.as_str());
            }
            acc
        })
    }
}

impl std::fmt::Display for Structure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = f!("{}", self.lattice);
        s += &f!("pbc : {:?}\n", self.pbc);
        s += &f!("sites ({}):\n", self.sites.len());
        for site in &self.sites {
            s += &f!("  {site}\n");
        }
        write!(f, "{}", s)
    }
}
