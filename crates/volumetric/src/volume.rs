//! Module for volumetric data and the parsed file container

// crate modules
use crate::grid::{DataOrder, DataRange, Grid};
use crate::lattice::Lattice;
use crate::sample::trilinear;
use crate::structure::Structure;

// voltools modules
use voltools_utils::{f, ValueExt};

/// One scalar field on a regular 3D grid
///
/// Volumes are created once per parsed block and are not modified afterwards.
/// Every derived product (slices, isosurface meshes) is computed fresh from
/// them.
///
/// The `grid` and its `data_range` are deliberately private. The range is
/// computed together with the grid and the only way to swap the grid is
/// [with_grid()](VolumetricData::with_grid), which recomputes it.
///
/// ## Examples
///
/// ```rust
/// # use voltools_volumetric::{Grid, Lattice, VolumetricData};
/// let grid = Grid::from_fn([4, 4, 4], |ix, _, _| ix as f64);
/// let volume = VolumetricData::new(grid, Lattice::cubic(4.0))
///     .with_label("ramp")
///     .with_periodic(false);
///
/// assert_eq!(volume.grid_dims(), [4, 4, 4]);
/// assert_eq!(volume.data_range().max, 3.0);
///
/// // sample half way along a, non-periodic so the ends are the grid edges
/// assert_eq!(volume.value_at([0.5, 0.0, 0.0]), 1.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VolumetricData {
    grid: Grid,
    data_range: DataRange,
    /// Real-space cell spanned by the grid
    pub lattice: Lattice,
    /// Cartesian position of grid index (0, 0, 0) in Å
    pub origin: [f64; 3],
    /// Ordering of the flat stream this grid was read from
    pub data_order: DataOrder,
    /// Grid samples `[0, 1)` and wraps, rather than spanning `[0, 1]`
    pub periodic: bool,
    /// Human-readable identity, e.g. "charge density"
    pub label: String,
}

impl VolumetricData {
    /// Periodic volume with a zero origin and no label
    pub fn new(grid: Grid, lattice: Lattice) -> Self {
        let data_range = DataRange::from_values(grid.values().iter().copied());
        Self::from_assembled(grid, data_range, lattice)
    }

    /// Build from a grid whose range was already gathered during assembly
    pub(crate) fn from_assembled(grid: Grid, data_range: DataRange, lattice: Lattice) -> Self {
        Self {
            grid,
            data_range,
            lattice,
            origin: [0.0; 3],
            data_order: DataOrder::XFastest,
            periodic: true,
            label: String::new(),
        }
    }

    /// Replace the grid, recomputing the data range
    pub fn with_grid(mut self, grid: Grid) -> Self {
        self.data_range = DataRange::from_values(grid.values().iter().copied());
        self.grid = grid;
        self
    }

    /// Set the label
    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    /// Set the Cartesian origin
    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = origin;
        self
    }

    /// Set the periodicity
    pub fn with_periodic(mut self, periodic: bool) -> Self {
        self.periodic = periodic;
        self
    }

    /// Set the declared source ordering
    pub fn with_data_order(mut self, order: DataOrder) -> Self {
        self.data_order = order;
        self
    }

    /// The dense grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Grid shape `[nx, ny, nz]`
    pub fn grid_dims(&self) -> [usize; 3] {
        self.grid.dims()
    }

    /// Precomputed min/max/abs_max/mean
    pub fn data_range(&self) -> &DataRange {
        &self.data_range
    }

    /// Interpolated value at fractional coordinates
    ///
    /// Honours the `periodic` flag, see [trilinear()].
    pub fn value_at(&self, abc: [f64; 3]) -> f64 {
        trilinear(&self.grid, abc, self.periodic)
    }

    /// Values flattened back into the declared source ordering
    pub fn to_flat(&self) -> Vec<f64> {
        self.grid.to_flat(self.data_order)
    }
}

impl std::fmt::Display for VolumetricData {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let head = f!(" > {} [{:?}, periodic: {}]", self.label, self.data_order, self.periodic);
        let mut s = f!("{}\n{}\n{}\n", "-".repeat(40), head, "-".repeat(40));
        s += &f!("grid  : {}\n", self.grid);
        s += &f!(
            "origin: {} {} {}\n",
            self.origin[0].sci(4, 2),
            self.origin[1].sci(4, 2),
            self.origin[2].sci(4, 2)
        );
        s += &f!("range : {}\n", self.data_range);
        s += &f!("{}", self.lattice);
        write!(f, "{}", s)
    }
}

/// Everything recovered from a single file
///
/// One structure, followed by one or more volumes in file order. For
/// spin-polarised CHGCAR files this is the total density then the
/// magnetisation density.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VolumetricFileData {
    /// Atomic structure from the header
    pub structure: Structure,
    /// Parsed volumes, never empty for a successful read
    pub volumes: Vec<VolumetricData>,
}

impl VolumetricFileData {
    /// Find a volume by its label
    pub fn volume(&self, label: &str) -> Option<&VolumetricData> {
        self.volumes.iter().find(|v| v.label == label)
    }
}
