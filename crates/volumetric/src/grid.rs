//! Dense 3D grid storage and assembly from flat value streams

// voltools modules
use voltools_utils::{f, ValueExt};

// external crates
use log::warn;
use serde::Serialize;

/// Which axis varies fastest in a flattened value stream
///
/// The two supported file families disagree:
///
/// | Variant        | Flat index `n`                  | Used by        |
/// | -------------- | ------------------------------- | -------------- |
/// | `XFastest`     | `ix + iy*nx + iz*nx*ny`         | CHGCAR family  |
/// | `ZFastest`     | `iz + iy*nz + ix*ny*nz`         | cube files     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataOrder {
    /// Fortran-style ordering, x changes fastest
    XFastest,
    /// C-style ordering, z changes fastest
    ZFastest,
}

impl DataOrder {
    /// Grid indices `(ix, iy, iz)` of flat position `n`
    #[inline]
    pub fn unflatten(&self, n: usize, dims: [usize; 3]) -> [usize; 3] {
        let [nx, ny, nz] = dims;
        match self {
            Self::XFastest => [n % nx, (n / nx) % ny, n / (nx * ny)],
            Self::ZFastest => [n / (ny * nz), (n / nz) % ny, n % nz],
        }
    }

    /// Flat position of grid indices `(ix, iy, iz)`
    #[inline]
    pub fn flatten(&self, index: [usize; 3], dims: [usize; 3]) -> usize {
        let [ix, iy, iz] = index;
        let [nx, ny, nz] = dims;
        match self {
            Self::XFastest => ix + iy * nx + iz * nx * ny,
            Self::ZFastest => iz + iy * nz + ix * ny * nz,
        }
    }
}

/// Summary statistics of a grid
///
/// Only values actually present in the source are counted. Cells filled with
/// zero because a file was truncated are excluded from `mean`, `min` and
/// `max`.
///
/// `abs_max` is `max(|min|, |max|)` and is the natural ceiling for an
/// isovalue slider.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DataRange {
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Largest magnitude
    pub abs_max: f64,
    /// Arithmetic mean of present values
    pub mean: f64,
}

impl DataRange {
    /// Statistics over an arbitrary set of values
    ///
    /// An empty set gives the neutral all-zero range.
    ///
    /// ```rust
    /// # use voltools_volumetric::DataRange;
    /// let range = DataRange::from_values([-4.0, 1.0, 3.0]);
    /// assert_eq!(range.min, -4.0);
    /// assert_eq!(range.max, 3.0);
    /// assert_eq!(range.abs_max, 4.0);
    /// assert_eq!(range.mean, 0.0);
    ///
    /// assert_eq!(DataRange::from_values(Vec::new()), DataRange::default());
    /// ```
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut accumulator = RangeAccumulator::default();
        values.into_iter().for_each(|v| accumulator.push(v));
        accumulator.finish()
    }
}

impl std::fmt::Display for DataRange {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "min {} | max {} | abs max {} | mean {}",
            self.min.sci(4, 2),
            self.max.sci(4, 2),
            self.abs_max.sci(4, 2),
            self.mean.sci(4, 2)
        )
    }
}

/// Running min/max/sum so statistics come out of the assembly pass
#[derive(Debug, Default)]
struct RangeAccumulator {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl RangeAccumulator {
    #[inline]
    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.count += 1;
    }

    fn finish(self) -> DataRange {
        if self.count == 0 {
            return DataRange::default();
        }
        DataRange {
            min: self.min,
            max: self.max,
            abs_max: self.min.abs().max(self.max.abs()),
            mean: self.sum / self.count as f64,
        }
    }
}

/// Dense scalar values on a regular `nx * ny * nz` grid
///
/// Storage is a single allocation indexed as `[ix][iy][iz]`, so `iz` is the
/// contiguous axis. The shape is fixed at construction and always matches
/// the number of stored values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    dims: [usize; 3],
    values: Vec<f64>,
}

impl Grid {
    /// Zero-filled grid of the given shape
    ///
    /// # Panics
    ///
    /// If the number of points overflows `usize`. The file readers reject
    /// such shapes before a grid is built.
    pub fn zeros(dims: [usize; 3]) -> Self {
        Self {
            dims,
            values: vec![0.0; point_count(dims)],
        }
    }

    /// Build a grid from a generator function of the indices
    ///
    /// Panics like [Grid::zeros()] for shapes that overflow.
    ///
    /// ```rust
    /// # use voltools_volumetric::Grid;
    /// let grid = Grid::from_fn([2, 3, 4], |ix, iy, iz| (ix * 100 + iy * 10 + iz) as f64);
    /// assert_eq!(grid.get(1, 2, 3), 123.0);
    /// ```
    pub fn from_fn<F: Fn(usize, usize, usize) -> f64>(dims: [usize; 3], f: F) -> Self {
        let [nx, ny, nz] = dims;
        let mut values = Vec::with_capacity(point_count(dims));
        for ix in 0..nx {
            for iy in 0..ny {
                for iz in 0..nz {
                    values.push(f(ix, iy, iz));
                }
            }
        }
        Self { dims, values }
    }

    /// Grid shape `[nx, ny, nz]`
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of grid points
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if any dimension is zero
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in `[ix][iy][iz]` order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at grid indices, which must be in range
    #[inline]
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        self.values[self.offset(ix, iy, iz)]
    }

    /// Value at grid indices, `None` when out of range
    pub fn try_get(&self, ix: usize, iy: usize, iz: usize) -> Option<f64> {
        let [nx, ny, nz] = self.dims;
        (ix < nx && iy < ny && iz < nz).then(|| self.get(ix, iy, iz))
    }

    #[inline]
    fn offset(&self, ix: usize, iy: usize, iz: usize) -> usize {
        (ix * self.dims[1] + iy) * self.dims[2] + iz
    }

    /// Flatten back into a 1D stream with the requested ordering
    ///
    /// This is the inverse of [assemble_grid()] for complete inputs.
    ///
    /// ```rust
    /// # use voltools_volumetric::{assemble_grid, DataOrder};
    /// let flat: Vec<f64> = (0..24).map(|v| v as f64).collect();
    /// let (grid, _) = assemble_grid(&flat, [2, 3, 4], None, DataOrder::XFastest);
    /// assert_eq!(grid.to_flat(DataOrder::XFastest), flat);
    /// ```
    pub fn to_flat(&self, order: DataOrder) -> Vec<f64> {
        let mut flat = vec![0.0; self.values.len()];
        for (n, value) in flat.iter_mut().enumerate() {
            let [ix, iy, iz] = order.unflatten(n, self.dims);
            *value = self.get(ix, iy, iz);
        }
        flat
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let [nx, ny, nz] = self.dims;
        write!(f, "{}", f!("{nx} x {ny} x {nz} ({} points)", self.len()))
    }
}

/// Number of points in a grid, panicking on overflow
fn point_count(dims: [usize; 3]) -> usize {
    dims.iter()
        .try_fold(1_usize, |n, &d| n.checked_mul(d))
        .unwrap_or_else(|| panic!("grid dimensions {dims:?} overflow usize"))
}

/// Assemble a dense grid from a flat stream of values
///
/// Values are placed according to `order` and divided by `divisor` when one
/// is given. Statistics are gathered in the same pass.
///
/// A buffer shorter than `nx * ny * nz` leaves the remaining cells at zero
/// and the statistics cover only the values that were present. Extra values
/// beyond the grid size are ignored.
///
/// The grid is allocated in full, see [Grid::zeros()] for the panics.
///
/// ```rust
/// # use voltools_volumetric::{assemble_grid, DataOrder};
/// let values = [2.0, 4.0, 6.0];
/// let (grid, range) = assemble_grid(&values, [2, 2, 1], Some(2.0), DataOrder::XFastest);
///
/// assert_eq!(grid.get(1, 0, 0), 2.0);
/// assert_eq!(grid.get(1, 1, 0), 0.0); // missing value
/// assert_eq!(range.mean, 2.0);        // mean of 1, 2, 3 only
/// ```
pub fn assemble_grid(
    values: &[f64],
    dims: [usize; 3],
    divisor: Option<f64>,
    order: DataOrder,
) -> (Grid, DataRange) {
    let mut grid = Grid::zeros(dims);
    let n_expected = grid.len();
    let scale = divisor.map(|d| 1.0 / d).unwrap_or(1.0);

    if values.len() < n_expected {
        warn!(
            "Only {} of {} grid values present, missing values set to zero",
            values.len(),
            n_expected
        );
    }

    let mut accumulator = RangeAccumulator::default();
    for (n, raw) in values.iter().take(n_expected).enumerate() {
        let [ix, iy, iz] = order.unflatten(n, dims);
        let value = raw * scale;
        let offset = grid.offset(ix, iy, iz);
        grid.values[offset] = value;
        accumulator.push(value);
    }

    (grid, accumulator.finish())
}
