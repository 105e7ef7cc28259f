//! Trilinear point sampling over a grid

// crate modules
use crate::grid::Grid;

// external crates
use itertools::iproduct;

/// Interpolate the grid at fractional coordinates `abc`
///
/// **Periodic** grids sample `[0, 1)` per axis. A coordinate maps to index
/// space as `c * n` and both neighbours wrap modulo `n`, so index `n - 1`
/// blends with index `0` and any integer shift of `abc` gives the same value.
///
/// **Non-periodic** grids span `[0, 1]` inclusive, mapping as `c * (n - 1)`.
/// Anything outside `[0, 1]` on any axis is exactly `0.0`, there is no
/// extrapolation.
///
/// Grids with a zero dimension and non-finite coordinates also give `0.0`.
///
/// ```rust
/// # use voltools_volumetric::{trilinear, Grid};
/// let grid = Grid::from_fn([2, 1, 1], |ix, _, _| [1.0, 3.0][ix]);
///
/// // half way between the two points
/// assert_eq!(trilinear(&grid, [0.25, 0.0, 0.0], true), 2.0);
/// // wraps back towards the first point
/// assert_eq!(trilinear(&grid, [0.75, 0.0, 0.0], true), 2.0);
/// assert_eq!(trilinear(&grid, [1.0, 0.0, 0.0], true), 1.0);
///
/// // isolated grids stop at the edges
/// assert_eq!(trilinear(&grid, [1.0, 0.0, 0.0], false), 3.0);
/// assert_eq!(trilinear(&grid, [1.1, 0.0, 0.0], false), 0.0);
/// ```
pub fn trilinear(grid: &Grid, abc: [f64; 3], periodic: bool) -> f64 {
    let dims = grid.dims();
    if dims.contains(&0) || abc.iter().any(|c| !c.is_finite()) {
        return 0.0;
    }

    if !periodic && abc.iter().any(|c| !(0.0..=1.0).contains(c)) {
        return 0.0;
    }

    let axis = |i: usize| -> Neighbours {
        if periodic {
            Neighbours::periodic(abc[i], dims[i])
        } else {
            Neighbours::clamped(abc[i], dims[i])
        }
    };
    let (x, y, z) = (axis(0), axis(1), axis(2));

    iproduct!(0..2, 0..2, 0..2)
        .map(|(dx, dy, dz)| {
            let weight = x.weight(dx) * y.weight(dy) * z.weight(dz);
            if weight == 0.0 {
                0.0
            } else {
                weight * grid.get(x.index(dx), y.index(dy), z.index(dz))
            }
        })
        .sum()
}

/// Lower/upper grid index along one axis and the blend factor between them
#[derive(Debug, Clone, Copy)]
struct Neighbours {
    lower: usize,
    upper: usize,
    t: f64,
}

impl Neighbours {
    fn periodic(coordinate: f64, n: usize) -> Self {
        let position = coordinate * n as f64;
        let floor = position.floor();
        let lower = (floor as i64).rem_euclid(n as i64) as usize;
        Self {
            lower,
            upper: (lower + 1) % n,
            t: position - floor,
        }
    }

    fn clamped(coordinate: f64, n: usize) -> Self {
        if n == 1 {
            return Self {
                lower: 0,
                upper: 0,
                t: 0.0,
            };
        }
        let position = coordinate * (n - 1) as f64;
        let lower = (position.floor() as usize).min(n - 2);
        Self {
            lower,
            upper: lower + 1,
            t: position - lower as f64,
        }
    }

    #[inline]
    fn index(&self, side: usize) -> usize {
        if side == 0 {
            self.lower
        } else {
            self.upper
        }
    }

    #[inline]
    fn weight(&self, side: usize) -> f64 {
        if side == 0 {
            1.0 - self.t
        } else {
            self.t
        }
    }
}
