//! Real-space lattice and coordinate conversions

// crate modules
use crate::error::{Error, Result};

// voltools modules
use voltools_utils::{f, ValueExt};

// external crates
use nalgebra::{Matrix3, Vector3};

/// Smallest cell volume used as a divisor, in Å^3
pub(crate) const MIN_CELL_VOLUME: f64 = 1e-10;

/// Real-space basis vectors of a cell
///
/// Rows of the matrix are the lattice vectors **a**, **b**, **c** in Å.
///
/// Cartesian positions are `x = fa*a + fb*b + fc*c`, i.e. the fractional row
/// vector multiplied by this matrix. Going the other way needs the inverse,
/// which fails for degenerate (zero or coplanar) cells. Isolated molecules
/// often come with exactly such a cell, so the callers decide how to recover.
///
/// ```rust
/// # use voltools_volumetric::Lattice;
/// let lattice = Lattice::cubic(2.0);
/// assert_eq!(lattice.frac_to_cart([0.5, 0.5, 0.5]), [1.0, 1.0, 1.0]);
/// assert_eq!(lattice.volume(), 8.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    matrix: Matrix3<f64>,
}

impl Lattice {
    /// Build a lattice from the three basis vectors
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self {
            matrix: Matrix3::from_row_slice(&[
                rows[0][0], rows[0][1], rows[0][2], //
                rows[1][0], rows[1][1], rows[1][2], //
                rows[2][0], rows[2][1], rows[2][2],
            ]),
        }
    }

    /// Build a lattice from caller-provided rows of any shape
    ///
    /// Anything other than three rows of three values is rejected, since a
    /// malformed matrix here is a bug at the call site rather than bad data.
    ///
    /// ```rust
    /// # use voltools_volumetric::Lattice;
    /// let rows = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]];
    /// assert!(Lattice::try_from_rows(&rows).is_err());
    /// ```
    pub fn try_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let columns = rows.iter().map(|r| r.as_ref().len()).collect::<Vec<usize>>();
        if rows.len() != 3 || columns.iter().any(|&n| n != 3) {
            return Err(Error::InvalidLatticeShape {
                rows: rows.len(),
                columns,
            });
        }

        let r = |i: usize| -> [f64; 3] {
            let row = rows[i].as_ref();
            [row[0], row[1], row[2]]
        };
        Ok(Self::from_rows([r(0), r(1), r(2)]))
    }

    /// Simple cubic cell with edge length `a`
    pub fn cubic(a: f64) -> Self {
        Self::from_rows([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    /// Row matrix of lattice vectors
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Lattice vectors as plain arrays, `[a, b, c]`
    pub fn rows(&self) -> [[f64; 3]; 3] {
        let m = &self.matrix;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    /// A single lattice vector as a column vector (0 = a, 1 = b, 2 = c)
    pub fn vector(&self, axis: usize) -> Vector3<f64> {
        self.matrix.row(axis).transpose()
    }

    /// Lengths of a, b, c
    pub fn lengths(&self) -> [f64; 3] {
        [
            self.vector(0).norm(),
            self.vector(1).norm(),
            self.vector(2).norm(),
        ]
    }

    /// Signed determinant of the row matrix
    pub fn determinant(&self) -> f64 {
        self.matrix.determinant()
    }

    /// Absolute cell volume
    pub fn volume(&self) -> f64 {
        self.determinant().abs()
    }

    /// Scale every lattice vector by a constant factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            matrix: self.matrix * factor,
        }
    }

    /// Matrix mapping Cartesian column vectors to fractional coordinates
    ///
    /// Returns `None` for a singular lattice. Compute once and reuse through
    /// [cart_to_frac_with()](Lattice::cart_to_frac_with) when converting many
    /// points.
    pub fn inverse(&self) -> Option<Matrix3<f64>> {
        self.matrix.transpose().try_inverse()
    }

    /// Convert fractional coordinates to Cartesian
    pub fn frac_to_cart(&self, abc: [f64; 3]) -> [f64; 3] {
        let xyz = self.matrix.transpose() * Vector3::from(abc);
        [xyz.x, xyz.y, xyz.z]
    }

    /// Convert Cartesian coordinates to fractional
    pub fn cart_to_frac(&self, xyz: [f64; 3]) -> Result<[f64; 3]> {
        let inverse = self.inverse().ok_or(Error::SingularLattice)?;
        Ok(Self::cart_to_frac_with(&inverse, xyz))
    }

    /// Convert Cartesian coordinates to fractional with a precomputed inverse
    pub fn cart_to_frac_with(inverse: &Matrix3<f64>, xyz: [f64; 3]) -> [f64; 3] {
        let abc = inverse * Vector3::from(xyz);
        [abc.x, abc.y, abc.z]
    }

    /// Reciprocal lattice vectors b1, b2, b3 (without the 2π factor)
    ///
    /// `b1 = (a2 × a3) / V` and cyclic, with `V` the signed triple product so
    /// that `ai · bj = δij` holds for left-handed cells too.
    pub fn reciprocal(&self) -> Result<[Vector3<f64>; 3]> {
        let (a1, a2, a3) = (self.vector(0), self.vector(1), self.vector(2));
        let v = a1.dot(&a2.cross(&a3));
        if v.abs() < MIN_CELL_VOLUME {
            return Err(Error::SingularLattice);
        }
        Ok([a2.cross(&a3) / v, a3.cross(&a1) / v, a1.cross(&a2) / v])
    }
}

impl Default for Lattice {
    fn default() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }
}

impl std::fmt::Display for Lattice {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut s = String::new();
        for (tag, row) in ["a", "b", "c"].iter().zip(self.rows()) {
            s += &f!(
                "{tag} : {:>12} {:>12} {:>12}\n",
                row[0].sci(4, 2),
                row[1].sci(4, 2),
                row[2].sci(4, 2)
            );
        }
        write!(f, "{}", s)
    }
}

/// Wrap a fractional coordinate into `[0, 1)`
///
/// `rem_euclid` can land exactly on 1.0 for tiny negative inputs due to
/// rounding, which is folded back to 0.
pub(crate) fn wrap_unit(value: f64) -> f64 {
    let wrapped = value.rem_euclid(1.0);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}
