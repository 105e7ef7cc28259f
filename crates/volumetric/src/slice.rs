//! Arbitrary plane cross-sections through the unit cell
//!
//! Planes are given by Miller indices `(h, k, l)` and a fractional distance
//! along the plane normal. The normal is `h·b1 + k·b2 + l·b3` over the
//! reciprocal lattice vectors.
//!
//! The raster is laid out on two orthonormal in-plane axes `u` and `v`, and
//! is sized to the extents of the unit cell projected onto those axes. Every
//! raster cell samples the volume at its centre, so the cell boundaries are
//! always covered regardless of the plane orientation. For periodic volumes
//! the corners of the raster that fall outside the cell show periodic
//! images, while molecular volumes are zero there.

// crate modules
use crate::error::{Error, Result};
use crate::lattice::Lattice;
use crate::volume::VolumetricData;

// voltools modules
use voltools_utils::{f, SliceExt};

// external crates
use itertools::iproduct;
use nalgebra::Vector3;
use rayon::prelude::*;
use serde::Serialize;

/// 2D raster sampled from a volume
///
/// Data are row-major, `width` values per row, with `min` and `max` of the
/// sampled values for colour mapping. These are both zero for an empty
/// raster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceResult {
    /// Row-major values, `width * height` in total
    pub data: Vec<f64>,
    /// Number of raster cells along `u`
    pub width: usize,
    /// Number of raster cells along `v`
    pub height: usize,
    /// Smallest sampled value
    pub min: f64,
    /// Largest sampled value
    pub max: f64,
}

impl SliceResult {
    /// Value at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Values mapped linearly onto `[0, 1]` over `min..max`
    ///
    /// A flat raster maps to all zeros.
    ///
    /// ```rust
    /// # use voltools_volumetric::SliceResult;
    /// let slice = SliceResult { data: vec![1.0, 2.0, 3.0, 5.0], width: 2, height: 2, min: 1.0, max: 5.0 };
    /// assert_eq!(slice.normalized(), vec![0.0, 0.25, 0.5, 1.0]);
    /// ```
    pub fn normalized(&self) -> Vec<f64> {
        let span = self.max - self.min;
        if span <= 0.0 || !span.is_finite() {
            return vec![0.0; self.data.len()];
        }
        self.data.iter().map(|v| (v - self.min) / span).collect()
    }
}

impl std::fmt::Display for SliceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            f!(
                "{} x {} slice, range {:.5e} to {:.5e}",
                self.width,
                self.height,
                self.min,
                self.max
            )
        )
    }
}

/// Sample a plane through the volume with the default resolution
///
/// The raster is `max(nx, ny, nz)` cells on each side. See
/// [slice_hkl_with_resolution()] for details and errors.
///
/// ```rust
/// # use voltools_volumetric::{slice_hkl, Grid, Lattice, VolumetricData};
/// let grid = Grid::from_fn([4, 4, 4], |_, _, iz| iz as f64);
/// let volume = VolumetricData::new(grid, Lattice::cubic(4.0));
///
/// // (001) planes are perpendicular to c, so constant over the raster
/// let slice = slice_hkl(&volume, [0, 0, 1], 0.5).unwrap();
/// assert_eq!((slice.width, slice.height), (4, 4));
/// assert!(slice.data.iter().all(|v| (v - slice.data[0]).abs() < 1e-9));
///
/// // no plane for (000)
/// assert!(slice_hkl(&volume, [0, 0, 0], 0.5).is_err());
/// ```
pub fn slice_hkl(volume: &VolumetricData, hkl: [i32; 3], distance: f64) -> Result<SliceResult> {
    let resolution = volume.grid_dims().into_iter().max().unwrap_or(0);
    slice_hkl_with_resolution(volume, hkl, distance, resolution)
}

/// Sample a plane through the volume on a `resolution x resolution` raster
///
/// `distance` is the fraction in `[0, 1]` of the way through the cell along
/// the plane normal, measured between the extreme cell corners.
///
/// Fails for `(0, 0, 0)`, a distance outside of `[0, 1]`, a zero resolution,
/// or a singular lattice.
pub fn slice_hkl_with_resolution(
    volume: &VolumetricData,
    hkl: [i32; 3],
    distance: f64,
    resolution: usize,
) -> Result<SliceResult> {
    if hkl == [0, 0, 0] {
        return Err(Error::ZeroMillerIndices);
    }
    if !distance.is_finite() || !(0.0..=1.0).contains(&distance) {
        return Err(Error::InvalidDistance(distance));
    }
    if resolution == 0 {
        return Err(Error::InvalidResolution);
    }

    let plane = Plane::new(&volume.lattice, hkl)?;
    let inverse = volume.lattice.inverse().ok_or(Error::SingularLattice)?;

    // empty grids are still sliced, the sampler makes these all zero
    let width = resolution;
    let height = resolution;
    let mut data = vec![0.0; width * height];

    let offset = plane.normal_offset(distance);
    data.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let t = (y as f64 + 0.5) / height as f64;
            for (x, value) in row.iter_mut().enumerate() {
                let s = (x as f64 + 0.5) / width as f64;
                let xyz = plane.point(offset, s, t);
                let abc = Lattice::cart_to_frac_with(&inverse, [xyz.x, xyz.y, xyz.z]);
                *value = volume.value_at(abc);
            }
        });

    let (min, max) = data.try_min_max().unwrap_or((0.0, 0.0));
    Ok(SliceResult {
        data,
        width,
        height,
        min,
        max,
    })
}

/// Plane orientation and the unit cell extents in plane coordinates
#[derive(Debug)]
struct Plane {
    normal: Vector3<f64>,
    u: Vector3<f64>,
    v: Vector3<f64>,
    /// (min, max) projections of the cell corners on normal, u, v
    extents: [(f64, f64); 3],
}

impl Plane {
    fn new(lattice: &Lattice, hkl: [i32; 3]) -> Result<Self> {
        let [b1, b2, b3] = lattice.reciprocal()?;
        let normal = b1 * hkl[0] as f64 + b2 * hkl[1] as f64 + b3 * hkl[2] as f64;
        let normal = normal.try_normalize(f64::EPSILON).ok_or(Error::ZeroMillerIndices)?;

        // any axis not parallel to the normal gives a valid in-plane basis
        let helper = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = normal.cross(&helper).normalize();
        let v = normal.cross(&u);

        let mut extents = [(f64::INFINITY, f64::NEG_INFINITY); 3];
        for (i, j, k) in iproduct!(0..2, 0..2, 0..2) {
            let corner = Vector3::from(lattice.frac_to_cart([i as f64, j as f64, k as f64]));
            for (extent, axis) in extents.iter_mut().zip([&normal, &u, &v]) {
                let projection = corner.dot(axis);
                extent.0 = extent.0.min(projection);
                extent.1 = extent.1.max(projection);
            }
        }

        Ok(Self {
            normal,
            u,
            v,
            extents,
        })
    }

    /// Offset along the normal for a fractional distance through the cell
    fn normal_offset(&self, distance: f64) -> f64 {
        let (lo, hi) = self.extents[0];
        lo + distance * (hi - lo)
    }

    /// Cartesian point at fractional raster position `(s, t)`
    fn point(&self, offset: f64, s: f64, t: f64) -> Vector3<f64> {
        let (u_lo, u_hi) = self.extents[1];
        let (v_lo, v_hi) = self.extents[2];
        self.normal * offset
            + self.u * (u_lo + s * (u_hi - u_lo))
            + self.v * (v_lo + t * (v_hi - v_lo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn ramp_volume(axis: usize) -> VolumetricData {
        let grid = Grid::from_fn([6, 6, 6], |ix, iy, iz| [ix, iy, iz][axis] as f64);
        VolumetricData::new(grid, Lattice::cubic(3.0)).with_periodic(false)
    }

    #[test]
    fn plane_basis_is_orthonormal() {
        let lattice = Lattice::from_rows([[3.0, 0.0, 0.0], [1.5, 2.6, 0.0], [0.0, 0.0, 5.0]]);
        for hkl in [[1, 0, 0], [0, 1, 0], [0, 0, 1], [1, 1, 1], [2, -1, 3]] {
            let plane = Plane::new(&lattice, hkl).unwrap();
            assert!((plane.normal.norm() - 1.0).abs() < 1e-12);
            assert!((plane.u.norm() - 1.0).abs() < 1e-12);
            assert!((plane.v.norm() - 1.0).abs() < 1e-12);
            assert!(plane.normal.dot(&plane.u).abs() < 1e-12);
            assert!(plane.normal.dot(&plane.v).abs() < 1e-12);
            assert!(plane.u.dot(&plane.v).abs() < 1e-12);
        }
    }

    #[test]
    fn normal_is_perpendicular_to_plane() {
        // (110) in a cubic cell points along x + y
        let plane = Plane::new(&Lattice::cubic(2.0), [1, 1, 0]).unwrap();
        let expected = Vector3::new(1.0, 1.0, 0.0).normalize();
        assert!((plane.normal - expected).norm() < 1e-12);
    }

    #[test]
    fn slice_distance_moves_along_normal() {
        // (001) planes through a z ramp are flat, increasing with distance
        let volume = ramp_volume(2);
        let low = slice_hkl(&volume, [0, 0, 1], 0.0).unwrap();
        let high = slice_hkl(&volume, [0, 0, 1], 1.0).unwrap();
        assert!((low.max - 0.0).abs() < 1e-9);
        assert!((high.min - 5.0).abs() < 1e-9);
        assert_eq!(low.min, low.max);
    }

    #[test]
    fn slice_in_plane_variation() {
        // (001) plane through an x ramp varies across the raster width
        let volume = ramp_volume(0);
        let slice = slice_hkl_with_resolution(&volume, [0, 0, 1], 0.5, 12).unwrap();
        assert_eq!(slice.data.len(), 144);
        assert!(slice.max > slice.min);
        assert!(slice.min >= 0.0 && slice.max <= 5.0);
        assert_eq!(slice.get(12, 0), None);
        assert!(slice.get(11, 11).is_some());
    }

    #[test]
    fn invalid_requests() {
        let volume = ramp_volume(0);
        assert!(matches!(
            slice_hkl(&volume, [0, 0, 0], 0.5),
            Err(Error::ZeroMillerIndices)
        ));
        assert!(matches!(
            slice_hkl(&volume, [1, 0, 0], 1.5),
            Err(Error::InvalidDistance(_))
        ));
        assert!(matches!(
            slice_hkl(&volume, [1, 0, 0], f64::NAN),
            Err(Error::InvalidDistance(_))
        ));
        assert!(matches!(
            slice_hkl_with_resolution(&volume, [1, 0, 0], 0.5, 0),
            Err(Error::InvalidResolution)
        ));
    }

    #[test]
    fn singular_lattice() {
        let grid = Grid::zeros([2, 2, 2]);
        let lattice = Lattice::from_rows([[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        let volume = VolumetricData::new(grid, lattice);
        assert!(matches!(
            slice_hkl(&volume, [1, 0, 0], 0.5),
            Err(Error::SingularLattice)
        ));
    }
}
