use crate::error::{Error, Result};

/// Min/max lookups over float slices that reject undefined values
///
/// Grid and raster buffers are plain `f32`/`f64` slices. The float primitives
/// do not implement `Ord` due to `NaN`, so the usual iterator `min`/`max` are
/// unavailable. These fail on the first non-finite value instead of silently
/// skipping or propagating it.
///
/// ```rust
/// # use voltools_utils::{Error, SliceExt};
/// let values = [1.5_f64, -0.5, 2.0];
/// assert_eq!(values.try_min(), Ok(-0.5));
/// assert_eq!(values.try_max(), Ok(2.0));
/// assert_eq!(values.try_min_max(), Ok((-0.5, 2.0)));
///
/// assert_eq!([1.0_f32, f32::NAN].try_max(), Err(Error::NonFiniteValue(1)));
/// assert_eq!(Vec::<f64>::new().try_min(), Err(Error::EmptySlice));
/// ```
pub trait SliceExt<T> {
    /// Smallest value
    fn try_min(&self) -> Result<T>;

    /// Largest value
    fn try_max(&self) -> Result<T>;

    /// Smallest and largest value in a single pass
    fn try_min_max(&self) -> Result<(T, T)>;
}

macro_rules! impl_slice_ext {
    ($t:ty) => {
        impl SliceExt<$t> for [$t] {
            fn try_min(&self) -> Result<$t> {
                self.try_min_max().map(|(min, _)| min)
            }

            fn try_max(&self) -> Result<$t> {
                self.try_min_max().map(|(_, max)| max)
            }

            fn try_min_max(&self) -> Result<($t, $t)> {
                let first = *self.first().ok_or(Error::EmptySlice)?;
                self.iter()
                    .enumerate()
                    .try_fold((first, first), |(min, max), (i, &v)| {
                        if !v.is_finite() {
                            return Err(Error::NonFiniteValue(i));
                        }
                        Ok((min.min(v), max.max(v)))
                    })
            }
        }
    };
}

impl_slice_ext!(f64);
impl_slice_ext!(f32);
