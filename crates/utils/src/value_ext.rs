use crate::f;

/// Extends primitives with more specific formatting options
pub trait ValueExt {
    /// Scientific formatting with a fixed precision and signed, padded exponent
    ///
    /// Rust's `{:e}` drops the exponent sign and padding, which makes columns
    /// of numbers ragged. Works for anything implementing `LowerExp`.
    ///
    /// Non-finite values have no exponent and are returned as formatted.
    ///
    /// ```rust
    /// # use voltools_utils::ValueExt;
    /// assert_eq!((-1.0).sci(5, 2), "-1.00000e+00");
    /// assert_eq!((0.0125).sci(3, 2), "1.250e-02");
    /// assert_eq!((6.02e23).sci(2, 3), "6.02e+023");
    /// assert_eq!(f64::NAN.sci(4, 2), "NaN");
    /// assert_eq!(f64::INFINITY.sci(4, 2), "inf");
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl<T: std::fmt::LowerExp> ValueExt for T {
    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let formatted = f!("{:.precision$e}", self);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                f!("{mantissa}e{sign}{digits:0>exp_pad$}")
            }
            None => formatted,
        }
    }
}
