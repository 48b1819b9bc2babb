use std::fmt::{Debug, Display};

use num_traits::{Float as NumFloat, FromPrimitive};

/// Marker trait for the scalar types the optimizers work over (`f32`, `f64`).
///
/// Bundles the numeric and utility traits needed throughout the crate.
/// The `'static` bound lets step-size strategies be boxed as trait objects.
pub trait Float: NumFloat + FromPrimitive + Default + Debug + Display + 'static {
    /// Convert an `f64` literal into `Self`.
    ///
    /// Used for tolerances and algorithm constants, which are always
    /// representable (possibly rounded) in every implementor.
    fn lit(value: f64) -> Self {
        Self::from_f64(value).unwrap_or_else(Self::nan)
    }
}

impl Float for f32 {}
impl Float for f64 {}
