use num_traits::{PrimInt, Signed, WrappingAdd};

/// Element type accepted by every reduction in this crate.
///
/// Covers the fixed-width signed primitives (`i8` through `i128`, `isize`).
/// Addition wraps on overflow.
pub trait Summand: PrimInt + Signed + WrappingAdd + Send + Sync + 'static {}

impl<T> Summand for T where T: PrimInt + Signed + WrappingAdd + Send + Sync + 'static {}

/// Plain sequential summation. Returns zero for an empty slice.
pub fn sum<T: Summand>(values: &[T]) -> T {
    values
        .iter()
        .fold(T::zero(), |total, value| total.wrapping_add(value))
}
