//! Division with an explicit policy for zero denominators
//!
//! Weekly sales ratios meet zero denominators routinely (a product that sold
//! nothing last week, a price that did not move). Each call site names the
//! policy it wants instead of repeating an inline check.

/// What to do when a denominator is exactly zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroGuard {
    /// Replace the zero denominator with 1, so the result is the numerator
    SubstituteOne,
    /// Divide anyway and let IEEE rules produce `inf`, `-inf` or `NaN`
    Propagate,
}

/// Divide `numerator` by `denominator` under the given zero policy.
///
/// ```
/// use sales_math::{guarded_divide, ZeroGuard};
///
/// assert_eq!(guarded_divide(5.0, 0.0, ZeroGuard::SubstituteOne), 5.0);
/// assert!(guarded_divide(5.0, 0.0, ZeroGuard::Propagate).is_infinite());
/// assert_eq!(guarded_divide(6.0, 3.0, ZeroGuard::SubstituteOne), 2.0);
/// ```
pub fn guarded_divide(numerator: f64, denominator: f64, guard: ZeroGuard) -> f64 {
    match guard {
        ZeroGuard::SubstituteOne if denominator == 0.0 => numerator,
        _ => numerator / denominator,
    }
}

/// Nullable form of [`guarded_divide`]: a missing operand gives a missing result.
pub fn guarded_ratio(
    numerator: Option<f64>,
    denominator: Option<f64>,
    guard: ZeroGuard,
) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) => Some(guarded_divide(n, d, guard)),
        _ => None,
    }
}
