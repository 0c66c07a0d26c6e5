//! Descriptive statistics and rounding helpers

use crate::{MathError, Result};

/// Arithmetic mean of a slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty series".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Round to the nearest integer, ties to the even neighbour.
///
/// This is the rounding used for every predicted quantity, so 2.5 becomes 2
/// and 3.5 becomes 4.
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Round a prediction to a whole unit count
pub fn round_to_units(value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(MathError::InvalidInput(format!(
            "Cannot round non-finite value {} to units",
            value
        )));
    }

    let rounded = round_half_even(value);
    // i64::MAX is not representable; its nearest f64 is 2^63, one past the end
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(MathError::InvalidInput(format!(
            "{} is outside the range of a unit count",
            value
        )));
    }

    Ok(rounded as i64)
}
