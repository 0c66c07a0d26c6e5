//! Growth, change and elasticity calculations
//!
//! All functions here are total: zero denominators are handled by the
//! [`ZeroGuard`] each formula documents, never by returning an error.

use crate::guarded::{guarded_divide, guarded_ratio, ZeroGuard};

/// Relative markup of the selling price over the buying price.
///
/// A zero buying price is not guarded; the result is non-finite.
pub fn discount_rate(price_bought: f64, price_sold: f64) -> f64 {
    guarded_divide(price_sold - price_bought, price_bought, ZeroGuard::Propagate)
}

/// Fractional change from `previous` to `current`.
///
/// A zero `previous` is replaced by 1, so the change degrades to the
/// absolute difference.
pub fn pct_change(current: f64, previous: f64) -> f64 {
    guarded_divide(current - previous, previous, ZeroGuard::SubstituteOne)
}

/// Compounded per-period growth of `current` relative to `base` over `periods`.
///
/// Returns `None` when `periods` is zero: growth over no elapsed period is
/// undefined. The exponent still goes through the zero guard so the formula
/// matches the one used for every other period count.
pub fn compound_growth(current: f64, base: f64, periods: u32) -> Option<f64> {
    if periods == 0 {
        return None;
    }
    let exponent = guarded_divide(1.0, f64::from(periods), ZeroGuard::SubstituteOne);
    Some((current / base).powf(exponent) - 1.0)
}

/// Price elasticity from the two fractional changes.
///
/// A zero price change is replaced by 1, so the elasticity degrades to the
/// quantity change. Without both changes there is no elasticity.
pub fn elasticity(pct_qty: Option<f64>, pct_price: Option<f64>) -> Option<f64> {
    guarded_ratio(pct_qty, pct_price, ZeroGuard::SubstituteOne)
}
