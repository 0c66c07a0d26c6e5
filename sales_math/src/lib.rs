//! # Sales Math
//!
//! Numeric primitives behind the weekly demand features.
//! This crate provides the guarded division used for every ratio that can
//! meet a zero denominator, the week-over-week growth and elasticity
//! calculations, and the small statistics helpers shared by the models.

use thiserror::Error;

pub mod growth;
pub mod guarded;
pub mod stats;

pub use guarded::{guarded_divide, ZeroGuard};

/// Errors that can occur in sales calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for sales math operations
pub type Result<T> = std::result::Result<T, MathError>;
