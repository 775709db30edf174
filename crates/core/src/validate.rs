//! Range checks for the plain `f64` quantities that cross crate boundaries.

use crate::error::{DomainError, DomainResult};

/// `value` must be finite and `>= 0` (quantities, stock levels, costs).
pub fn non_negative(field: &str, value: f64) -> DomainResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DomainError::validation(format!(
            "{field} must be a finite non-negative number, got {value}"
        )))
    }
}

/// `value` must lie strictly inside (0, 1) (service levels, confidence levels).
pub fn open_unit_interval(field: &str, value: f64) -> DomainResult<f64> {
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(DomainError::validation(format!("{field} must be in (0, 1), got {value}")))
    }
}
