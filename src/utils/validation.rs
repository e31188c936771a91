// Validation utilities
// Author: Gabriel Demetrios Lafis

use std::fmt::Display;

/// Validate that a value is within an inclusive range
pub fn validate_range<T: PartialOrd + Display>(
    value: T,
    min: T,
    max: T,
    name: &str,
) -> Result<(), String> {
    if value < min || value > max {
        Err(format!(
            "'{}' must be between {} and {}, got {}",
            name, min, max, value
        ))
    } else {
        Ok(())
    }
}

/// Validate that a number is neither NaN nor infinite
pub fn validate_finite(value: f64, name: &str) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("'{}' must be a finite number", name))
    }
}

/// Validate that a count is positive
pub fn validate_positive(value: usize, name: &str) -> Result<(), String> {
    if value == 0 {
        Err(format!("'{}' must be positive", name))
    } else {
        Ok(())
    }
}

/// Validate that a string is not blank
pub fn validate_not_empty(value: &str, name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("'{}' cannot be empty", name))
    } else {
        Ok(())
    }
}
