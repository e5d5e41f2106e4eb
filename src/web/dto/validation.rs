//! Validation helpers for form DTOs.

use validator::{Validate, ValidationError, ValidationErrors};

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_empty_trimmed").with_message("Must not be empty".into()));
    }
    Ok(())
}

/// Names of the fields that failed validation, sorted.
pub fn failed_fields(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    fields.sort();
    fields
}

/// Validate `value`, returning the names of failed fields on error.
pub fn check<T: Validate>(value: &T) -> Result<(), Vec<String>> {
    value.validate().map_err(|e| failed_fields(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_trimmed_valid() {
        assert!(not_empty_trimmed("Hello").is_ok());
        assert!(not_empty_trimmed("  Hello  ").is_ok());
    }

    #[test]
    fn test_not_empty_trimmed_invalid() {
        assert!(not_empty_trimmed("").is_err());
        assert!(not_empty_trimmed("   ").is_err());
        assert!(not_empty_trimmed("\t\n").is_err());
    }
}
