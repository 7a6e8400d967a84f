//! Error types for grid construction and the data model.

use thiserror::Error;

/// Errors raised while configuring, building or assembling grid data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// A generation parameter is out of range.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An array does not have the length its declared counts imply.
    #[error("Shape mismatch in {what}: expected {expected} entries, found {found}")]
    ShapeMismatch {
        /// Which array.
        what: &'static str,
        /// Length implied by the counts.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// A structural invariant of the data model does not hold.
    #[error("Invariant violated: {0}")]
    InvariantViolated(String),
}

impl GridError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        GridError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_error_display() {
        let err = GridError::invalid("n_gridpoints", "must be at least 2");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'n_gridpoints': must be at least 2"
        );

        let err = GridError::ShapeMismatch {
            what: "index table",
            expected: 8,
            found: 6,
        };
        assert!(err.to_string().contains("index table"));
    }
}
