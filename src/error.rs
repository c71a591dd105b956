//! Structured error types for the escalator engine.
//!
//! Every public mutator validates its arguments before touching state, so an
//! `Err` always means nothing was changed.

/// All errors surfaced by the escalator API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EscalatorError {
    /// Invalid count, height, padding or other argument.
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    /// A row, column or spacer index outside the valid range.
    #[error("{what} index {index} is out of bounds (valid range: {min}..{max})")]
    IndexOutOfBounds {
        what: &'static str,
        index: i64,
        min: i64,
        max: i64,
    },

    /// A sub-part name that could not be parsed or resolved.
    #[error("Invalid sub-part: {0}")]
    SubPart(String),

    /// Rejected configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EscalatorError {
    /// Build an [`EscalatorError::IndexOutOfBounds`] from unsigned bounds.
    pub(crate) fn out_of_bounds(what: &'static str, index: usize, min: usize, max: usize) -> Self {
        Self::IndexOutOfBounds {
            what,
            index: to_i64(index),
            min: to_i64(min),
            max: to_i64(max),
        }
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EscalatorError>;

impl From<String> for EscalatorError {
    fn from(s: String) -> Self {
        Self::IllegalArgument(s)
    }
}

impl From<&str> for EscalatorError {
    fn from(s: &str) -> Self {
        Self::IllegalArgument(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<EscalatorError> for wasm_bindgen::JsValue {
    fn from(e: EscalatorError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = EscalatorError::out_of_bounds("Row", 12, 0, 10);
        assert_eq!(
            err.to_string(),
            "Row index 12 is out of bounds (valid range: 0..10)"
        );
    }

    #[test]
    fn test_string_conversion_is_argument_error() {
        let err: EscalatorError = "count must be positive".into();
        assert!(matches!(err, EscalatorError::IllegalArgument(_)));
    }
}
