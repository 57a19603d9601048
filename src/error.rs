//! Application error type shared by the CLI and the HTTP service.

use thiserror::Error;

use crate::model::ValidationError;

/// Application-level error type.
///
/// Everything that can end a run is funneled into this type and reported to
/// the operator as a single line.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not read {field} from '{input}': expected a number")]
    Parse { field: &'static str, input: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("input ended before {0} was entered")]
    MissingInput(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not serialize result: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("server error: {0}")]
    Server(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_field_and_input() {
        let err = AppError::Parse {
            field: "product length",
            input: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not read product length from 'abc': expected a number"
        );
    }

    #[test]
    fn validation_error_is_transparent() {
        let err: AppError =
            ValidationError::InvalidWeight("Weight must be positive, got: 0".into()).into();
        assert_eq!(
            err.to_string(),
            "Invalid weight: Weight must be positive, got: 0"
        );
    }
}
