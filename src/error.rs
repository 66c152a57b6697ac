//! Error types for the enhancement transform.
//!
//! Every failure surfaces synchronously as a `Result` from the call that
//! detected it. The transform never swallows an error or substitutes a
//! default output; on failure the caller still holds the original image.

use std::fmt;

/// Result type alias for enhancement operations
pub type EnhanceResult<T> = Result<T, EnhanceError>;

/// Error type for the enhancement transform
#[derive(Debug, Clone, PartialEq)]
pub enum EnhanceError {
    /// Bad configuration value supplied by the caller; not retryable
    /// without fixing the input
    InvalidParameter {
        parameter: String,
        value: String,
        constraint: String,
    },

    /// Image layout the transform cannot operate on
    UnsupportedFormat {
        expected: String,
        got: String,
        context: String,
    },

    /// The model runtime rejected the input or failed during inference
    ModelInvocation { model: String, details: String },
}

impl fmt::Display for EnhanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnhanceError::InvalidParameter {
                parameter,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter '{}' = '{}': must satisfy {}",
                    parameter, value, constraint
                )
            }
            EnhanceError::UnsupportedFormat {
                expected,
                got,
                context,
            } => {
                write!(
                    f,
                    "Unsupported image format in {}: expected {}, got {}",
                    context, expected, got
                )
            }
            EnhanceError::ModelInvocation { model, details } => {
                write!(f, "Model '{}' invocation failed: {}", model, details)
            }
        }
    }
}

impl std::error::Error for EnhanceError {}

// Convenience constructors for common error patterns
impl EnhanceError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        EnhanceError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(
        expected: impl Into<String>,
        got: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        EnhanceError::UnsupportedFormat {
            expected: expected.into(),
            got: got.into(),
            context: context.into(),
        }
    }

    /// Create a model invocation error
    pub fn model_invocation(model: impl Into<String>, details: impl Into<String>) -> Self {
        EnhanceError::ModelInvocation {
            model: model.into(),
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_display() {
        let err = EnhanceError::invalid_parameter("clip_limit", "0", "a finite value > 0");
        let msg = err.to_string();
        assert!(msg.contains("clip_limit"));
        assert!(msg.contains("0"));
        assert!(msg.contains("a finite value > 0"));
    }

    #[test]
    fn test_unsupported_format_display() {
        let err =
            EnhanceError::unsupported_format("3 channels", "1 channel(s)", "classical enhancement");
        let msg = err.to_string();
        assert!(msg.contains("3 channels"));
        assert!(msg.contains("1 channel(s)"));
        assert!(msg.contains("classical enhancement"));
    }

    #[test]
    fn test_model_invocation_display() {
        let err = EnhanceError::model_invocation("zero-dce", "tensor allocation failed");
        let msg = err.to_string();
        assert!(msg.contains("zero-dce"));
        assert!(msg.contains("tensor allocation failed"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = EnhanceError::invalid_parameter("tile_grid", "0x8", "both dimensions >= 1");
        let err2 = EnhanceError::invalid_parameter("tile_grid", "0x8", "both dimensions >= 1");
        let err3 = EnhanceError::invalid_parameter("tile_grid", "8x0", "both dimensions >= 1");

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EnhanceError>();
    }
}
