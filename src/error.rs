//! Error taxonomy of the mapping pipeline.
//!
//! | Error            | Origin | Sent remotely |
//! |------------------|--------|---------------|
//! | `DecodeError`    | local  | never         |
//! | `CompileError`   | server | -             |
//! | `TransformError` | server | -             |
//!
//! All of them are terminal for the attempt that produced them. The next
//! settled edit starts a fresh attempt.

use thiserror::Error;

use crate::remote::OperationOutcome;

/// Source buffer text is not valid JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("source is not valid JSON at line {line}, column {column}: {message}")]
pub struct DecodeError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        let full = err.to_string();
        let position = format!(" at line {} column {}", err.line(), err.column());
        let message = full.strip_suffix(&position).unwrap_or(&full).to_string();
        Self {
            line: err.line(),
            column: err.column(),
            message,
        }
    }
}

/// Server rejected (or never answered) a compile request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("compile failed:\n{0}")]
pub struct CompileError(pub OperationOutcome);

/// Server rejected (or never answered) a transform request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("transform failed:\n{0}")]
pub struct TransformError(pub OperationOutcome);

/// Why the transform stage failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformFailure {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Remote(#[from] TransformError),
}

impl CompileError {
    pub fn outcome(&self) -> &OperationOutcome {
        &self.0
    }
}

impl TransformError {
    pub fn outcome(&self) -> &OperationOutcome {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_position() {
        let err = serde_json::from_str::<serde_json::Value>("{\"a\":\n  1,").unwrap_err();
        let decode = DecodeError::from(err);
        assert_eq!(decode.line, 2);
        assert!(decode.to_string().starts_with("source is not valid JSON at line 2"));
    }

    #[test]
    fn test_decode_error_position_reported_once() {
        let err = serde_json::from_str::<serde_json::Value>(r#"{"resourceType":"Pat"#).unwrap_err();
        let decode = DecodeError::from(err);
        assert_eq!(decode.message, "EOF while parsing a string");
        let rendered = decode.to_string();
        assert_eq!(rendered.matches("line").count(), 1);
        assert!(rendered.ends_with(": EOF while parsing a string"));
    }

    #[test]
    fn test_transform_failure_is_transparent() {
        let failure = TransformFailure::from(TransformError(OperationOutcome::synthesized(
            "processing",
            "no such map",
        )));
        assert_eq!(failure.to_string(), "transform failed:\nerror [processing]: no such map");
    }
}
