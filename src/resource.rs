//! Values flowing through the pipeline.

use serde_json::Value;

use crate::error::DecodeError;

/// A StructureMap accepted by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledArtifact {
    /// Canonical url, the handle the transform endpoint takes
    pub url: String,
    /// Full StructureMap resource as returned
    pub resource: Value,
}

/// Parsed sample input, decoded from the source buffer right before a transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResource(pub Value);

impl SourceResource {
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(Self(serde_json::from_str(text)?))
    }
}

/// Output of applying a StructureMap to the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedResult(pub Value);
