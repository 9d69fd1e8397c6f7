//! Remote mapping authority.
//!
//! Two request/response seams, both stateless:
//!
//! ```text
//! mapping text ──RemoteCompiler──▶ CompiledArtifact (StructureMap url)
//! artifact + source ──RemoteTransformer──▶ TransformedResult
//! ```
//!
//! One outbound request per call, no retries. Failures carry the server's
//! `OperationOutcome` unchanged.

mod http;
mod outcome;

pub use http::FhirMappingClient;
pub use outcome::{Issue, OperationOutcome, Severity};

use async_trait::async_trait;

use crate::error::{CompileError, TransformError};
use crate::resource::{CompiledArtifact, SourceResource, TransformedResult};

/// Turns mapping-language text into a compiled StructureMap.
#[async_trait]
pub trait RemoteCompiler: Send + Sync {
    async fn compile(&self, mapping: &str) -> Result<CompiledArtifact, CompileError>;
}

/// Applies a compiled StructureMap to an input resource.
///
/// Only ever called with an artifact the compiler produced.
#[async_trait]
pub trait RemoteTransformer: Send + Sync {
    async fn transform(
        &self,
        artifact: &CompiledArtifact,
        source: &SourceResource,
    ) -> Result<TransformedResult, TransformError>;
}
