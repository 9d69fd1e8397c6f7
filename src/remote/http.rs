//! HTTP client for a FHIR server with StructureMap support (e.g. matchbox).
//!
//! - compile: `POST {base}/StructureMap` with `text/fhir-mapping` body
//! - transform: `POST {base}/StructureMap/$transform?source={url}` with JSON body

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{RequestBuilder, StatusCode, header};
use serde_json::Value;
use url::Url;

use super::outcome::OperationOutcome;
use super::{RemoteCompiler, RemoteTransformer};
use crate::config::ServerConfig;
use crate::error::{CompileError, TransformError};
use crate::resource::{CompiledArtifact, SourceResource, TransformedResult};

const FHIR_JSON: &str = "application/fhir+json";
const FHIR_MAPPING: &str = "text/fhir-mapping";

/// Characters left intact in a query component (same set as JS `encodeURIComponent`).
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Implements both remote seams against one server.
#[derive(Debug, Clone)]
pub struct FhirMappingClient {
    http: reqwest::Client,
    base: Url,
}

impl FhirMappingClient {
    pub fn new(base: Url, timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let base = config.endpoint()?;
        Self::new(base, config.timeout())
            .map_err(|e| anyhow::anyhow!("failed to build http client: {}", e))
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: RequestBuilder) -> Result<String, OperationOutcome> {
        let response = request
            .header(header::ACCEPT, FHIR_JSON)
            .send()
            .await
            .map_err(transport_outcome)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_outcome)?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(failure_outcome(status, &body))
        }
    }
}

#[async_trait]
impl RemoteCompiler for FhirMappingClient {
    async fn compile(&self, mapping: &str) -> Result<CompiledArtifact, CompileError> {
        crate::debug!("compile"; "POST StructureMap ({} bytes)", mapping.len());
        let request = self
            .http
            .post(compile_url(&self.base))
            .header(header::CONTENT_TYPE, FHIR_MAPPING)
            .body(mapping.to_owned());

        let body = self.send(request).await.map_err(CompileError)?;
        artifact_from_body(&body).map_err(CompileError)
    }
}

#[async_trait]
impl RemoteTransformer for FhirMappingClient {
    async fn transform(
        &self,
        artifact: &CompiledArtifact,
        source: &SourceResource,
    ) -> Result<TransformedResult, TransformError> {
        crate::debug!("transform"; "POST $transform source={}", artifact.url);
        let body = serde_json::to_vec(&source.0)
            .map_err(|e| TransformError(OperationOutcome::synthesized("exception", e.to_string())))?;
        let request = self
            .http
            .post(transform_url(&self.base, &artifact.url))
            .header(header::CONTENT_TYPE, FHIR_JSON)
            .body(body);

        let body = self.send(request).await.map_err(TransformError)?;
        result_from_body(&body).map_err(TransformError)
    }
}

fn endpoint(base: &Url) -> String {
    base.as_str().trim_end_matches('/').to_string()
}

pub(super) fn compile_url(base: &Url) -> String {
    format!("{}/StructureMap", endpoint(base))
}

pub(super) fn transform_url(base: &Url, artifact_url: &str) -> String {
    format!(
        "{}/StructureMap/$transform?source={}",
        endpoint(base),
        utf8_percent_encode(artifact_url, QUERY_COMPONENT)
    )
}

/// Interpret a successful compile response.
pub(super) fn artifact_from_body(body: &str) -> Result<CompiledArtifact, OperationOutcome> {
    let resource = parse_resource(body)?;
    let Some(url) = resource.get("url").and_then(Value::as_str) else {
        return Err(OperationOutcome::synthesized(
            "processing",
            "server returned a StructureMap without a canonical url",
        ));
    };
    Ok(CompiledArtifact {
        url: url.to_string(),
        resource,
    })
}

/// Interpret a successful transform response.
pub(super) fn result_from_body(body: &str) -> Result<TransformedResult, OperationOutcome> {
    parse_resource(body).map(TransformedResult)
}

/// Parse a 2xx body; an OperationOutcome here is still a failure.
fn parse_resource(body: &str) -> Result<Value, OperationOutcome> {
    if let Some(outcome) = OperationOutcome::from_body(body) {
        return Err(outcome);
    }
    serde_json::from_str(body).map_err(|e| {
        OperationOutcome::synthesized("processing", format!("server response is not JSON: {e}"))
    })
}

/// Pass the server's outcome through, or describe the raw failure.
pub(super) fn failure_outcome(status: StatusCode, body: &str) -> OperationOutcome {
    OperationOutcome::from_body(body).unwrap_or_else(|| {
        let body = body.trim();
        let detail = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        };
        OperationOutcome::synthesized("processing", detail)
    })
}

fn transport_outcome(err: reqwest::Error) -> OperationOutcome {
    let detail = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        format!("request failed: {err}")
    };
    OperationOutcome::synthesized("exception", detail)
}
