//! Display Actor - renders pipeline snapshots
//!
//! Observes the pipeline's snapshot channel and keeps one status block on
//! screen describing the latest state. Optionally mirrors the compiled
//! StructureMap and the transformed resource to files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::watch;

use super::pipeline::{CompileStage, PipelineSnapshot, TransformStage};
use crate::config::OutputConfig;
use crate::error::TransformFailure;

/// What the status block should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Pending(String),
    Ok(String),
    Failed { summary: String, detail: String },
}

/// Describe a snapshot for the terminal.
pub fn describe(snapshot: &PipelineSnapshot) -> Status {
    let artifact = match &snapshot.compile {
        CompileStage::Idle => return Status::Pending("waiting for mapping".into()),
        CompileStage::Compiling => return Status::Pending("compiling mapping".into()),
        CompileStage::Failed(err) => {
            return Status::Failed {
                summary: "compile failed".into(),
                detail: err.outcome().summary(),
            };
        }
        CompileStage::Compiled(artifact) => artifact,
    };

    match &snapshot.transform {
        TransformStage::Idle => Status::Ok(format!(
            "compiled {}\nwaiting for source",
            artifact.url
        )),
        TransformStage::Transforming => {
            Status::Pending(format!("compiled {}, transforming", artifact.url))
        }
        TransformStage::Transformed(result) => Status::Ok(format!(
            "compiled {}\n{}",
            artifact.url,
            to_json(&result.0, true)
        )),
        TransformStage::Failed(TransformFailure::Decode(err)) => Status::Failed {
            summary: "invalid source".into(),
            detail: err.to_string(),
        },
        TransformStage::Failed(TransformFailure::Remote(err)) => Status::Failed {
            summary: format!("transform with {} failed", artifact.url),
            detail: err.outcome().summary(),
        },
    }
}

pub struct DisplayActor {
    snapshots: watch::Receiver<PipelineSnapshot>,
    output: OutputConfig,
}

impl DisplayActor {
    pub fn new(snapshots: watch::Receiver<PipelineSnapshot>, output: OutputConfig) -> Self {
        Self { snapshots, output }
    }

    /// Run until the pipeline goes away.
    pub async fn run(mut self) {
        while self.snapshots.changed().await.is_ok() {
            let snapshot = self.snapshots.borrow_and_update().clone();
            show(&describe(&snapshot));
            self.write_outputs(&snapshot);
        }
        crate::debug!("display"; "pipeline closed");
    }

    /// Only successful values are written; a failure leaves the last good file.
    fn write_outputs(&self, snapshot: &PipelineSnapshot) {
        let pretty = self.output.pretty;
        if let (Some(path), Some(artifact)) =
            (&self.output.structure_map, snapshot.compiled_artifact())
            && let Err(e) = write_json(path, &artifact.resource, pretty)
        {
            crate::log!("error"; "{:#}", e);
        }
        if let (Some(path), Some(result)) = (&self.output.result, snapshot.transformed_result())
            && let Err(e) = write_json(path, &result.0, pretty)
        {
            crate::log!("error"; "{:#}", e);
        }
    }
}

fn show(status: &Status) {
    match status {
        Status::Pending(message) => crate::logger::status_pending(message),
        Status::Ok(message) => crate::logger::status_success(message),
        Status::Failed { summary, detail } => crate::logger::status_error(summary, detail),
    }
}

fn to_json(value: &Value, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.unwrap_or_else(|_| value.to_string())
}

/// Write a JSON value, creating parent directories as needed.
pub fn write_json(path: &Path, value: &Value, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut content = to_json(value, pretty);
    content.push('\n');
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
