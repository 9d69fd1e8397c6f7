use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::{mpsc, watch};

use super::{CompileStage, PipelineActor, PipelineSnapshot, TransformStage};
use crate::actor::messages::PipelineMsg;
use crate::buffer::{BufferKind, EditableBuffer};
use crate::error::{CompileError, TransformError, TransformFailure};
use crate::remote::{OperationOutcome, RemoteCompiler, RemoteTransformer};
use crate::resource::{CompiledArtifact, SourceResource, TransformedResult};

/// Scripted stand-in for the mapping server.
///
/// - compile accepts text starting with `map`; the artifact url is `urn:<text>`
/// - a `delay_ms` field in the mapping line or the source delays the response
/// - transform fails when the source has a `"fail"` field
#[derive(Default)]
struct FakeServer {
    compile_calls: Mutex<Vec<String>>,
    transform_calls: Mutex<Vec<(String, Value)>>,
}

fn delay_in_text(text: &str) -> Option<u64> {
    let rest = text.split("delay_ms=").nth(1)?;
    rest.split_whitespace().next()?.parse().ok()
}

#[async_trait]
impl RemoteCompiler for FakeServer {
    async fn compile(&self, mapping: &str) -> Result<CompiledArtifact, CompileError> {
        self.compile_calls.lock().push(mapping.to_string());
        if let Some(ms) = delay_in_text(mapping) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if !mapping.starts_with("map") {
            return Err(CompileError(OperationOutcome::synthesized(
                "processing",
                format!("Error @1, 1: Found \"{mapping}\" expecting \"map\""),
            )));
        }
        let url = format!("urn:{mapping}");
        Ok(CompiledArtifact {
            resource: json!({"resourceType": "StructureMap", "url": url}),
            url,
        })
    }
}

#[async_trait]
impl RemoteTransformer for FakeServer {
    async fn transform(
        &self,
        artifact: &CompiledArtifact,
        source: &SourceResource,
    ) -> Result<TransformedResult, TransformError> {
        self.transform_calls
            .lock()
            .push((artifact.url.clone(), source.0.clone()));
        if let Some(ms) = source.0.get("delay_ms").and_then(Value::as_u64) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if source.0.get("fail").is_some() {
            return Err(TransformError(OperationOutcome::synthesized(
                "processing",
                "source rejected",
            )));
        }
        Ok(TransformedResult(json!({"map": artifact.url, "input": source.0})))
    }
}

struct Harness {
    server: Arc<FakeServer>,
    source: EditableBuffer,
    tx: mpsc::Sender<PipelineMsg>,
    snapshots: watch::Receiver<PipelineSnapshot>,
}

impl Harness {
    fn start(source_text: &str) -> Self {
        let server = Arc::new(FakeServer::default());
        let source = EditableBuffer::new(BufferKind::Source, source_text);
        let (tx, rx) = mpsc::channel(16);
        let actor = PipelineActor::new(rx, server.clone(), server.clone(), source.subscribe());
        let snapshots = actor.snapshots();
        tokio::spawn(actor.run());
        Self {
            server,
            source,
            tx,
            snapshots,
        }
    }

    async fn settle(&self, kind: BufferKind, text: &str) {
        self.tx
            .send(PipelineMsg::Settled {
                kind,
                text: text.to_string(),
            })
            .await
            .unwrap();
    }

    async fn wait_for(&mut self, f: impl FnMut(&PipelineSnapshot) -> bool) -> PipelineSnapshot {
        tokio::time::timeout(Duration::from_secs(60), self.snapshots.wait_for(f))
            .await
            .expect("pipeline did not reach expected state")
            .unwrap()
            .clone()
    }

    /// Let every outstanding timer fire.
    async fn drain(&self) {
        tokio::time::sleep(Duration::from_secs(30)).await;
    }

    fn compile_calls(&self) -> usize {
        self.server.compile_calls.lock().len()
    }

    fn transform_calls(&self) -> usize {
        self.server.transform_calls.lock().len()
    }
}

fn is_transformed(s: &PipelineSnapshot) -> bool {
    matches!(s.transform, TransformStage::Transformed(_))
}

#[tokio::test(start_paused = true)]
async fn test_compile_then_transform_then_invalid_mapping() {
    let mut h = Harness::start(r#"{"a":1}"#);

    h.settle(BufferKind::Mapping, r#"map "http://x" = "y""#).await;
    let snapshot = h.wait_for(is_transformed).await;

    let artifact = snapshot.compiled_artifact().unwrap();
    assert_eq!(artifact.url, r#"urn:map "http://x" = "y""#);
    assert_eq!(
        snapshot.transformed_result().unwrap().0["input"],
        json!({"a": 1})
    );
    assert_eq!(h.server.transform_calls.lock()[0].0, artifact.url);

    h.settle(BufferKind::Mapping, "asdfasdf").await;
    let snapshot = h
        .wait_for(|s| matches!(s.compile, CompileStage::Failed(_)))
        .await;

    assert!(snapshot.compiled_artifact().is_none());
    let outcome = snapshot.compile_error().unwrap().outcome();
    assert!(outcome.summary().contains("expecting \"map\""));
    assert_eq!(snapshot.transform, TransformStage::Idle);
    assert!(snapshot.transformed_result().is_none());
    assert!(snapshot.transform_error().is_none());

    // Editing state untouched by the failure
    assert_eq!(h.source.current_text(), r#"{"a":1}"#);
    assert_eq!(h.transform_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_early_compile_does_not_clobber_newer() {
    let mut h = Harness::start("");

    h.settle(BufferKind::Mapping, "map slow delay_ms=500").await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.settle(BufferKind::Mapping, "map fast delay_ms=20").await;

    let snapshot = h
        .wait_for(|s| matches!(s.compile, CompileStage::Compiled(_)))
        .await;
    assert_eq!(snapshot.compiled_artifact().unwrap().url, "urn:map fast delay_ms=20");

    h.drain().await;
    let latest = h.snapshots.borrow().clone();
    assert_eq!(latest.compiled_artifact().unwrap().url, "urn:map fast delay_ms=20");
    assert_eq!(h.compile_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_slow_early_failure_does_not_clobber_newer_success() {
    let mut h = Harness::start("");

    h.settle(BufferKind::Mapping, "broken delay_ms=500").await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.settle(BufferKind::Mapping, "map ok").await;

    h.wait_for(|s| s.compiled_artifact().is_some()).await;
    h.drain().await;

    let latest = h.snapshots.borrow().clone();
    assert!(latest.compile_error().is_none());
    assert_eq!(latest.compiled_artifact().unwrap().url, "urn:map ok");
}

#[tokio::test(start_paused = true)]
async fn test_slow_early_transform_does_not_clobber_newer() {
    let mut h = Harness::start("");

    h.settle(BufferKind::Mapping, "map m").await;
    h.wait_for(|s| s.compiled_artifact().is_some()).await;

    h.settle(BufferKind::Source, r#"{"v":1,"delay_ms":500}"#).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.settle(BufferKind::Source, r#"{"v":2}"#).await;

    let snapshot = h.wait_for(is_transformed).await;
    assert_eq!(snapshot.transformed_result().unwrap().0["input"]["v"], 2);

    h.drain().await;
    let latest = h.snapshots.borrow().clone();
    assert_eq!(latest.transformed_result().unwrap().0["input"]["v"], 2);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_source_fails_without_remote_call() {
    let mut h = Harness::start(r#"{"a":1}"#);

    h.settle(BufferKind::Mapping, "map m").await;
    h.wait_for(is_transformed).await;
    assert_eq!(h.transform_calls(), 1);

    h.settle(BufferKind::Source, r#"{"resourceType":"Pat"#).await;
    let snapshot = h
        .wait_for(|s| matches!(s.transform, TransformStage::Failed(_)))
        .await;

    assert!(matches!(
        snapshot.transform_error(),
        Some(TransformFailure::Decode(_))
    ));
    assert!(snapshot.transformed_result().is_none());
    assert_eq!(h.transform_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_blank_source_is_decode_failure() {
    let mut h = Harness::start("");

    h.settle(BufferKind::Mapping, "map m").await;
    let snapshot = h.wait_for(|s| s.compiled_artifact().is_some()).await;
    // Empty buffer at compile time is decoded like any other text
    assert!(matches!(
        snapshot.transform_error(),
        Some(TransformFailure::Decode(_))
    ));

    h.settle(BufferKind::Source, "   ").await;
    h.drain().await;
    assert!(matches!(
        h.snapshots.borrow().transform,
        TransformStage::Failed(TransformFailure::Decode(_))
    ));
    assert_eq!(h.transform_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_source_settle_without_artifact_stays_idle() {
    let mut h = Harness::start("");

    h.settle(BufferKind::Source, r#"{"a":1}"#).await;
    h.settle(BufferKind::Mapping, "nope").await;
    let snapshot = h.wait_for(|s| s.compile_error().is_some()).await;
    assert_eq!(snapshot.transform, TransformStage::Idle);

    h.settle(BufferKind::Source, r#"{"a":2}"#).await;
    h.drain().await;

    assert_eq!(h.snapshots.borrow().transform, TransformStage::Idle);
    assert_eq!(h.transform_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_compile_success_uses_current_source_text() {
    let mut h = Harness::start(r#"{"a":1}"#);
    h.source.set_text(r#"{"a":"latest"}"#);

    h.settle(BufferKind::Mapping, "map m").await;
    let snapshot = h.wait_for(is_transformed).await;
    assert_eq!(
        snapshot.transformed_result().unwrap().0["input"]["a"],
        "latest"
    );
}

#[tokio::test(start_paused = true)]
async fn test_transform_failure_passes_outcome_through() {
    let mut h = Harness::start(r#"{"fail":true}"#);

    h.settle(BufferKind::Mapping, "map m").await;
    let snapshot = h
        .wait_for(|s| matches!(s.transform, TransformStage::Failed(_)))
        .await;

    let Some(TransformFailure::Remote(err)) = snapshot.transform_error() else {
        panic!("expected remote transform failure");
    };
    assert_eq!(
        err.outcome().issue[0].diagnostics.as_deref(),
        Some("source rejected")
    );
    assert!(snapshot.compiled_artifact().is_some());

    // Fixing the source recovers without recompiling
    h.settle(BufferKind::Source, r#"{"ok":true}"#).await;
    let snapshot = h.wait_for(is_transformed).await;
    assert!(snapshot.transform_error().is_none());
    assert_eq!(h.compile_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_new_mapping_supersedes_outstanding_transform() {
    let mut h = Harness::start(r#"{"delay_ms":500}"#);

    h.settle(BufferKind::Mapping, "map one").await;
    h.wait_for(|s| matches!(s.transform, TransformStage::Transforming))
        .await;

    h.settle(BufferKind::Mapping, "map two").await;

    let snapshot = h.wait_for(is_transformed).await;
    assert_eq!(snapshot.transformed_result().unwrap().0["map"], "urn:map two");

    h.drain().await;
    assert_eq!(
        h.snapshots.borrow().transformed_result().unwrap().0["map"],
        "urn:map two"
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_actor() {
    let server = Arc::new(FakeServer::default());
    let source = EditableBuffer::new(BufferKind::Source, "");
    let (tx, rx) = mpsc::channel(4);
    let actor = PipelineActor::new(rx, server.clone(), server, source.subscribe());
    let handle = tokio::spawn(actor.run());

    tx.send(PipelineMsg::Settled {
        kind: BufferKind::Mapping,
        text: "map delay_ms=1000".into(),
    })
    .await
    .unwrap();
    tx.send(PipelineMsg::Shutdown).await.unwrap();
    handle.await.unwrap();
}
