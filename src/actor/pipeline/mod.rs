//! Pipeline Actor - compile/transform orchestration
//!
//! Single consumer of settled edits from both buffers. Owns all derived
//! state and decides which remote call to issue:
//!
//! - mapping settled: compile, then transform with the current source text
//! - source settled: transform if an artifact is compiled, else reset to idle
//!
//! Remote calls run as background tasks. A newer request for the same stage
//! aborts the older task and supersedes its ticket, so late responses are
//! never applied.

mod state;
mod tasks;

#[cfg(test)]
mod tests;

pub use state::{CompileStage, PipelineSnapshot, PipelineState, Ticket, TransformStage};

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinError;

use super::messages::PipelineMsg;
use crate::buffer::{BufferKind, BufferWatch};
use crate::error::{CompileError, TransformError, TransformFailure};
use crate::remote::{RemoteCompiler, RemoteTransformer};
use crate::resource::{CompiledArtifact, SourceResource};
use tasks::{
    CompileOutput, InFlight, TransformOutput, abort_task, join_failure, spawn_compile,
    spawn_transform, wait_task,
};

pub struct PipelineActor {
    rx: mpsc::Receiver<PipelineMsg>,
    compiler: Arc<dyn RemoteCompiler>,
    transformer: Arc<dyn RemoteTransformer>,
    /// Read-only view of the source buffer (compile success uses its current text)
    source: BufferWatch,
    state: PipelineState,
    snapshot_tx: watch::Sender<PipelineSnapshot>,
    compile_task: Option<InFlight<CompileOutput>>,
    transform_task: Option<InFlight<TransformOutput>>,
}

impl PipelineActor {
    pub fn new(
        rx: mpsc::Receiver<PipelineMsg>,
        compiler: Arc<dyn RemoteCompiler>,
        transformer: Arc<dyn RemoteTransformer>,
        source: BufferWatch,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(PipelineSnapshot::default());
        Self {
            rx,
            compiler,
            transformer,
            source,
            state: PipelineState::new(),
            snapshot_tx,
            compile_task: None,
            transform_task: None,
        }
    }

    /// Subscribe to state changes. The initial value is the idle snapshot.
    pub fn snapshots(&self) -> watch::Receiver<PipelineSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Main event loop
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                msg = self.rx.recv() => match msg {
                    Some(PipelineMsg::Settled { kind: BufferKind::Mapping, text }) => {
                        self.on_mapping_settled(text);
                    }
                    Some(PipelineMsg::Settled { kind: BufferKind::Source, text }) => {
                        self.on_source_settled(&text);
                    }
                    Some(PipelineMsg::Shutdown) | None => break,
                },

                (ticket, result) = wait_task(&mut self.compile_task) => {
                    self.compile_task = None;
                    self.on_compile_done(ticket, result);
                }

                (ticket, result) = wait_task(&mut self.transform_task) => {
                    self.transform_task = None;
                    self.on_transform_done(ticket, result);
                }
            }
        }

        abort_task(&mut self.compile_task, "compile");
        abort_task(&mut self.transform_task, "transform");
        crate::debug!("pipeline"; "shutting down");
    }

    fn on_mapping_settled(&mut self, text: String) {
        abort_task(&mut self.compile_task, "compile");
        abort_task(&mut self.transform_task, "transform");

        let ticket = self.state.begin_compile();
        crate::debug!("pipeline"; "compile #{} ({} bytes)", ticket, text.len());
        self.compile_task = Some(spawn_compile(Arc::clone(&self.compiler), ticket, text));
        self.publish();
    }

    fn on_source_settled(&mut self, text: &str) {
        match self.state.artifact().cloned() {
            Some(artifact) => self.attempt_transform(artifact, text),
            None => {
                abort_task(&mut self.transform_task, "transform");
                self.state.reset_transform();
                crate::debug!("pipeline"; "source settled without artifact, transform idle");
                self.publish();
            }
        }
    }

    fn on_compile_done(&mut self, ticket: Ticket, result: Result<CompileOutput, JoinError>) {
        let result =
            result.unwrap_or_else(|e| Err(CompileError(join_failure("compile", &e))));

        if !self.state.finish_compile(ticket, result) {
            crate::debug!("pipeline"; "discarding stale compile #{}", ticket);
            return;
        }

        match self.state.artifact().cloned() {
            Some(artifact) => {
                crate::debug!("pipeline"; "compile #{} ok: {}", ticket, artifact.url);
                let text = self.source.current_text();
                self.attempt_transform(artifact, &text);
            }
            None => {
                crate::debug!("pipeline"; "compile #{} failed", ticket);
                self.publish();
            }
        }
    }

    fn on_transform_done(&mut self, ticket: Ticket, result: Result<TransformOutput, JoinError>) {
        let result = result
            .unwrap_or_else(|e| Err(TransformError(join_failure("transform", &e))))
            .map_err(TransformFailure::Remote);

        if !self.state.finish_transform(ticket, result) {
            crate::debug!("pipeline"; "discarding stale transform #{}", ticket);
            return;
        }
        crate::debug!("pipeline"; "transform #{} done", ticket);
        self.publish();
    }

    /// Decode the source and, if it parses, ask the server to transform it.
    fn attempt_transform(&mut self, artifact: CompiledArtifact, text: &str) {
        abort_task(&mut self.transform_task, "transform");

        match SourceResource::decode(text) {
            Ok(source) => {
                if let Some(ticket) = self.state.begin_transform() {
                    crate::debug!("pipeline"; "transform #{} with {}", ticket, artifact.url);
                    self.transform_task = Some(spawn_transform(
                        Arc::clone(&self.transformer),
                        ticket,
                        artifact,
                        source,
                    ));
                }
            }
            Err(err) => {
                crate::debug!("pipeline"; "source rejected locally: {}", err);
                self.state.reject_source(err);
            }
        }
        self.publish();
    }

    fn publish(&self) {
        let next = self.state.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}
