use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};

use super::state::Ticket;
use crate::error::{CompileError, TransformError};
use crate::remote::{OperationOutcome, RemoteCompiler, RemoteTransformer};
use crate::resource::{CompiledArtifact, SourceResource, TransformedResult};

pub(super) type CompileOutput = Result<CompiledArtifact, CompileError>;
pub(super) type TransformOutput = Result<TransformedResult, TransformError>;

/// A spawned remote call together with the ticket it answers.
pub(super) struct InFlight<T> {
    pub(super) ticket: Ticket,
    handle: JoinHandle<T>,
}

/// Spawn a compile request.
pub(super) fn spawn_compile(
    compiler: Arc<dyn RemoteCompiler>,
    ticket: Ticket,
    mapping: String,
) -> InFlight<CompileOutput> {
    let handle = tokio::spawn(async move { compiler.compile(&mapping).await });
    InFlight { ticket, handle }
}

/// Spawn a transform request.
pub(super) fn spawn_transform(
    transformer: Arc<dyn RemoteTransformer>,
    ticket: Ticket,
    artifact: CompiledArtifact,
    source: SourceResource,
) -> InFlight<TransformOutput> {
    let handle = tokio::spawn(async move { transformer.transform(&artifact, &source).await });
    InFlight { ticket, handle }
}

/// Abort the task if running. Its response is never observed.
pub(super) fn abort_task<T>(task: &mut Option<InFlight<T>>, stage: &str) {
    if let Some(t) = task.take() {
        t.handle.abort();
        crate::debug!("pipeline"; "aborted {} #{}", stage, t.ticket);
    }
}

/// Wait for the task (pending forever if None).
///
/// Borrows instead of taking, so losing a `select!` race keeps the handle.
pub(super) async fn wait_task<T>(task: &mut Option<InFlight<T>>) -> (Ticket, Result<T, JoinError>) {
    match task.as_mut() {
        Some(t) => {
            let result = (&mut t.handle).await;
            (t.ticket, result)
        }
        None => std::future::pending().await,
    }
}

/// Outcome for a task that panicked instead of answering.
pub(super) fn join_failure(stage: &str, err: &JoinError) -> OperationOutcome {
    OperationOutcome::synthesized("exception", format!("{stage} task failed: {err}"))
}
