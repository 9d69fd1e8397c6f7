use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::actor::debounce::DebounceActor;
use crate::actor::messages::PipelineMsg;
use crate::actor::pipeline::{PipelineActor, PipelineSnapshot};
use crate::buffer::{BufferKind, EditableBuffer};
use crate::remote::{RemoteCompiler, RemoteTransformer};

const CHANNEL_BUFFER: usize = 32;

/// The editing core: two buffers, their debouncers and the pipeline.
///
/// ```text
/// mapping ─▶ DebounceActor ─┐
///                           ├─▶ PipelineActor ─▶ snapshots
/// source  ─▶ DebounceActor ─┘
/// ```
pub struct Session {
    pub mapping: EditableBuffer,
    pub source: EditableBuffer,
    snapshots: watch::Receiver<PipelineSnapshot>,
    pipeline_tx: mpsc::Sender<PipelineMsg>,
    pipeline: JoinHandle<()>,
    debouncers: Vec<JoinHandle<()>>,
}

impl Session {
    /// Spawn the actors on the current runtime.
    pub fn start(
        quiet_interval: Duration,
        compiler: Arc<dyn RemoteCompiler>,
        transformer: Arc<dyn RemoteTransformer>,
    ) -> Self {
        let mapping = EditableBuffer::new(BufferKind::Mapping, "");
        let source = EditableBuffer::new(BufferKind::Source, "");
        let (pipeline_tx, pipeline_rx) = mpsc::channel(CHANNEL_BUFFER);

        let pipeline = PipelineActor::new(pipeline_rx, compiler, transformer, source.subscribe());
        let snapshots = pipeline.snapshots();

        let debouncers = [&mapping, &source]
            .into_iter()
            .map(|buffer| {
                let actor =
                    DebounceActor::new(buffer.subscribe(), quiet_interval, pipeline_tx.clone());
                tokio::spawn(actor.run())
            })
            .collect();

        crate::debug!("actor"; "session started, quiet interval {:?}", quiet_interval);
        Self {
            mapping,
            source,
            snapshots,
            pipeline_tx,
            pipeline: tokio::spawn(pipeline.run()),
            debouncers,
        }
    }

    pub fn snapshots(&self) -> watch::Receiver<PipelineSnapshot> {
        self.snapshots.clone()
    }

    /// True once the pipeline actor has exited.
    pub fn is_finished(&self) -> bool {
        self.pipeline.is_finished()
    }

    /// Stop the pipeline (aborting outstanding requests) and the debouncers.
    pub async fn shutdown(self) {
        let _ = self.pipeline_tx.send(PipelineMsg::Shutdown).await;
        let _ = tokio::time::timeout(Duration::from_millis(500), self.pipeline).await;
        for handle in self.debouncers {
            handle.abort();
        }
        crate::debug!("actor"; "session stopped");
    }
}
