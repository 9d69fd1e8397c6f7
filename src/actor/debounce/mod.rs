//! Debounce Actor
//!
//! Turns the change notifications of one buffer into settled events.
//!
//! ```text
//! EditableBuffer → BufferWatch → Debouncer (pure timing) → PipelineMsg::Settled
//! ```
//!
//! Each buffer gets its own actor; the two run independently.

use std::time::Duration;

use tokio::sync::mpsc;

use super::messages::PipelineMsg;
use crate::buffer::BufferWatch;

// Pure timing and deduplication.
mod debouncer;


use debouncer::Debouncer;

/// Debounce Actor - one per buffer
pub struct DebounceActor {
    watch: BufferWatch,
    debouncer: Debouncer,
    pipeline_tx: mpsc::Sender<PipelineMsg>,
}

impl DebounceActor {
    pub fn new(
        watch: BufferWatch,
        quiet_interval: Duration,
        pipeline_tx: mpsc::Sender<PipelineMsg>,
    ) -> Self {
        Self {
            watch,
            debouncer: Debouncer::new(quiet_interval),
            pipeline_tx,
        }
    }

    /// Run the actor event loop
    ///
    /// Stops when the buffer is dropped or the pipeline shuts down.
    pub async fn run(mut self) {
        let kind = self.watch.kind();

        loop {
            tokio::select! {
                biased;
                changed = self.watch.changed() => match changed {
                    Some(text) => self.debouncer.push(text),
                    None => break,
                },
                _ = tokio::time::sleep(self.debouncer.sleep_duration()) => {
                    let Some(text) = self.debouncer.take_if_ready() else {
                        continue;
                    };
                    crate::debug!("debounce"; "{} settled ({} bytes)", kind, text.len());
                    if self
                        .pipeline_tx
                        .send(PipelineMsg::Settled { kind, text })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }

        crate::debug!("debounce"; "{} stopped", kind);
    }
}
