//! Actor Message Definitions
//!
//! ```text
//! DebounceActor ×2 --Settled--> PipelineActor --snapshot--> DisplayActor
//! ```

use crate::buffer::BufferKind;

/// Messages to the Pipeline Actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineMsg {
    /// A burst of edits on one buffer went quiet
    Settled { kind: BufferKind, text: String },
    /// Abort outstanding requests and stop
    Shutdown,
}
