//! Actor System for the live mapping pipeline
//!
//! Message-passing concurrency for watch mode:
//!
//! ```text
//! FileLoader --> EditableBuffer --> DebounceActor --> PipelineActor --> DisplayActor
//!  (notify)        (watch)          (settle, ×2)   (compile/transform)   (status)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `loader` - File watcher feeding a buffer
//! - `debounce` - Quiet-interval debouncing with duplicate suppression
//! - `pipeline` - Compile/transform state machine with stale-result protection
//! - `display` - Terminal status and output files
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod debounce;
pub mod display;
pub mod loader;
pub mod messages;
pub mod pipeline;

pub use coordinator::Coordinator;
