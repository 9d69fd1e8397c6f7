//! Editable text buffers.
//!
//! A buffer is written by exactly one party (the file loader, or a test) and
//! observed by its debouncer. Every `set_text` notifies, even when the text
//! did not change; duplicate suppression happens after debouncing.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Which of the two buffers a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Mapping-language text (the StructureMap source)
    Mapping,
    /// Sample input resource as JSON text
    Source,
}

impl BufferKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Mapping => "mapping",
            Self::Source => "source",
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text buffer with change notification.
#[derive(Debug, Clone)]
pub struct EditableBuffer {
    kind: BufferKind,
    tx: Arc<watch::Sender<String>>,
}

impl EditableBuffer {
    pub fn new(kind: BufferKind, initial: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(initial.into());
        Self {
            kind,
            tx: Arc::new(tx),
        }
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Replace the content unconditionally and notify subscribers.
    pub fn set_text(&self, value: impl Into<String>) {
        self.tx.send_replace(value.into());
    }

    pub fn current_text(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Change notifications start from the next `set_text`.
    pub fn subscribe(&self) -> BufferWatch {
        BufferWatch {
            kind: self.kind,
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving side of a buffer's change notifications.
#[derive(Debug)]
pub struct BufferWatch {
    kind: BufferKind,
    rx: watch::Receiver<String>,
}

impl BufferWatch {
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Wait for the next edit and return the text at that point.
    ///
    /// Edits made while nobody was waiting collapse into one notification
    /// carrying the latest text. Returns `None` once the buffer is dropped.
    pub async fn changed(&mut self) -> Option<String> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Latest text without waiting.
    pub fn current_text(&self) -> String {
        self.rx.borrow().clone()
    }
}
