//! File Loader - feeds a file's text into a buffer
//!
//! The only writer of a buffer in watch mode. Loads once at startup, then
//! re-reads the file whenever it changes on disk.
//!
//! ```text
//! notify (parent dir) → filter by file name → read_to_string → EditableBuffer::set_text
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::buffer::EditableBuffer;

pub struct FileLoader {
    path: PathBuf,
    buffer: EditableBuffer,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>, buffer: EditableBuffer) -> Self {
        Self {
            path: path.into(),
            buffer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and replace the buffer content.
    ///
    /// On failure the buffer keeps its previous text.
    pub fn load(&self) -> Result<()> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        crate::debug!("watch"; "loaded {} ({} bytes)", self.path.display(), text.len());
        self.buffer.set_text(text);
        Ok(())
    }

    /// Start watching. The watcher is live before this returns, so edits made
    /// right after startup are not missed.
    pub fn watch(self) -> Result<WatchingLoader> {
        let file_name = self
            .path
            .file_name()
            .map(OsString::from)
            .with_context(|| format!("{} is not a file path", self.path.display()))?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .context("failed to create file watcher")?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch {}", dir.display()))?;

        Ok(WatchingLoader {
            loader: self,
            file_name,
            notify_rx,
            _watcher: watcher,
        })
    }
}

/// A loader with an attached watcher.
pub struct WatchingLoader {
    loader: FileLoader,
    file_name: OsString,
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
}

impl WatchingLoader {
    /// Initial read; events already queued by the watcher are handled by `run`.
    pub fn load(&self) -> Result<()> {
        self.loader.load()
    }

    /// Run the loader event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        while let Some(event) = async_rx.recv().await {
            if !is_content_change(&event.kind) || !touches(&event, &self.file_name) {
                continue;
            }
            if let Err(e) = self.loader.load() {
                crate::log!("watch"; "{:#}", e);
            }
        }
    }
}

/// Writes, creates and renames count; metadata noise and removals do not.
fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(modify) => !matches!(modify, notify::event::ModifyKind::Metadata(_)),
        _ => false,
    }
}

fn touches(event: &notify::Event, file_name: &OsString) -> bool {
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()) && !is_temp_file(p))
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp") || name.ends_with('~')
}
