//! Actor Coordinator - Wires up the watch-mode actor system
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates the editing session (buffers, debouncers, pipeline)
//! - Attaches file loaders and the display
//! - Runs them until Ctrl+C

mod runtime;
mod session;

pub use session::Session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;

use super::display::DisplayActor;
use super::loader::FileLoader;
use crate::config::AppConfig;
use crate::remote::FhirMappingClient;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<AppConfig>,
    mapping_path: PathBuf,
    source_path: PathBuf,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<AppConfig>, mapping_path: PathBuf, source_path: PathBuf) -> Self {
        Self {
            config,
            mapping_path,
            source_path,
            shutdown_rx: None,
        }
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let client = Arc::new(FhirMappingClient::from_config(&self.config.server)?);
        let session = Session::start(
            self.config.pipeline.quiet_interval(),
            client.clone(),
            client,
        );

        // Watch before the initial load so no edit falls in between.
        // Source first: a compile that settles quickly reads it.
        let source = FileLoader::new(&self.source_path, session.source.clone()).watch()?;
        let mapping = FileLoader::new(&self.mapping_path, session.mapping.clone()).watch()?;
        for loader in [&source, &mapping] {
            if let Err(e) = loader.load() {
                crate::log!("watch"; "{:#}", e);
            }
        }

        let display = DisplayActor::new(session.snapshots(), self.config.output.clone());

        crate::log!("watch"; "{} -> {}", self.mapping_path.display(), self.config.server.base_url);
        crate::log!("watch"; "source {}", self.source_path.display());

        let workers = vec![
            tokio::spawn(source.run()),
            tokio::spawn(mapping.run()),
            tokio::spawn(display.run()),
        ];

        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_until_shutdown(&session, workers, shutdown_rx).await;

        session.shutdown().await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
