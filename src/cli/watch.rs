//! `maplive watch`: run the actor system until Ctrl+C.

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;

use super::InputArgs;
use crate::actor::Coordinator;
use crate::config::AppConfig;

pub fn watch(config: AppConfig, inputs: &InputArgs) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = channel::bounded(1);
    ctrlc::set_handler(move || {
        crate::log!("watch"; "shutting down...");
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(async {
        Coordinator::new(Arc::new(config), inputs.map.clone(), inputs.source.clone())
            .with_shutdown_signal(shutdown_rx)
            .run()
            .await
    })
}
