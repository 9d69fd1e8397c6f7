use crossbeam::channel::Receiver;
use tokio::task::JoinHandle;

use super::session::Session;

/// Run until Ctrl+C, a loader exiting, or the pipeline stopping.
pub(super) async fn run_until_shutdown(
    session: &Session,
    mut workers: Vec<JoinHandle<()>>,
    shutdown_rx: Option<Receiver<()>>,
) {
    loop {
        if let Some(rx) = &shutdown_rx
            && rx.try_recv().is_ok()
        {
            crate::debug!("actor"; "shutdown signal received");
            break;
        }
        if session.is_finished() || workers.iter().any(JoinHandle::is_finished) {
            crate::debug!("actor"; "actor exited");
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    for worker in workers.drain(..) {
        worker.abort();
    }
}
