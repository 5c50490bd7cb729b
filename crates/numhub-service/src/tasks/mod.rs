//! Background sweepers
//!
//! Independent periodic tasks built on one runner: PRO-expiry
//! reconciliation, in-memory garbage collection, and retention-based purge
//! of historical rows. Each is fault-isolated; a failed iteration is
//! logged and retried after a backoff instead of killing the task.

mod memory_gc;
mod pro_expiry;
mod retention;
mod runner;

pub use runner::spawn_periodic;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use numhub_common::config::SweeperConfig;

use crate::services::ServiceContext;

/// Handles for the full set of background sweepers
pub struct SweeperSet {
    handles: Vec<JoinHandle<()>>,
}

impl SweeperSet {
    /// Spawn all sweepers. They run until `shutdown` flips to true.
    pub fn spawn(
        ctx: ServiceContext,
        config: &SweeperConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let handles = vec![
            pro_expiry::spawn(ctx.clone(), config, shutdown.clone()),
            memory_gc::spawn(ctx.clone(), config, shutdown.clone()),
            retention::spawn(ctx, config, shutdown),
        ];
        Self { handles }
    }

    /// Wait for every sweeper to wind down
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
