//! Periodic task runner
//!
//! Runs a job on an interval with cooperative shutdown. An iteration
//! error is logged and the task sleeps the (shorter) backoff before
//! retrying; the error never escapes the task.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::services::ServiceResult;

/// Spawn a named periodic task. The job runs immediately, then every
/// `interval` (or `backoff` after a failed iteration) until `shutdown`
/// flips to true or its sender is dropped.
pub fn spawn_periodic<F, Fut>(
    name: &'static str,
    interval: Duration,
    backoff: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut job: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ServiceResult<()>> + Send + 'static,
{
    tokio::spawn(async move {
        info!(task = name, "Periodic task started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let pause = match job().await {
                Ok(()) => interval,
                Err(e) => {
                    error!(task = name, error = %e, "Task iteration failed; backing off");
                    backoff
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!(task = name, "Periodic task stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const INTERVAL: Duration = Duration::from_secs(60);
    const BACKOFF: Duration = Duration::from_secs(10);

    #[tokio::test(start_paused = true)]
    async fn test_errors_do_not_kill_the_task() {
        let runs = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(false);

        let job_runs = Arc::clone(&runs);
        let handle = spawn_periodic("flaky", INTERVAL, BACKOFF, rx, move || {
            let runs = Arc::clone(&job_runs);
            async move {
                let n = runs.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(ServiceError::internal("transient"))
                } else {
                    Ok(())
                }
            }
        });

        // Two failures back off, then a success; the task keeps going
        tokio::time::sleep(BACKOFF * 2 + INTERVAL + Duration::from_secs(1)).await;
        assert!(runs.load(Ordering::SeqCst) >= 3);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_promptly() {
        let runs = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(false);

        let job_runs = Arc::clone(&runs);
        let handle = spawn_periodic("steady", INTERVAL, BACKOFF, rx, move || {
            let runs = Arc::clone(&job_runs);
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tx.send(true).unwrap();
        handle.await.unwrap();
        // No further iterations after shutdown
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
