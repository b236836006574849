//! Background jobs.
//!
//! Call `spawn_all` once during startup; every job stops when the returned
//! handle is cancelled.

use crate::services::NotificationService;
use crate::utils::{CancelHandle, CancelToken};
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct BackgroundTasks {
    cancel: CancelHandle,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Signals every job to stop and waits for them.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                log::error!("Background task ended abnormally: {e}");
            }
        }
    }
}

pub fn spawn_all(notification_service: NotificationService, poll_interval: Duration) -> BackgroundTasks {
    let cancel = CancelHandle::new();
    let handles = vec![tokio::spawn(run_email_outbox(
        notification_service,
        poll_interval,
        cancel.token(),
    ))];
    BackgroundTasks { cancel, handles }
}

/// Delivers queued emails every `poll_interval` until cancelled.
pub async fn run_email_outbox(
    service: NotificationService,
    poll_interval: Duration,
    cancel: CancelToken,
) {
    log::info!("Email outbox worker started (every {poll_interval:?})");
    loop {
        match service.process_due(chrono::Utc::now()).await {
            Ok(report) if report.sent + report.retried + report.dead_lettered > 0 => {
                log::info!(
                    "Email outbox: {} sent, {} retried, {} failed",
                    report.sent,
                    report.retried,
                    report.dead_lettered
                );
            }
            Ok(_) => {}
            Err(e) => log::error!("Email outbox pass failed: {e:?}"),
        }

        tokio::select! {
            _ = tokio::time::sleep(poll_interval) => {}
            _ = cancel.cancelled() => break,
        }
    }
    log::info!("Email outbox worker stopped");
}
