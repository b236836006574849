use crate::config::NotificationConfig;
use crate::entities::{EmailStatus, email_outbox_entity as outbox};
use crate::error::AppResult;
use crate::external::EmailSender;
use crate::models::NotificationStats;
use crate::utils::RetryPolicy;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    failed_attempts: AtomicU64,
    dead_letters: AtomicU64,
}

/// Outcome of one `process_due` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: u64,
    pub retried: u64,
    pub dead_lettered: u64,
}

/// Email outbox. Messages are written in the caller's transaction and
/// delivered later, so a provider outage never undoes the write that
/// produced them.
#[derive(Clone)]
pub struct NotificationService {
    pool: DatabaseConnection,
    sender: Arc<dyn EmailSender>,
    policy: RetryPolicy,
    batch_size: u64,
    counters: Arc<Counters>,
}

impl NotificationService {
    pub fn new(
        pool: DatabaseConnection,
        sender: Arc<dyn EmailSender>,
        config: &NotificationConfig,
    ) -> Self {
        Self {
            pool,
            sender,
            policy: RetryPolicy::new(
                config.max_attempts,
                Duration::from_secs(config.initial_backoff_secs),
                Duration::from_secs(config.max_backoff_secs),
            ),
            batch_size: config.batch_size.max(1),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Queues a message for delivery as soon as the worker next runs.
    pub async fn enqueue<C: ConnectionTrait>(
        conn: &C,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<outbox::Model, DbErr> {
        let now = Utc::now();
        outbox::ActiveModel {
            recipient: Set(recipient.to_string()),
            subject: Set(subject.to_string()),
            body: Set(body.to_string()),
            status: Set(EmailStatus::Pending),
            attempts: Set(0),
            next_attempt_at: Set(now),
            last_error: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
    }

    /// Delivers every pending message due at `now`, oldest first.
    pub async fn process_due(&self, now: DateTime<Utc>) -> AppResult<DeliveryReport> {
        let due = outbox::Entity::find()
            .filter(outbox::Column::Status.eq(EmailStatus::Pending))
            .filter(outbox::Column::NextAttemptAt.lte(now))
            .order_by_asc(outbox::Column::Id)
            .limit(self.batch_size)
            .all(&self.pool)
            .await?;

        let mut report = DeliveryReport::default();
        for message in due {
            let id = message.id;
            let attempts = message.attempts + 1;
            let result = self
                .sender
                .send(&message.recipient, &message.subject, &message.body)
                .await;

            let mut am = message.into_active_model();
            am.attempts = Set(attempts);
            am.updated_at = Set(Utc::now());
            match result {
                Ok(()) => {
                    am.status = Set(EmailStatus::Sent);
                    am.last_error = Set(None);
                    self.counters.sent.fetch_add(1, Ordering::Relaxed);
                    report.sent += 1;
                }
                Err(e) => {
                    self.counters.failed_attempts.fetch_add(1, Ordering::Relaxed);
                    am.last_error = Set(Some(e.to_string()));
                    if attempts as u32 >= self.policy.max_attempts {
                        log::error!("Giving up on email {id} after {attempts} attempts: {e}");
                        am.status = Set(EmailStatus::Failed);
                        self.counters.dead_letters.fetch_add(1, Ordering::Relaxed);
                        report.dead_lettered += 1;
                    } else {
                        let delay = self.policy.delay_for(attempts as u32);
                        log::warn!("Email {id} attempt {attempts} failed: {e}; retry in {delay:?}");
                        am.next_attempt_at = Set(now
                            + chrono::Duration::from_std(delay)
                                .unwrap_or_else(|_| chrono::Duration::hours(1)));
                        report.retried += 1;
                    }
                }
            }
            am.update(&self.pool).await?;
        }

        Ok(report)
    }

    pub async fn stats(&self) -> AppResult<NotificationStats> {
        let pending = outbox::Entity::find()
            .filter(outbox::Column::Status.eq(EmailStatus::Pending))
            .count(&self.pool)
            .await?;

        Ok(NotificationStats {
            sent: self.counters.sent.load(Ordering::Relaxed),
            failed_attempts: self.counters.failed_attempts.load(Ordering::Relaxed),
            dead_letters: self.counters.dead_letters.load(Ordering::Relaxed),
            pending,
        })
    }
}

/// Confirmation sent to a customer after a code was assigned.
pub fn claim_confirmation(
    deal_title: &str,
    code: &str,
    booking_url: Option<&str>,
) -> (String, String) {
    let subject = format!("Din rabattkod för {deal_title}");
    let mut body = format!(
        "Tack för ditt köp hos Lyxdeal!\n\nErbjudande: {deal_title}\nDin rabattkod: {code}\n\n\
         Uppge koden när du bokar din behandling hos salongen."
    );
    if let Some(url) = booking_url {
        body.push_str(&format!("\nBoka här: {url}"));
    }
    (subject, body)
}
