mod common;

use chrono::{Duration, Utc};
use common::*;
use lyxdeal_backend::entities::{EmailStatus, email_outbox_entity as outbox};
use lyxdeal_backend::models::NotificationStats;
use lyxdeal_backend::services::{DeliveryReport, NotificationService};
use sea_orm::EntityTrait;
use std::sync::Arc;

#[tokio::test]
async fn test_pending_message_is_delivered_once() {
    let db = setup_db().await;
    let email = Arc::new(FakeEmail::default());
    let service = NotificationService::new(db.clone(), email.clone(), &notification_config(5));
    NotificationService::enqueue(&db, "anna@example.se", "Din rabattkod", "ABCD2345")
        .await
        .unwrap();

    let now = Utc::now() + Duration::seconds(1);
    let report = service.process_due(now).await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(
        service.process_due(now).await.unwrap(),
        DeliveryReport::default()
    );

    let sent = email.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![("anna@example.se".to_string(), "Din rabattkod".to_string())]
    );
}

#[tokio::test]
async fn test_failed_delivery_backs_off_then_succeeds() {
    let db = setup_db().await;
    let email = Arc::new(FakeEmail::failing(2));
    let service = NotificationService::new(db.clone(), email.clone(), &notification_config(5));
    let queued = NotificationService::enqueue(&db, "anna@example.se", "Din rabattkod", "ABCD2345")
        .await
        .unwrap();

    let t0 = Utc::now() + Duration::seconds(1);
    assert_eq!(service.process_due(t0).await.unwrap().retried, 1);

    let row = outbox::Entity::find_by_id(queued.id).one(&db).await.unwrap().unwrap();
    assert_eq!(row.status, EmailStatus::Pending);
    assert_eq!(row.attempts, 1);
    assert_eq!(row.next_attempt_at, t0 + Duration::seconds(30));
    assert!(row.last_error.is_some());

    // not due again before the backoff has passed
    assert_eq!(service.process_due(t0).await.unwrap(), DeliveryReport::default());

    let t1 = t0 + Duration::seconds(31);
    assert_eq!(service.process_due(t1).await.unwrap().retried, 1);
    let row = outbox::Entity::find_by_id(queued.id).one(&db).await.unwrap().unwrap();
    assert_eq!(row.next_attempt_at, t1 + Duration::seconds(60));

    let t2 = t1 + Duration::seconds(61);
    assert_eq!(service.process_due(t2).await.unwrap().sent, 1);
    let row = outbox::Entity::find_by_id(queued.id).one(&db).await.unwrap().unwrap();
    assert_eq!(row.status, EmailStatus::Sent);
    assert_eq!(row.attempts, 3);
    assert!(row.last_error.is_none());

    assert_eq!(
        service.stats().await.unwrap(),
        NotificationStats {
            sent: 1,
            failed_attempts: 2,
            dead_letters: 0,
            pending: 0,
        }
    );
}

#[tokio::test]
async fn test_message_is_dead_lettered_after_max_attempts() {
    let db = setup_db().await;
    let email = Arc::new(FakeEmail::failing(10));
    let service = NotificationService::new(db.clone(), email.clone(), &notification_config(2));
    let queued = NotificationService::enqueue(&db, "anna@example.se", "Din rabattkod", "ABCD2345")
        .await
        .unwrap();

    let t0 = Utc::now() + Duration::seconds(1);
    assert_eq!(service.process_due(t0).await.unwrap().retried, 1);
    let t1 = t0 + Duration::seconds(31);
    assert_eq!(service.process_due(t1).await.unwrap().dead_lettered, 1);

    let row = outbox::Entity::find_by_id(queued.id).one(&db).await.unwrap().unwrap();
    assert_eq!(row.status, EmailStatus::Failed);
    assert_eq!(row.attempts, 2);

    // dead letters are never picked up again
    let later = t1 + Duration::days(1);
    assert_eq!(service.process_due(later).await.unwrap(), DeliveryReport::default());

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.dead_letters, 1);
    assert_eq!(stats.failed_attempts, 2);
    assert_eq!(stats.pending, 0);
    assert!(email.sent.lock().unwrap().is_empty());
}
