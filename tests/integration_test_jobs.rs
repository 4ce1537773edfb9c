mod common;

use std::sync::atomic::Ordering;

use chrono::Utc;
use common::{TestApp, MONDAY};
use provider_booking::background::process_pending_jobs;
use provider_booking::domain::models::job::{JobPayload, JobStatus, PaymentAction, JOB_LEASE_SECS, MAX_ATTEMPTS};
use provider_booking::domain::models::timeline::TrackingCode;
use serde_json::json;

async fn booked(app: &TestApp) -> String {
    let pid = app.create_provider("Outbox Co").await;
    app.add_slot(&pid, 1, "09:00", "12:00", None).await;
    let (_, booking) = app.book(&pid, &format!("{}T10:00", MONDAY)).await;
    booking["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_creation_notifies_customer_and_provider() {
    let app = TestApp::new().await;
    let bid = booked(&app).await;

    let jobs = app.state.job_repo.list_by_booking(&bid).await.unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.job_type == "NOTIFICATION" && j.status == JobStatus::Pending));

    assert_eq!(process_pending_jobs(&app.state).await, 2);

    let sent = app.notifications.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|n| n.event_code == TrackingCode::Created && n.booking_id == bid));
    assert!(sent.iter().any(|n| n.recipient_id == "customer-1"));

    let jobs = app.state.job_repo.list_by_booking(&bid).await.unwrap();
    assert!(jobs.iter().all(|j| j.status == JobStatus::Completed && j.attempts == 1));

    // Nothing left to claim
    assert_eq!(process_pending_jobs(&app.state).await, 0);
}

#[tokio::test]
async fn test_completion_releases_escrow_and_cancel_requests_refund() {
    let app = TestApp::new().await;
    let pid = app.create_provider("Escrow Co").await;
    app.add_slot(&pid, 1, "09:00", "12:00", None).await;
    let staff = app.create_staff(&pid, "Hoa").await;

    let (_, done) = app.book(&pid, &format!("{}T10:00", MONDAY)).await;
    let done_id = done["id"].as_str().unwrap().to_string();
    app.transition(&done_id, "confirm", json!({})).await;
    app.transition(&done_id, "assign-staff", json!({"staff_id": staff})).await;
    app.transition(&done_id, "start", json!({})).await;
    app.transition(&done_id, "complete", json!({})).await;

    let (_, dropped) = app.book(&pid, &format!("{}T11:00", MONDAY)).await;
    let dropped_id = dropped["id"].as_str().unwrap().to_string();
    app.transition(&dropped_id, "cancel", json!({"cancel_reason": "sick"})).await;

    while process_pending_jobs(&app.state).await > 0 {}

    let payments = app.payments.sent.lock().unwrap().clone();
    assert_eq!(payments.len(), 2);
    let release = payments.iter().find(|p| p.booking_id == done_id).unwrap();
    assert_eq!(release.status, PaymentAction::ReleaseEscrow);
    assert_eq!(release.amount, 2500);
    let refund = payments.iter().find(|p| p.booking_id == dropped_id).unwrap();
    assert_eq!(refund.status, PaymentAction::EvaluateRefund);

    // 5 events x 2 recipients for the completed booking, 2 x 2 for the canceled one
    assert_eq!(app.notifications.sent.lock().unwrap().len(), 14);
}

#[tokio::test]
async fn test_failed_delivery_is_retried_then_abandoned() {
    let app = TestApp::new().await;
    app.notifications.fail.store(true, Ordering::SeqCst);
    let bid = booked(&app).await;

    assert_eq!(process_pending_jobs(&app.state).await, 2);

    let jobs = app.state.job_repo.list_by_booking(&bid).await.unwrap();
    for job in &jobs {
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 1);
        assert!(job.execute_at > Utc::now());
        assert!(job.error_message.as_deref().unwrap().contains("unavailable"));
    }

    // Backoff keeps them out of the next pass
    assert_eq!(process_pending_jobs(&app.state).await, 0);

    // Make the jobs due on their final attempt
    sqlx::query("UPDATE jobs SET execute_at = ?, attempts = ? WHERE booking_id = ?")
        .bind(Utc::now() - chrono::Duration::seconds(1))
        .bind(MAX_ATTEMPTS - 1)
        .bind(&bid)
        .execute(&app.pool)
        .await
        .unwrap();

    assert_eq!(process_pending_jobs(&app.state).await, 2);
    let jobs = app.state.job_repo.list_by_booking(&bid).await.unwrap();
    assert!(jobs.iter().all(|j| j.status == JobStatus::Failed && j.attempts == MAX_ATTEMPTS));
    assert!(app.notifications.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_processing_jobs_are_reclaimed_after_lease() {
    let app = TestApp::new().await;
    let bid = booked(&app).await;

    // A worker claims the jobs and dies before reporting back
    let claimed = app.state.job_repo.find_pending(10).await.unwrap();
    assert_eq!(claimed.len(), 2);
    assert!(claimed.iter().all(|j| j.status == JobStatus::Processing && j.attempts == 1));
    assert!(claimed.iter().all(|j| j.execute_at > Utc::now() + chrono::Duration::seconds(JOB_LEASE_SECS - 60)));

    // Lease still held
    assert!(app.state.job_repo.find_pending(10).await.unwrap().is_empty());
    assert_eq!(process_pending_jobs(&app.state).await, 0);

    sqlx::query("UPDATE jobs SET execute_at = ? WHERE booking_id = ?")
        .bind(Utc::now() - chrono::Duration::seconds(1))
        .bind(&bid)
        .execute(&app.pool)
        .await
        .unwrap();

    assert_eq!(process_pending_jobs(&app.state).await, 2);
    let jobs = app.state.job_repo.list_by_booking(&bid).await.unwrap();
    assert!(jobs.iter().all(|j| j.status == JobStatus::Completed && j.attempts == 2));
    assert_eq!(app.notifications.sent.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_job_payload_is_tagged_by_kind() {
    let app = TestApp::new().await;
    let bid = booked(&app).await;

    let jobs = app.state.job_repo.list_by_booking(&bid).await.unwrap();
    let raw: String = sqlx::query_scalar("SELECT payload FROM jobs WHERE id = ?")
        .bind(&jobs[0].id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["kind"], "NOTIFICATION");
    assert_eq!(value["event_code"], "CREATED");

    assert!(matches!(jobs[0].payload.0, JobPayload::Notification(_)));
}
