use provider_booking::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::job::{NotificationNotice, PaymentNotice},
    domain::ports::{NotificationService, PaymentService},
    infra::factory::{assemble_state, run_sqlite_migrations},
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::{json, Value};

/// 2024-06-10 is a Monday (day_of_week = 1).
#[allow(dead_code)]
pub const MONDAY: &str = "2024-06-10";

#[derive(Default)]
pub struct MockPaymentService {
    pub sent: Mutex<Vec<PaymentNotice>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl PaymentService for MockPaymentService {
    async fn notify(&self, notice: &PaymentNotice) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Collaborator("payment service unavailable".into()));
        }
        self.sent.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockNotificationService {
    pub sent: Mutex<Vec<NotificationNotice>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl NotificationService for MockNotificationService {
    async fn notify(&self, notice: &NotificationNotice) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Collaborator("notification service unavailable".into()));
        }
        self.sent.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub payments: Arc<MockPaymentService>,
    pub notifications: Arc<MockNotificationService>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_sqlite_migrations(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            payment_service_url: "http://localhost".to_string(),
            notification_service_url: "http://localhost".to_string(),
            collaborator_token: "token".to_string(),
            worker_poll_secs: 1,
        };

        let payments = Arc::new(MockPaymentService::default());
        let notifications = Arc::new(MockNotificationService::default());

        let state = Arc::new(assemble_state(
            &config,
            pool.clone(),
            payments.clone(),
            notifications.clone(),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            payments,
            notifications,
        }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn create_provider(&self, name: &str) -> String {
        let (status, body) = self.request("POST", "/api/v1/providers", Some(json!({"name": name}))).await;
        assert_eq!(status, StatusCode::CREATED, "provider creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_staff(&self, provider_id: &str, name: &str) -> String {
        let (status, body) = self
            .request("POST", &format!("/api/v1/{}/staff", provider_id), Some(json!({"name": name})))
            .await;
        assert_eq!(status, StatusCode::CREATED, "staff creation failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn add_slot(&self, provider_id: &str, day: i32, start: &str, end: &str, limit: Option<i32>) -> (StatusCode, Value) {
        self.request(
            "POST",
            &format!("/api/v1/{}/schedule/slots", provider_id),
            Some(json!({"day_of_week": day, "start_time": start, "end_time": end, "booking_limit": limit})),
        )
        .await
    }

    pub async fn add_time_off(&self, provider_id: &str, date: &str, start: Option<&str>, end: Option<&str>) -> (StatusCode, Value) {
        self.request(
            "POST",
            &format!("/api/v1/{}/schedule/time-offs", provider_id),
            Some(json!({"date": date, "start_time": start, "end_time": end, "reason": "test"})),
        )
        .await
    }

    pub async fn availability(&self, provider_id: &str, at: &str) -> Value {
        let (status, body) = self
            .request("GET", &format!("/api/v1/{}/availability?at={}", provider_id, at), None)
            .await;
        assert_eq!(status, StatusCode::OK, "availability failed: {}", body);
        body
    }

    pub async fn book(&self, provider_id: &str, at: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            &format!("/api/v1/{}/bookings", provider_id),
            Some(json!({
                "customer_id": "customer-1",
                "service_id": "cleaning",
                "booking_time": at,
                "amount": 2500
            })),
        )
        .await
    }

    pub async fn transition(&self, booking_id: &str, action: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", &format!("/api/v1/bookings/{}/{}", booking_id, action), Some(body)).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
