mod common;

use axum::http::StatusCode;
use chrono::{NaiveDate, NaiveTime};
use common::{TestApp, MONDAY};
use provider_booking::domain::services::schedule_service::{NewSlot, NewTimeOff};
use provider_booking::error::AppError;
use serde_json::json;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_weekly_slot_overlap_rules() {
    let app = TestApp::new().await;
    let pid = app.create_provider("Sparkle Cleaning").await;

    let (status, slot) = app.add_slot(&pid, 1, "09:00", "12:00", Some(2)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(slot["day_of_week"], 1);
    assert_eq!(slot["booking_limit"], 2);

    // Overlaps the morning window
    let (status, body) = app.add_slot(&pid, 1, "11:00", "13:00", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "OVERLAP_CONFLICT");

    // Touching at the boundary is fine
    let (status, _) = app.add_slot(&pid, 1, "12:00", "14:00", None).await;
    assert_eq!(status, StatusCode::CREATED);

    // Same window on another weekday is fine
    let (status, _) = app.add_slot(&pid, 2, "09:00", "12:00", None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, monday) = app
        .request("GET", &format!("/api/v1/{}/schedule/slots?day_of_week=1", pid), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let monday = monday.as_array().unwrap();
    assert_eq!(monday.len(), 2);
    assert_eq!(monday[0]["start_time"], "09:00:00");
    assert_eq!(monday[1]["start_time"], "12:00:00");
}

#[tokio::test]
async fn test_slot_validation_errors() {
    let app = TestApp::new().await;
    let pid = app.create_provider("Validation Co").await;

    let (status, body) = app.add_slot(&pid, 1, "10:00", "10:00", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_RANGE");

    // Windows crossing midnight are rejected
    let (status, body) = app.add_slot(&pid, 5, "22:00", "02:00", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_RANGE");

    let (status, body) = app.add_slot(&pid, 7, "09:00", "10:00", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_VALUE");

    let (status, body) = app.add_slot(&pid, 1, "09:00", "10:00", Some(-1)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_VALUE");

    let (status, body) = app.add_slot(&pid, 1, "nine", "10:00", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION");

    let (status, body) = app.add_slot("missing-provider", 1, "09:00", "10:00", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_time_off_rules() {
    let app = TestApp::new().await;
    let pid = app.create_provider("Time Off Co").await;

    let (status, body) = app.add_time_off(&pid, MONDAY, Some("10:00"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_RANGE");

    let (status, body) = app.add_time_off(&pid, MONDAY, Some("11:00"), Some("10:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_RANGE");

    let (status, _) = app.add_time_off(&pid, MONDAY, Some("10:00"), Some("11:00")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.add_time_off(&pid, MONDAY, Some("10:00"), Some("11:00")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "OVERLAP_CONFLICT");

    // Only exact duplicates conflict
    let (status, _) = app.add_time_off(&pid, MONDAY, Some("10:30"), Some("12:00")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, full_day) = app.add_time_off(&pid, MONDAY, None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(full_day["start_time"].is_null());

    let (status, body) = app.add_time_off(&pid, MONDAY, None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "OVERLAP_CONFLICT");

    let (_, listed) = app
        .request("GET", &format!("/api/v1/{}/schedule/time-offs?from={}&to={}", pid, MONDAY, MONDAY), None)
        .await;
    assert_eq!(listed.as_array().unwrap().len(), 3);

    let (status, body) = app
        .request("GET", &format!("/api/v1/{}/schedule/time-offs?from=2024-06-11&to=2024-06-10", pid), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_RANGE");
}

#[tokio::test]
async fn test_daily_limit_upsert_and_clear() {
    let app = TestApp::new().await;
    let pid = app.create_provider("Limits Co").await;
    let uri = format!("/api/v1/{}/schedule/daily-limits/{}", pid, MONDAY);

    let (status, body) = app.request("PUT", &uri, Some(json!({"order_limit": -3}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_VALUE");

    let (status, body) = app.request("PUT", &uri, Some(json!({"order_limit": 4}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_limit"], 4);

    // Second write replaces the first
    let (status, body) = app.request("PUT", &uri, Some(json!({"order_limit": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_limit"], 1);

    let (_, limits) = app.request("GET", &format!("/api/v1/{}/schedule/daily-limits", pid), None).await;
    assert_eq!(limits.as_array().unwrap().len(), 1);

    let (status, _) = app.request("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, limits) = app.request("GET", &format!("/api/v1/{}/schedule/daily-limits", pid), None).await;
    assert!(limits.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_deletes_are_idempotent() {
    let app = TestApp::new().await;
    let pid = app.create_provider("Idempotent Co").await;

    let (_, slot) = app.add_slot(&pid, 3, "08:00", "09:00", None).await;
    let slot_uri = format!("/api/v1/{}/schedule/slots/{}", pid, slot["id"].as_str().unwrap());
    assert_eq!(app.request("DELETE", &slot_uri, None).await.0, StatusCode::OK);
    assert_eq!(app.request("DELETE", &slot_uri, None).await.0, StatusCode::OK);

    let (_, off) = app.add_time_off(&pid, MONDAY, None, None).await;
    let off_uri = format!("/api/v1/{}/schedule/time-offs/{}", pid, off["id"].as_str().unwrap());
    assert_eq!(app.request("DELETE", &off_uri, None).await.0, StatusCode::OK);
    assert_eq!(app.request("DELETE", &off_uri, None).await.0, StatusCode::OK);

    let limit_uri = format!("/api/v1/{}/schedule/daily-limits/{}", pid, MONDAY);
    assert_eq!(app.request("DELETE", &limit_uri, None).await.0, StatusCode::OK);

    // A removed slot frees its window
    let (status, _) = app.add_slot(&pid, 3, "08:30", "09:30", None).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_concurrent_overlapping_slots_admit_one() {
    let app = TestApp::new().await;
    let pid = app.create_provider("Race Slots").await;
    let service = app.state.schedule_service.clone();

    // Every window overlaps 10:00-11:00
    let mut set = JoinSet::new();
    for i in 0..8u32 {
        let service = service.clone();
        let pid = pid.clone();
        set.spawn(async move {
            service
                .add_weekly_slot(
                    &pid,
                    NewSlot {
                        day_of_week: 3,
                        start_time: NaiveTime::from_hms_opt(9, i * 5, 0).unwrap(),
                        end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
                        booking_limit: Some(1),
                    },
                )
                .await
        });
    }

    let mut created = 0;
    let mut conflicts = 0;
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::OverlapConflict(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(service.list_slots(&pid, Some(3)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_duplicate_time_offs_admit_one() {
    let app = TestApp::new().await;
    let pid = app.create_provider("Race Time Off").await;
    let service = app.state.schedule_service.clone();
    let date = NaiveDate::parse_from_str(MONDAY, "%Y-%m-%d").unwrap();

    let mut set = JoinSet::new();
    for i in 0..8 {
        let service = service.clone();
        let pid = pid.clone();
        set.spawn(async move {
            service
                .add_time_off(
                    &pid,
                    NewTimeOff {
                        date,
                        start_time: None,
                        end_time: None,
                        reason: Some(format!("holiday {}", i)),
                    },
                )
                .await
        });
    }

    let mut created = 0;
    let mut conflicts = 0;
    while let Some(res) = set.join_next().await {
        match res.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::OverlapConflict(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(service.list_time_offs(&pid, Some(date), Some(date)).await.unwrap().len(), 1);
}
