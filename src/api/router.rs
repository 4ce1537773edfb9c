use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, provider, schedule, availability, booking};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Directory
        .route("/api/v1/providers", post(provider::create_provider))
        .route("/api/v1/providers/{provider_id}", get(provider::get_provider))
        .route("/api/v1/{provider_id}/staff", post(provider::create_staff).get(provider::list_staff))

        // Schedule
        .route("/api/v1/{provider_id}/schedule/slots", post(schedule::create_slot).get(schedule::list_slots))
        .route("/api/v1/{provider_id}/schedule/slots/{slot_id}", delete(schedule::delete_slot))
        .route("/api/v1/{provider_id}/schedule/time-offs", post(schedule::create_time_off).get(schedule::list_time_offs))
        .route("/api/v1/{provider_id}/schedule/time-offs/{time_off_id}", delete(schedule::delete_time_off))
        .route("/api/v1/{provider_id}/schedule/daily-limits", get(schedule::list_daily_limits))
        .route("/api/v1/{provider_id}/schedule/daily-limits/{date}", put(schedule::set_daily_limit).delete(schedule::clear_daily_limit))

        // Availability
        .route("/api/v1/{provider_id}/availability", get(availability::check_availability))
        .route("/api/v1/{provider_id}/availability/{date}", get(availability::day_availability))

        // Bookings
        .route("/api/v1/{provider_id}/bookings", post(booking::create_booking).get(booking::list_bookings))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/bookings/{booking_id}/timeline", get(booking::get_timeline))
        .route("/api/v1/bookings/{booking_id}/confirm", post(booking::confirm_booking))
        .route("/api/v1/bookings/{booking_id}/assign-staff", post(booking::assign_staff))
        .route("/api/v1/bookings/{booking_id}/start", post(booking::start_booking))
        .route("/api/v1/bookings/{booking_id}/complete", post(booking::complete_booking))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))
        .route("/api/v1/bookings/{booking_id}/dispute", post(booking::dispute_booking))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
