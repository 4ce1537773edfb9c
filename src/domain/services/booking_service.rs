use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use tracing::{info, warn};

use crate::domain::models::booking::{Booking, LifecycleEvent, NewBookingParams};
use crate::domain::models::job::{Job, PaymentAction};
use crate::domain::models::schedule::WeeklyScheduleSlot;
use crate::domain::models::timeline::{MediaProof, ProofInput, TrackingCode, TrackingEvent};
use crate::domain::ports::{BookingRepository, StaffDirectory};
use crate::domain::services::availability::{AvailabilityEngine, Capacity, Resolution};
use crate::domain::services::lifecycle::{tracking_code, transition};
use crate::domain::services::locks::KeyedLocks;
use crate::domain::services::timeline::TimelineRecorder;
use crate::error::AppError;

/// Admission scope: one provider's slot window on one date.
type AdmissionKey = (String, NaiveDate, String);

pub struct CreateBookingInput {
    pub provider_id: String,
    pub customer_id: String,
    pub service_id: String,
    pub booking_time: NaiveDateTime,
    pub amount: i64,
    pub payment_id: Option<String>,
    pub voucher_id: Option<String>,
}

#[derive(Default)]
pub struct TransitionInput {
    pub description: Option<String>,
    pub proofs: Vec<ProofInput>,
    pub staff_id: Option<String>,
    pub cancel_reason: Option<String>,
}

pub struct BookingService {
    availability: Arc<AvailabilityEngine>,
    booking_repo: Arc<dyn BookingRepository>,
    staff_directory: Arc<dyn StaffDirectory>,
    recorder: Arc<TimelineRecorder>,
    admission_locks: KeyedLocks<AdmissionKey>,
    booking_locks: KeyedLocks<String>,
}

impl BookingService {
    pub fn new(
        availability: Arc<AvailabilityEngine>,
        booking_repo: Arc<dyn BookingRepository>,
        staff_directory: Arc<dyn StaffDirectory>,
        recorder: Arc<TimelineRecorder>,
    ) -> Self {
        Self {
            availability,
            booking_repo,
            staff_directory,
            recorder,
            admission_locks: KeyedLocks::new(),
            booking_locks: KeyedLocks::new(),
        }
    }

    /// Atomic admission: resolution, the capacity count and the insert run under the slot's lock.
    pub async fn create_booking(&self, input: CreateBookingInput) -> Result<Booking, AppError> {
        if input.customer_id.trim().is_empty() || input.service_id.trim().is_empty() {
            return Err(AppError::Validation("customer_id and service_id are required".into()));
        }
        if input.amount < 0 {
            return Err(AppError::InvalidValue(format!("amount must be >= 0, got {}", input.amount)));
        }
        self.availability.ensure_provider(&input.provider_id).await?;

        let at = input.booking_time;
        let date = at.date();

        // The first resolution only picks the lock scope; the schedule is read again under it.
        let (candidate, _) = self.open_slot(&input.provider_id, at).await?;
        let key = (input.provider_id.clone(), date, candidate.id.clone());
        let _guard = self.admission_locks.lock(&key).await;

        let (slot, limit) = self.open_slot(&input.provider_id, at).await?;
        if slot.id != candidate.id {
            warn!(
                "Admission rejected for provider {} at {}: slot {} changed while waiting",
                input.provider_id, at, candidate.id
            );
            return Err(AppError::SlotUnavailable(format!("{} is no longer in slot {}", at, candidate.id)));
        }

        let booked = self.availability.count_booked(&input.provider_id, date, &slot).await?;
        if !Capacity::from_limit(limit, booked).has_room() {
            warn!(
                "Admission rejected for provider {} at {}: slot {} full ({} booked)",
                input.provider_id, at, slot.id, booked
            );
            return Err(AppError::SlotUnavailable(format!("slot {} on {} is fully booked", slot.id, date)));
        }

        let booking = Booking::new(NewBookingParams {
            provider_id: input.provider_id,
            customer_id: input.customer_id,
            service_id: input.service_id,
            booking_time: at,
            slot_start: slot.start_time,
            slot_end: slot.end_time,
            amount: input.amount,
            payment_id: input.payment_id,
            voucher_id: input.voucher_id,
        });

        let event = TrackingEvent::new(booking.id.clone(), booking.created_at, TrackingCode::Created, None, Vec::new());
        let jobs = notification_jobs(&booking, TrackingCode::Created);

        let created = self.booking_repo.create_admitted(&booking, &event, jobs).await?;
        info!("Booking {} ({}) admitted for provider {} at {}", created.id, created.code, created.provider_id, at);
        Ok(created)
    }

    async fn open_slot(&self, provider_id: &str, at: NaiveDateTime) -> Result<(WeeklyScheduleSlot, Option<i32>), AppError> {
        let schedule = self.availability.load_day(provider_id, at.date()).await?;
        match schedule.resolve(at) {
            Resolution::Closed(reason) => {
                warn!("Admission rejected for provider {} at {}: {:?}", provider_id, at, reason);
                Err(AppError::SlotUnavailable(format!("{} is not bookable ({:?})", at, reason)))
            }
            Resolution::Open { slot, limit } => Ok((slot.clone(), limit)),
        }
    }

    pub async fn confirm(&self, booking_id: &str, input: TransitionInput) -> Result<Booking, AppError> {
        self.transition(booking_id, LifecycleEvent::Confirm, input).await
    }

    pub async fn assign_staff(&self, booking_id: &str, input: TransitionInput) -> Result<Booking, AppError> {
        self.transition(booking_id, LifecycleEvent::AssignStaff, input).await
    }

    pub async fn start(&self, booking_id: &str, input: TransitionInput) -> Result<Booking, AppError> {
        self.transition(booking_id, LifecycleEvent::Start, input).await
    }

    pub async fn complete(&self, booking_id: &str, input: TransitionInput) -> Result<Booking, AppError> {
        self.transition(booking_id, LifecycleEvent::Complete, input).await
    }

    pub async fn cancel(&self, booking_id: &str, input: TransitionInput) -> Result<Booking, AppError> {
        self.transition(booking_id, LifecycleEvent::Cancel, input).await
    }

    /// Entry point for the complaint subsystem.
    pub async fn raise_dispute(&self, booking_id: &str, input: TransitionInput) -> Result<Booking, AppError> {
        self.transition(booking_id, LifecycleEvent::RaiseDispute, input).await
    }

    async fn transition(&self, booking_id: &str, event: LifecycleEvent, input: TransitionInput) -> Result<Booking, AppError> {
        let _guard = self.booking_locks.lock(&booking_id.to_string()).await;

        let current = self.get_booking(booking_id).await?;
        let next = transition(current.status, event)?;

        let now = Utc::now();
        let mut updated = current.clone();
        let mut description = input.description.filter(|d| !d.trim().is_empty());

        match event {
            LifecycleEvent::Confirm => updated.confirmed_at = Some(now),
            LifecycleEvent::AssignStaff => {
                let staff_id = input
                    .staff_id
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(AppError::InvalidValue("staff_id is required".into()))?;
                let staff = self
                    .staff_directory
                    .find_by_id(&staff_id)
                    .await?
                    .ok_or(AppError::NotFound(format!("Staff {} not found", staff_id)))?;
                if staff.provider_id != current.provider_id {
                    return Err(AppError::InvalidValue(format!(
                        "staff {} does not belong to provider {}",
                        staff.id, current.provider_id
                    )));
                }
                description.get_or_insert_with(|| format!("Assigned to {}", staff.name));
                updated.staff_id = Some(staff.id);
            }
            LifecycleEvent::Cancel => {
                let reason = input
                    .cancel_reason
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .ok_or(AppError::InvalidValue("cancel_reason is required".into()))?;
                description = Some(reason.clone());
                updated.cancel_reason = Some(reason);
            }
            LifecycleEvent::Start | LifecycleEvent::Complete | LifecycleEvent::RaiseDispute => {}
        }

        let proofs = self.accept_proofs(&current, input.proofs, now).await?;

        updated.status = next;
        updated.updated_at = now;

        let code = tracking_code(event);
        let tracking = self.recorder.next_event(booking_id, code, description, proofs).await?;

        let mut jobs = notification_jobs(&updated, code);
        match event {
            LifecycleEvent::Complete => jobs.push(Job::payment(&updated.id, updated.amount, PaymentAction::ReleaseEscrow)),
            LifecycleEvent::Cancel => jobs.push(Job::payment(&updated.id, updated.amount, PaymentAction::EvaluateRefund)),
            _ => {}
        }

        let saved = self.booking_repo.apply_transition(&updated, current.status, &tracking, jobs).await?;
        info!("Booking {} moved {} -> {}", saved.id, current.status, saved.status);
        Ok(saved)
    }

    /// Proofs credited to a staff member must name someone from the booking's provider.
    async fn accept_proofs(&self, booking: &Booking, inputs: Vec<ProofInput>, now: chrono::DateTime<Utc>) -> Result<Vec<MediaProof>, AppError> {
        let mut proofs = Vec::with_capacity(inputs.len());
        for input in inputs {
            if input.url.trim().is_empty() {
                return Err(AppError::InvalidValue("proof url is required".into()));
            }
            if let Some(staff_id) = &input.staff_id {
                let staff = self
                    .staff_directory
                    .find_by_id(staff_id)
                    .await?
                    .ok_or(AppError::NotFound(format!("Staff {} not found", staff_id)))?;
                if staff.provider_id != booking.provider_id {
                    return Err(AppError::InvalidValue(format!(
                        "proof staff {} does not belong to provider {}",
                        staff_id, booking.provider_id
                    )));
                }
            }
            proofs.push(input.into_proof(now));
        }
        Ok(proofs)
    }

    pub async fn get_booking(&self, booking_id: &str) -> Result<Booking, AppError> {
        self.booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::NotFound(format!("Booking {} not found", booking_id)))
    }

    pub async fn list_bookings(&self, provider_id: &str, date: Option<NaiveDate>) -> Result<Vec<Booking>, AppError> {
        self.booking_repo.list_by_provider(provider_id, date).await
    }

    pub async fn timeline(&self, booking_id: &str) -> Result<Vec<TrackingEvent>, AppError> {
        self.get_booking(booking_id).await?;
        self.recorder.list(booking_id).await
    }

    pub fn prune_idle_locks(&self) -> usize {
        self.admission_locks.prune_idle() + self.booking_locks.prune_idle()
    }
}

fn notification_jobs(booking: &Booking, code: TrackingCode) -> Vec<Job> {
    vec![
        Job::notification(&booking.id, &booking.customer_id, code),
        Job::notification(&booking.id, &booking.provider_id, code),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::booking::BookingStatus;
    use crate::domain::models::directory::Provider;
    use crate::domain::models::schedule::DailyLimitOverride;
    use crate::domain::ports::{ProviderRepository, ScheduleRepository};
    use crate::infra::factory::run_sqlite_migrations;
    use crate::infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo, sqlite_provider_repo::SqliteProviderRepo,
        sqlite_schedule_repo::SqliteScheduleRepo, sqlite_staff_repo::SqliteStaffRepo,
        sqlite_timeline_repo::SqliteTimelineRepo,
    };
    use chrono::{NaiveDate, NaiveTime};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::time::Duration;

    #[tokio::test]
    async fn test_admission_rereads_schedule_after_waiting_for_slot_lock() {
        let pool = SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await.unwrap();
        run_sqlite_migrations(&pool).await.unwrap();

        let provider_repo = Arc::new(SqliteProviderRepo::new(pool.clone()));
        let schedule_repo = Arc::new(SqliteScheduleRepo::new(pool.clone()));
        let booking_repo = Arc::new(SqliteBookingRepo::new(pool.clone()));
        let availability = Arc::new(AvailabilityEngine::new(
            provider_repo.clone(),
            schedule_repo.clone(),
            booking_repo.clone(),
        ));
        let service = Arc::new(BookingService::new(
            availability,
            booking_repo,
            Arc::new(SqliteStaffRepo::new(pool.clone())),
            Arc::new(TimelineRecorder::new(Arc::new(SqliteTimelineRepo::new(pool.clone())))),
        ));

        let provider = provider_repo.create(&Provider::new("Lock Co".into())).await.unwrap();
        let slot = schedule_repo
            .create_slot(&WeeklyScheduleSlot::new(
                provider.id.clone(),
                1,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                Some(2),
            ))
            .await
            .unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        // Another admission holds the slot while the request resolves it as open
        let held = service.admission_locks.lock(&(provider.id.clone(), monday, slot.id.clone())).await;
        let waiting = {
            let service = service.clone();
            let provider_id = provider.id.clone();
            tokio::spawn(async move {
                service
                    .create_booking(CreateBookingInput {
                        provider_id,
                        customer_id: "cust".into(),
                        service_id: "svc".into(),
                        booking_time: monday.and_hms_opt(10, 0, 0).unwrap(),
                        amount: 0,
                        payment_id: None,
                        voucher_id: None,
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        // The date closes before the lock is released
        schedule_repo
            .upsert_daily_limit(&DailyLimitOverride::new(provider.id.clone(), monday, 0))
            .await
            .unwrap();
        drop(held);

        let result = waiting.await.unwrap();
        assert!(matches!(result, Err(AppError::SlotUnavailable(_))), "got {:?}", result);
        assert!(service.list_bookings(&provider.id, Some(monday)).await.unwrap().is_empty());
    }

    #[test]
    fn test_every_transition_notifies_both_parties() {
        let booking = Booking::new(NewBookingParams {
            provider_id: "prov".into(),
            customer_id: "cust".into(),
            service_id: "svc".into(),
            booking_time: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(10, 0, 0).unwrap(),
            slot_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            slot_end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            amount: 1500,
            payment_id: None,
            voucher_id: None,
        });
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.code.starts_with("BK-"));

        let jobs = notification_jobs(&booking, TrackingCode::Created);
        let recipients: Vec<String> = jobs
            .iter()
            .map(|j| match &j.payload.0 {
                crate::domain::models::job::JobPayload::Notification(n) => n.recipient_id.clone(),
                other => panic!("unexpected payload {:?}", other),
            })
            .collect();
        assert_eq!(recipients, vec!["cust".to_string(), "prov".to_string()]);
    }
}
