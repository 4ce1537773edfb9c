use std::sync::Arc;
use crate::domain::ports::{
    ProviderRepository, StaffDirectory, ScheduleRepository, BookingRepository,
    TimelineRepository, JobRepository, PaymentService, NotificationService,
};
use crate::domain::services::{
    availability::AvailabilityEngine, booking_service::BookingService,
    schedule_service::ScheduleService,
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub provider_repo: Arc<dyn ProviderRepository>,
    pub staff_directory: Arc<dyn StaffDirectory>,
    pub schedule_repo: Arc<dyn ScheduleRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub timeline_repo: Arc<dyn TimelineRepository>,
    pub job_repo: Arc<dyn JobRepository>,
    pub payment_service: Arc<dyn PaymentService>,
    pub notification_service: Arc<dyn NotificationService>,
    pub schedule_service: Arc<ScheduleService>,
    pub availability: Arc<AvailabilityEngine>,
    pub booking_service: Arc<BookingService>,
}
