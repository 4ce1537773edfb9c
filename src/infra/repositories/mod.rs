pub mod sqlite_provider_repo;
pub mod sqlite_staff_repo;
pub mod sqlite_schedule_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_timeline_repo;
pub mod sqlite_job_repo;
