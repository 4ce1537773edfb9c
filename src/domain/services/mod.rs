pub mod availability;
pub mod booking_service;
pub mod conflict;
pub mod lifecycle;
pub mod locks;
pub mod schedule_service;
pub mod timeline;
