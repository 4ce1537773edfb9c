pub mod booking;
pub mod directory;
pub mod job;
pub mod schedule;
pub mod timeline;
