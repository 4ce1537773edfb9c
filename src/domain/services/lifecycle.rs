use crate::domain::models::booking::{BookingStatus, LifecycleEvent};
use crate::domain::models::timeline::TrackingCode;
use crate::error::AppError;

/// The transition table. Anything not listed is illegal.
pub fn next_status(from: BookingStatus, event: LifecycleEvent) -> Option<BookingStatus> {
    use BookingStatus::*;
    use LifecycleEvent::*;

    match (from, event) {
        (Pending, Confirm) => Some(Confirmed),
        (Confirmed, AssignStaff) => Some(StaffAssigned),
        (StaffAssigned, Start) => Some(InProgress),
        (InProgress, Complete) => Some(Completed),
        (Pending | Confirmed | StaffAssigned | InProgress, Cancel) => Some(Canceled),
        (Completed, RaiseDispute) => Some(Disputed),
        _ => None,
    }
}

pub fn transition(from: BookingStatus, event: LifecycleEvent) -> Result<BookingStatus, AppError> {
    next_status(from, event).ok_or(AppError::InvalidTransition {
        from,
        to: event.target(),
    })
}

pub fn tracking_code(event: LifecycleEvent) -> TrackingCode {
    match event {
        LifecycleEvent::Confirm => TrackingCode::Confirmed,
        LifecycleEvent::AssignStaff => TrackingCode::StaffAssigned,
        LifecycleEvent::Start => TrackingCode::InProgress,
        LifecycleEvent::Complete => TrackingCode::Completed,
        LifecycleEvent::Cancel => TrackingCode::Canceled,
        LifecycleEvent::RaiseDispute => TrackingCode::Disputed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut status = BookingStatus::Pending;
        for event in [
            LifecycleEvent::Confirm,
            LifecycleEvent::AssignStaff,
            LifecycleEvent::Start,
            LifecycleEvent::Complete,
            LifecycleEvent::RaiseDispute,
        ] {
            status = transition(status, event).unwrap();
            assert_eq!(status, event.target());
        }
        assert_eq!(status, BookingStatus::Disputed);
    }

    #[test]
    fn test_table_is_total() {
        let mut legal = 0;
        for from in BookingStatus::ALL {
            for event in LifecycleEvent::ALL {
                match transition(from, event) {
                    Ok(to) => {
                        legal += 1;
                        assert_eq!(to, event.target());
                    }
                    Err(AppError::InvalidTransition { from: f, to }) => {
                        assert_eq!(f, from);
                        assert_eq!(to, event.target());
                    }
                    Err(other) => panic!("unexpected error {:?}", other),
                }
            }
        }
        // 4 forward moves, 4 cancel sources, 1 dispute
        assert_eq!(legal, 9);
    }

    #[test]
    fn test_terminal_states_reject_everything_but_dispute() {
        for event in LifecycleEvent::ALL {
            assert!(next_status(BookingStatus::Canceled, event).is_none());
            assert!(next_status(BookingStatus::Disputed, event).is_none());
        }
        assert!(next_status(BookingStatus::Completed, LifecycleEvent::Cancel).is_none());
        assert_eq!(
            next_status(BookingStatus::Completed, LifecycleEvent::RaiseDispute),
            Some(BookingStatus::Disputed)
        );
    }
}
