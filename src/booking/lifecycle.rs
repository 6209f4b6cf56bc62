//! Booking status state machine.
//!
//! ```text
//! pending   -> confirmed | cancelled
//! confirmed -> completed | cancelled
//! completed, cancelled: terminal
//! ```

use super::models::BookingStatus;
use super::services::BookingError;

impl BookingStatus {
    /// Statuses reachable from this one in a single host-initiated step
    pub fn next_statuses(&self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[BookingStatus::Confirmed, BookingStatus::Cancelled],
            BookingStatus::Confirmed => &[BookingStatus::Completed, BookingStatus::Cancelled],
            BookingStatus::Completed | BookingStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        self.next_statuses().contains(&next)
    }

    /// Validate a transition, returning the new status.
    pub fn transition_to(self, next: BookingStatus) -> Result<BookingStatus, BookingError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(BookingError::InvalidStatusTransition {
                from: self,
                to: next,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Completed,
    ];

    #[test]
    fn test_pending_can_be_confirmed_or_cancelled() {
        let pending = BookingStatus::Pending;
        assert_eq!(pending.transition_to(BookingStatus::Confirmed).unwrap(), BookingStatus::Confirmed);
        assert_eq!(pending.transition_to(BookingStatus::Cancelled).unwrap(), BookingStatus::Cancelled);
        assert!(pending.transition_to(BookingStatus::Completed).is_err());
    }

    #[test]
    fn test_confirmed_can_be_completed_or_cancelled() {
        let confirmed = BookingStatus::Confirmed;
        assert!(confirmed.can_transition_to(BookingStatus::Completed));
        assert!(confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(!confirmed.can_transition_to(BookingStatus::Pending));
    }

    #[test]
    fn test_terminal_states_have_no_way_out() {
        for terminal in [BookingStatus::Completed, BookingStatus::Cancelled] {
            assert!(terminal.next_statuses().is_empty());
            for next in ALL {
                let err = terminal.transition_to(next).unwrap_err();
                assert!(matches!(
                    err,
                    BookingError::InvalidStatusTransition { from, to } if from == terminal && to == next
                ));
            }
        }
    }

    #[test]
    fn test_self_transitions_are_rejected() {
        for status in ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn test_nothing_returns_to_pending() {
        for status in ALL {
            assert!(!status.can_transition_to(BookingStatus::Pending));
        }
    }
}
