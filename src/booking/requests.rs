//! Request DTOs for booking and payment endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::models::BookingStatus;
use super::queries::HostBookingFilter;
use super::services::BookingRequest;

fn default_guest_count() -> i32 {
    1
}

fn default_limit() -> i64 {
    50
}

/// Request to book a stay (also the checkout body)
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default = "default_guest_count")]
    pub guest_count: i32,
    #[serde(default)]
    pub guest_notes: Option<String>,
}

impl CreateBookingRequest {
    pub fn into_booking_request(self, guest_id: Uuid) -> BookingRequest {
        BookingRequest {
            property_id: self.property_id,
            guest_id,
            check_in: self.check_in,
            check_out: self.check_out,
            guest_count: self.guest_count,
            notes: self.guest_notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Request to record a booking paid through the external processor
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub payment_reference: String,
    pub property_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default = "default_guest_count")]
    pub guest_count: i32,
    #[serde(default)]
    pub guest_notes: Option<String>,
}

impl ConfirmPaymentRequest {
    /// Split into the payment reference and the stay being paid for
    pub fn into_parts(self, guest_id: Uuid) -> (String, BookingRequest) {
        let booking = CreateBookingRequest {
            property_id: self.property_id,
            check_in: self.check_in,
            check_out: self.check_out,
            guest_count: self.guest_count,
            guest_notes: self.guest_notes,
        };
        (self.payment_reference, booking.into_booking_request(guest_id))
    }
}

/// Request from a host to move a booking along its lifecycle
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
}

/// Query parameters for a host's booking list
#[derive(Debug, Deserialize)]
pub struct HostBookingsQuery {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub property_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl HostBookingsQuery {
    pub fn filter(&self) -> HostBookingFilter {
        HostBookingFilter {
            status: self.status,
            property_id: self.property_id,
        }
    }

    /// Page bounds clamped to sane values
    pub fn page(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_booking_defaults() {
        let req: CreateBookingRequest = serde_json::from_value(serde_json::json!({
            "property_id": "7d0c1b7e-0f1e-4e9b-9a51-2b8f0d1f7a10",
            "check_in": "2026-03-01",
            "check_out": "2026-03-04"
        }))
        .unwrap();
        assert_eq!(req.guest_count, 1);
        assert!(req.guest_notes.is_none());
        assert_eq!(req.check_in, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let req = CreateBookingRequest {
            property_id: Uuid::nil(),
            check_in: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            guest_count: 2,
            guest_notes: Some("   ".to_string()),
        };
        let guest = Uuid::new_v4();
        let booking = req.into_booking_request(guest);
        assert_eq!(booking.guest_id, guest);
        assert!(booking.notes.is_none());
    }

    #[test]
    fn test_status_update_rejects_unknown_status() {
        let result: Result<UpdateBookingStatusRequest, _> =
            serde_json::from_value(serde_json::json!({ "status": "archived" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_host_query_page_is_clamped() {
        let query = HostBookingsQuery {
            status: None,
            property_id: None,
            limit: 10_000,
            offset: -5,
        };
        assert_eq!(query.page(), (100, 0));
    }
}
