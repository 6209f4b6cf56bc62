//! Database models for the booking engine.
//!
//! Rows are read with sqlx's `FromRow`; status columns are plain `TEXT` in
//! Postgres and converted into closed enums on the way in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::calculators::Quote;

/// Listing status of a property, toggled by its host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Vacant,
    Occupied,
    Unlisted,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Vacant => "vacant",
            PropertyStatus::Occupied => "occupied",
            PropertyStatus::Unlisted => "unlisted",
        }
    }

    /// Unlisted properties cannot be booked or found through search
    pub fn is_bookable(&self) -> bool {
        !matches!(self, PropertyStatus::Unlisted)
    }
}

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Active bookings hold their nights against the property calendar
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// Error for status text that is not part of a closed status set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} status '{value}'")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for PropertyStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vacant" => Ok(PropertyStatus::Vacant),
            "occupied" => Ok(PropertyStatus::Occupied),
            "unlisted" => Ok(PropertyStatus::Unlisted),
            other => Err(UnknownStatus {
                kind: "property",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(UnknownStatus {
                kind: "booking",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for PropertyStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property from the properties table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Property {
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub city: String,
    pub nightly_price_cents: i64,
    pub max_guests: i32,
    pub bedrooms: i32,
    #[sqlx(try_from = "String")]
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking from the bookings table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: i32,
    pub nights: i32,
    pub total_cents: i64,
    pub platform_fee_cents: i64,
    pub host_payout_cents: i64,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub cancellation_reason: Option<String>,
    pub guest_notes: Option<String>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Price breakdown recorded on the booking
    pub fn quote(&self) -> Quote {
        Quote {
            nights: self.nights,
            total_cents: self.total_cents,
            platform_fee_cents: self.platform_fee_cents,
            host_payout_cents: self.host_payout_cents,
        }
    }
}

/// Booking row joined with its property, as listed to hosts
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HostBooking {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub booking: Booking,
    pub property_title: String,
}

/// A booking about to be inserted, with its quote already computed
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: i32,
    pub nights: i32,
    pub total_cents: i64,
    pub platform_fee_cents: i64,
    pub host_payout_cents: i64,
    pub status: BookingStatus,
    pub guest_notes: Option<String>,
    pub payment_reference: Option<String>,
}

/// Range of nights held on a property's calendar
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlockedRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
}

/// Aggregate booking figures for a host's dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct HostStats {
    pub pending_bookings: i64,
    pub active_bookings: i64,
    pub total_earnings_cents: i64,
    pub upcoming_check_ins: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_parses_its_own_text() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "archived".parse::<BookingStatus>().unwrap_err();
        assert_eq!(err.kind, "booking");
        assert!(err.to_string().contains("archived"));

        assert!("Vacant".parse::<PropertyStatus>().is_err());
    }

    #[test]
    fn test_only_pending_and_confirmed_are_active() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
        assert!(!BookingStatus::Completed.is_active());
    }

    #[test]
    fn test_unlisted_property_is_not_bookable() {
        assert!(PropertyStatus::Vacant.is_bookable());
        assert!(PropertyStatus::Occupied.is_bookable());
        assert!(!PropertyStatus::Unlisted.is_bookable());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&BookingStatus::Confirmed).unwrap();
        assert_eq!(json, "\"confirmed\"");
        let parsed: PropertyStatus = serde_json::from_str("\"unlisted\"").unwrap();
        assert_eq!(parsed, PropertyStatus::Unlisted);
    }
}
