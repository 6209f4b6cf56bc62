//! Booking engine operations.
//!
//! Each operation runs against one [`BookingStore`] unit of work and fails
//! fast: every gate is checked before the single write at the end, so a
//! rejected request leaves storage untouched.

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use super::calculators::{compute_quote, find_conflict, FeePolicy, Quote, StayDates};
use super::models::{Booking, BookingStatus, NewBooking, Property};
use super::store::{BookingStore, StoreError};

/// Reasons a booking operation is rejected
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Property {0} is not available for booking")]
    PropertyUnavailable(Uuid),

    #[error("check_out ({check_out}) must be after check_in ({check_in})")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Guest count {requested} must be between 1 and {max_guests}")]
    GuestCountInvalid { requested: i32, max_guests: i32 },

    #[error("Price of {nights} nights at {nightly_price_cents} cents is out of range")]
    PriceOutOfRange {
        nightly_price_cents: i64,
        nights: i32,
    },

    #[error("Property is not available for the selected dates")]
    DatesUnavailable,

    #[error("Payment has already been recorded for another booking")]
    PaymentAlreadyRecorded,

    #[error("Cannot change a {from} booking to {to}")]
    InvalidStatusTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Booking not found")]
    NotFound,

    #[error("Booking was changed by a concurrent request, please retry")]
    ConflictOnCommit,

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl BookingError {
    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::PropertyUnavailable(_) => "PROPERTY_UNAVAILABLE",
            BookingError::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            BookingError::GuestCountInvalid { .. } => "GUEST_COUNT_INVALID",
            BookingError::PriceOutOfRange { .. } => "PRICE_OUT_OF_RANGE",
            BookingError::DatesUnavailable => "DATES_UNAVAILABLE",
            BookingError::PaymentAlreadyRecorded => "PAYMENT_ALREADY_RECORDED",
            BookingError::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            BookingError::NotFound => "NOT_FOUND",
            BookingError::ConflictOnCommit => "CONFLICT_ON_COMMIT",
            BookingError::Store(_) => "STORAGE_ERROR",
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Overlap => BookingError::ConflictOnCommit,
            StoreError::DuplicatePayment => BookingError::PaymentAlreadyRecorded,
            other => BookingError::Store(other),
        }
    }
}

/// A guest's request to stay at a property
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guest_count: i32,
    pub notes: Option<String>,
}

/// What the payment collaborator reported for this booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payment {
    /// Direct booking, host confirms later
    Deferred,
    /// Payment simulated in-process (no processor configured)
    Simulated,
    /// Payment captured by the external processor
    Captured { reference: String },
}

impl Payment {
    fn initial_status(&self) -> BookingStatus {
        match self {
            Payment::Deferred => BookingStatus::Pending,
            Payment::Simulated | Payment::Captured { .. } => BookingStatus::Confirmed,
        }
    }

    fn into_reference(self) -> Option<String> {
        match self {
            Payment::Captured { reference } => Some(reference),
            Payment::Deferred | Payment::Simulated => None,
        }
    }
}

/// A stay that passed every gate, with its price
#[derive(Debug, Clone)]
pub struct PricedStay {
    pub property: Property,
    pub stay: StayDates,
    pub quote: Quote,
}

/// Whether any active booking on the property overlaps `stay`.
pub async fn has_conflict<S: BookingStore + ?Sized>(
    store: &mut S,
    property_id: Uuid,
    stay: &StayDates,
    exclude_booking_id: Option<Uuid>,
) -> Result<bool, BookingError> {
    let bookings = store.list_active_bookings(property_id).await?;
    Ok(find_conflict(&bookings, stay, exclude_booking_id).is_some())
}

/// Run every booking gate and price the stay, without writing.
///
/// Gates, in order:
/// 1. the property exists and is not unlisted
/// 2. check-in is before check-out, and the party fits the property
/// 3. no active booking overlaps the stay
pub async fn quote_booking<S: BookingStore + ?Sized>(
    store: &mut S,
    fees: &FeePolicy,
    property_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guest_count: i32,
) -> Result<PricedStay, BookingError> {
    let property = store
        .lock_property(property_id)
        .await?
        .filter(|p| p.status.is_bookable())
        .ok_or(BookingError::PropertyUnavailable(property_id))?;

    let stay = StayDates::new(check_in, check_out)?;

    if guest_count < 1 || guest_count > property.max_guests {
        return Err(BookingError::GuestCountInvalid {
            requested: guest_count,
            max_guests: property.max_guests,
        });
    }

    if has_conflict(store, property_id, &stay, None).await? {
        return Err(BookingError::DatesUnavailable);
    }

    let quote = compute_quote(property.nightly_price_cents, &stay, fees)?;

    Ok(PricedStay {
        property,
        stay,
        quote,
    })
}

/// Create a booking for a guest.
///
/// Stays `pending` for direct bookings and starts `confirmed` when payment
/// was simulated or captured.
pub async fn request_booking<S: BookingStore + ?Sized>(
    store: &mut S,
    fees: &FeePolicy,
    request: BookingRequest,
    payment: Payment,
) -> Result<Booking, BookingError> {
    let priced = quote_booking(
        store,
        fees,
        request.property_id,
        request.check_in,
        request.check_out,
        request.guest_count,
    )
    .await?;

    let new_booking = NewBooking {
        property_id: priced.property.id,
        guest_id: request.guest_id,
        check_in: priced.stay.check_in(),
        check_out: priced.stay.check_out(),
        guest_count: request.guest_count,
        nights: priced.quote.nights,
        total_cents: priced.quote.total_cents,
        platform_fee_cents: priced.quote.platform_fee_cents,
        host_payout_cents: priced.quote.host_payout_cents,
        status: payment.initial_status(),
        guest_notes: request.notes,
        payment_reference: payment.into_reference(),
    };

    let booking = store.insert_booking(new_booking).await?;

    info!(
        booking_id = %booking.id,
        property_id = %booking.property_id,
        status = %booking.status,
        nights = booking.nights,
        total_cents = booking.total_cents,
        "Booking created"
    );

    Ok(booking)
}

/// Apply a host's status change to a booking on one of their properties.
pub async fn transition_booking<S: BookingStore + ?Sized>(
    store: &mut S,
    host_id: Uuid,
    booking_id: Uuid,
    next: BookingStatus,
    cancellation_reason: Option<String>,
) -> Result<Booking, BookingError> {
    let booking = store
        .lock_host_booking(host_id, booking_id)
        .await?
        .ok_or(BookingError::NotFound)?;

    let next = booking.status.transition_to(next).map_err(|e| {
        warn!(booking_id = %booking_id, "Rejected status change: {}", e);
        e
    })?;

    let reason = cancellation_reason.filter(|_| next == BookingStatus::Cancelled);

    let updated = store
        .update_booking_status(booking_id, booking.status, next, reason)
        .await?
        .ok_or(BookingError::ConflictOnCommit)?;

    info!(
        booking_id = %booking_id,
        from = %booking.status,
        to = %updated.status,
        "Booking status changed"
    );

    Ok(updated)
}
