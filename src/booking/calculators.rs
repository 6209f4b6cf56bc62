//! Core booking calculations.
//!
//! Pure functions for stay validation, overlap detection and quote math -
//! no database access. The SQL side of the overlap rule lives in
//! `queries::push_active_overlap` and must express the same predicate.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Serialize;
use uuid::Uuid;

use super::models::Booking;
use super::services::BookingError;

/// A validated stay: check-in strictly before check-out.
///
/// Dates are half-open, `[check_in, check_out)`: the guest holds the
/// nights from check-in up to, but not including, the check-out day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StayDates {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayDates {
    /// Validate a requested stay. Zero-night and inverted ranges are rejected.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        if check_in >= check_out {
            return Err(BookingError::InvalidDateRange {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Whole nights in the stay, always at least 1.
    pub fn nights(&self) -> i32 {
        // The full NaiveDate range spans far fewer than i32::MAX days.
        (self.check_out - self.check_in).num_days() as i32
    }

    /// Half-open overlap with another stay
    pub fn overlaps(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        ranges_overlap(check_in, check_out, self.check_in, self.check_out)
    }
}

/// Half-open interval overlap: `existing.check_in < new.check_out AND
/// existing.check_out > new.check_in`.
///
/// A checkout on day X never overlaps a check-in on day X.
pub fn ranges_overlap(
    existing_in: NaiveDate,
    existing_out: NaiveDate,
    new_in: NaiveDate,
    new_out: NaiveDate,
) -> bool {
    existing_in < new_out && existing_out > new_in
}

/// Find the first active booking that collides with `stay`.
///
/// Only `pending` and `confirmed` bookings hold nights. `exclude` skips the
/// booking being rescheduled.
pub fn find_conflict<'a>(
    bookings: &'a [Booking],
    stay: &StayDates,
    exclude: Option<Uuid>,
) -> Option<&'a Booking> {
    bookings.iter().find(|b| {
        b.status.is_active()
            && Some(b.id) != exclude
            && stay.overlaps(b.check_in, b.check_out)
    })
}

/// Marketplace fee taken from every booking total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    rate: Decimal,
}

impl FeePolicy {
    pub const DEFAULT_RATE: Decimal = dec!(0.12);

    /// Build a policy from a fractional rate in `[0, 1]`.
    pub fn new(rate: Decimal) -> Result<Self, InvalidFeeRate> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(InvalidFeeRate(rate));
        }
        Ok(Self { rate })
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    /// Platform fee for a total, rounded to whole minor units.
    pub fn platform_fee(&self, total_cents: i64) -> i64 {
        round_cents(Decimal::from(total_cents) * self.rate).clamp(0, total_cents.max(0))
    }
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            rate: Self::DEFAULT_RATE,
        }
    }
}

/// Fee rate outside `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("platform fee rate must be between 0 and 1, got {0}")]
pub struct InvalidFeeRate(pub Decimal);

/// Round to whole minor units, halves away from zero.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use nestora_bookings::booking::round_cents;
///
/// assert_eq!(round_cents(dec!(2.5)), 3);
/// assert_eq!(round_cents(dec!(2.49)), 2);
/// assert_eq!(round_cents(dec!(3600)), 3600);
/// ```
pub fn round_cents(amount: Decimal) -> i64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Price breakdown for a stay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub nights: i32,
    pub total_cents: i64,
    pub platform_fee_cents: i64,
    pub host_payout_cents: i64,
}

/// Compute the quote for a stay at a nightly rate.
///
/// The host payout is the remainder after the fee, so
/// `platform_fee_cents + host_payout_cents == total_cents` always holds.
/// A total that does not fit in `i64` is rejected.
pub fn compute_quote(
    nightly_price_cents: i64,
    stay: &StayDates,
    fees: &FeePolicy,
) -> Result<Quote, BookingError> {
    let nights = stay.nights();
    let total_cents = nightly_price_cents
        .checked_mul(i64::from(nights))
        .filter(|total| *total >= 0)
        .ok_or(BookingError::PriceOutOfRange {
            nightly_price_cents,
            nights,
        })?;
    let platform_fee_cents = fees.platform_fee(total_cents);

    Ok(Quote {
        nights,
        total_cents,
        platform_fee_cents,
        host_payout_cents: total_cents - platform_fee_cents,
    })
}
