//! Response DTOs for booking and payment endpoints.

use serde::Serialize;

use super::calculators::Quote;
use super::models::{BlockedRange, Booking, HostBooking};

/// A single booking
#[derive(Debug, Serialize)]
pub struct BookingResponse<B: Serialize> {
    pub booking: B,
}

/// A page of a host's bookings
#[derive(Debug, Serialize)]
pub struct HostBookingListResponse {
    pub bookings: Vec<HostBooking>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Nights still held on a property's calendar
#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub blocked_dates: Vec<BlockedRange>,
}

/// Price breakdown returned to the guest at checkout
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub amount_cents: i64,
    pub platform_fee_cents: i64,
    pub host_payout_cents: i64,
    pub nights: i32,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            amount_cents: quote.total_cents,
            platform_fee_cents: quote.platform_fee_cents,
            host_payout_cents: quote.host_payout_cents,
            nights: quote.nights,
        }
    }
}

/// Checkout outcome, by payment mode
#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CheckoutResponse {
    /// Booking confirmed without a processor
    Simulation {
        booking: Booking,
        #[serde(flatten)]
        quote: QuoteResponse,
        message: &'static str,
    },
    /// Pay this amount through the external processor, then confirm
    External {
        #[serde(flatten)]
        quote: QuoteResponse,
        property_title: String,
        nightly_price_cents: i64,
    },
}
