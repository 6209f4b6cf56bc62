//! Booking engine for the Nestora marketplace.
//!
//! Decides whether a stay can be booked, prices it, and walks bookings
//! through their status lifecycle. Storage goes through the
//! [`BookingStore`] seam so every gate and the final write share one
//! transaction.

pub mod calculators;
pub mod lifecycle;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod store;

// Re-export commonly used items
pub use calculators::{compute_quote, round_cents, FeePolicy, Quote, StayDates};
pub use models::{Booking, BookingStatus, Property, PropertyStatus};
pub use routes::router;
pub use services::{BookingError, BookingRequest, Payment};
pub use store::{BookingStore, PgBookingStore, StoreError};
