//! In-memory [`BookingStore`] for engine tests.
//!
//! Mirrors the Postgres schema's guarantees: inserts that would overlap an
//! active booking fail with [`StoreError::Overlap`], a reused payment
//! reference fails with [`StoreError::DuplicatePayment`], and status updates
//! are compare-and-swap.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::calculators::ranges_overlap;
use super::models::{Booking, BookingStatus, NewBooking, Property, PropertyStatus};
use super::store::{BookingStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub properties: Vec<Property>,
    pub bookings: Vec<Booking>,
    /// Status another writer sets between our read and our update
    pub concurrent_status_change: Option<BookingStatus>,
    /// Booking another writer commits between our check and our insert
    pub concurrent_insert: Option<NewBooking>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_property(&mut self, host_id: Uuid, nightly_price_cents: i64, status: PropertyStatus) -> Uuid {
        let id = Uuid::new_v4();
        self.properties.push(Property {
            id,
            host_id,
            title: format!("Property {}", self.properties.len() + 1),
            city: "Lisbon".to_string(),
            nightly_price_cents,
            max_guests: 4,
            bedrooms: 2,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn add_booking(
        &mut self,
        property_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
        status: BookingStatus,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.bookings.push(Booking {
            id,
            property_id,
            guest_id: Uuid::new_v4(),
            check_in,
            check_out,
            guest_count: 1,
            nights: (check_out - check_in).num_days() as i32,
            total_cents: 0,
            platform_fee_cents: 0,
            host_payout_cents: 0,
            status,
            cancellation_reason: None,
            guest_notes: None,
            payment_reference: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn booking(&self, id: Uuid) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    fn store_booking(&mut self, new: NewBooking) -> Result<Booking, StoreError> {
        let collides = self.bookings.iter().any(|b| {
            b.property_id == new.property_id
                && b.status.is_active()
                && new.status.is_active()
                && ranges_overlap(b.check_in, b.check_out, new.check_in, new.check_out)
        });
        if collides {
            return Err(StoreError::Overlap);
        }
        let reused = new.payment_reference.is_some()
            && self
                .bookings
                .iter()
                .any(|b| b.payment_reference == new.payment_reference);
        if reused {
            return Err(StoreError::DuplicatePayment);
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            property_id: new.property_id,
            guest_id: new.guest_id,
            check_in: new.check_in,
            check_out: new.check_out,
            guest_count: new.guest_count,
            nights: new.nights,
            total_cents: new.total_cents,
            platform_fee_cents: new.platform_fee_cents,
            host_payout_cents: new.host_payout_cents,
            status: new.status,
            cancellation_reason: None,
            guest_notes: new.guest_notes,
            payment_reference: new.payment_reference,
            created_at: now,
            updated_at: now,
        };
        self.bookings.push(booking.clone());
        Ok(booking)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn lock_property(&mut self, property_id: Uuid) -> Result<Option<Property>, StoreError> {
        Ok(self.properties.iter().find(|p| p.id == property_id).cloned())
    }

    async fn list_active_bookings(&mut self, property_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .bookings
            .iter()
            .filter(|b| b.property_id == property_id && b.status.is_active())
            .cloned()
            .collect())
    }

    async fn insert_booking(&mut self, booking: NewBooking) -> Result<Booking, StoreError> {
        if let Some(rival) = self.concurrent_insert.take() {
            self.store_booking(rival)?;
        }
        self.store_booking(booking)
    }

    async fn lock_host_booking(
        &mut self,
        host_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        let booking = self.bookings.iter().find(|b| b.id == booking_id).cloned();
        Ok(booking.filter(|b| {
            self.properties
                .iter()
                .any(|p| p.id == b.property_id && p.host_id == host_id)
        }))
    }

    async fn update_booking_status(
        &mut self,
        booking_id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Option<Booking>, StoreError> {
        let rival = self.concurrent_status_change.take();
        let Some(booking) = self.bookings.iter_mut().find(|b| b.id == booking_id) else {
            return Ok(None);
        };
        if let Some(status) = rival {
            booking.status = status;
        }
        if booking.status != expected {
            return Ok(None);
        }

        booking.status = next;
        if cancellation_reason.is_some() {
            booking.cancellation_reason = cancellation_reason;
        }
        booking.updated_at = Utc::now();
        Ok(Some(booking.clone()))
    }
}
