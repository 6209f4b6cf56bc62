//! Storage seam for the booking engine.
//!
//! The engine runs against a [`BookingStore`] unit of work. The Postgres
//! implementation wraps one transaction: locks taken through it hold until
//! [`PgBookingStore::commit`], and dropping it without committing rolls
//! everything back.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::models::{Booking, BookingStatus, NewBooking, Property};
use super::queries;

/// SQLSTATE for `exclusion_violation`
const EXCLUSION_VIOLATION: &str = "23P01";
/// SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";
/// Partial unique index over recorded payment references
const PAYMENT_REFERENCE_KEY: &str = "bookings_payment_reference_key";

/// Storage failure seen by the engine
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("an overlapping active booking was committed first")]
    Overlap,

    #[error("payment reference already belongs to a booking")]
    DuplicatePayment,

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db) = err.as_database_error() {
            match db.code().as_deref() {
                Some(EXCLUSION_VIOLATION) => return StoreError::Overlap,
                Some(UNIQUE_VIOLATION) if db.constraint() == Some(PAYMENT_REFERENCE_KEY) => {
                    return StoreError::DuplicatePayment
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Property and booking access used by the booking engine
#[async_trait]
pub trait BookingStore: Send {
    /// Fetch a property, holding it against concurrent bookings until the
    /// unit of work ends.
    async fn lock_property(&mut self, property_id: Uuid) -> Result<Option<Property>, StoreError>;

    /// Pending and confirmed bookings for a property
    async fn list_active_bookings(&mut self, property_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    async fn insert_booking(&mut self, booking: NewBooking) -> Result<Booking, StoreError>;

    /// Fetch a booking only if it sits on a property owned by `host_id`
    async fn lock_host_booking(
        &mut self,
        host_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Option<Booking>, StoreError>;

    /// Move a booking from `expected` to `next`; `None` if `expected` no
    /// longer holds.
    async fn update_booking_status(
        &mut self,
        booking_id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Option<Booking>, StoreError>;
}

/// [`BookingStore`] over a single Postgres transaction
pub struct PgBookingStore {
    tx: Transaction<'static, Postgres>,
}

impl PgBookingStore {
    pub async fn begin(pool: &PgPool) -> Result<Self, StoreError> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn lock_property(&mut self, property_id: Uuid) -> Result<Option<Property>, StoreError> {
        Ok(queries::lock_property(&mut self.tx, property_id).await?)
    }

    async fn list_active_bookings(&mut self, property_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        Ok(queries::list_active_bookings(&mut self.tx, property_id).await?)
    }

    async fn insert_booking(&mut self, booking: NewBooking) -> Result<Booking, StoreError> {
        Ok(queries::insert_booking(&mut self.tx, &booking).await?)
    }

    async fn lock_host_booking(
        &mut self,
        host_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(queries::lock_host_booking(&mut self.tx, host_id, booking_id).await?)
    }

    async fn update_booking_status(
        &mut self,
        booking_id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(queries::update_booking_status(
            &mut self.tx,
            booking_id,
            expected,
            next,
            cancellation_reason.as_deref(),
        )
        .await?)
    }
}
