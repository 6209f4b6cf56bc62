//! Database queries for the booking engine.
//!
//! Functions taking `&mut PgConnection` run inside the caller's transaction;
//! functions taking `&PgPool` are standalone reads.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppError;

use super::calculators::StayDates;
use super::models::{
    BlockedRange, Booking, BookingStatus, HostBooking, HostStats, NewBooking, Property,
};

/// Append the active-overlap predicate for bookings aliased as `b`.
///
/// `b.status IN ('pending', 'confirmed') AND b.check_in < $check_out AND
/// b.check_out > $check_in`. Every SQL availability test goes through here
/// so it matches `calculators::ranges_overlap`.
pub fn push_active_overlap(qb: &mut QueryBuilder<'_, Postgres>, stay: &StayDates) {
    let [check_out, check_in] = overlap_binds(stay);
    qb.push("b.status IN ('pending', 'confirmed') AND b.check_in < ")
        .push_bind(check_out)
        .push(" AND b.check_out > ")
        .push_bind(check_in);
}

/// Values bound by [`push_active_overlap`], in placeholder order
fn overlap_binds(stay: &StayDates) -> [NaiveDate; 2] {
    [stay.check_out(), stay.check_in()]
}

/// Lock a property row for the rest of the transaction
pub async fn lock_property(
    conn: &mut PgConnection,
    property_id: Uuid,
) -> Result<Option<Property>, sqlx::Error> {
    sqlx::query_as::<_, Property>(
        r#"
        SELECT
            id, host_id, title, city, nightly_price_cents,
            max_guests, bedrooms, status, created_at, updated_at
        FROM properties
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(property_id)
    .fetch_optional(conn)
    .await
}

/// All pending and confirmed bookings for a property
pub async fn list_active_bookings(
    conn: &mut PgConnection,
    property_id: Uuid,
) -> Result<Vec<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT b.*
        FROM bookings b
        WHERE b.property_id = $1
          AND b.status IN ('pending', 'confirmed')
        ORDER BY b.check_in
        "#,
    )
    .bind(property_id)
    .fetch_all(conn)
    .await
}

/// Insert a booking with its computed quote
pub async fn insert_booking(
    conn: &mut PgConnection,
    booking: &NewBooking,
) -> Result<Booking, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (
            id, property_id, guest_id, check_in, check_out, guest_count,
            nights, total_cents, platform_fee_cents, host_payout_cents,
            status, guest_notes, payment_reference, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW(), NOW())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(booking.property_id)
    .bind(booking.guest_id)
    .bind(booking.check_in)
    .bind(booking.check_out)
    .bind(booking.guest_count)
    .bind(booking.nights)
    .bind(booking.total_cents)
    .bind(booking.platform_fee_cents)
    .bind(booking.host_payout_cents)
    .bind(booking.status.as_str())
    .bind(booking.guest_notes.as_deref())
    .bind(booking.payment_reference.as_deref())
    .fetch_one(conn)
    .await
}

/// Lock a booking on one of the host's properties
pub async fn lock_host_booking(
    conn: &mut PgConnection,
    host_id: Uuid,
    booking_id: Uuid,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        SELECT b.*
        FROM bookings b
        JOIN properties p ON b.property_id = p.id
        WHERE b.id = $1
          AND p.host_id = $2
        FOR UPDATE OF b
        "#,
    )
    .bind(booking_id)
    .bind(host_id)
    .fetch_optional(conn)
    .await
}

/// Compare-and-swap a booking's status.
///
/// Returns `None` when the booking is no longer in `expected`.
pub async fn update_booking_status(
    conn: &mut PgConnection,
    booking_id: Uuid,
    expected: BookingStatus,
    next: BookingStatus,
    cancellation_reason: Option<&str>,
) -> Result<Option<Booking>, sqlx::Error> {
    sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = $1,
            cancellation_reason = COALESCE($2, cancellation_reason),
            updated_at = NOW()
        WHERE id = $3
          AND status = $4
        RETURNING *
        "#,
    )
    .bind(next.as_str())
    .bind(cancellation_reason)
    .bind(booking_id)
    .bind(expected.as_str())
    .fetch_optional(conn)
    .await
}

/// Filters for a host's booking list
#[derive(Debug, Clone, Default)]
pub struct HostBookingFilter {
    pub status: Option<BookingStatus>,
    pub property_id: Option<Uuid>,
}

fn push_host_scope(qb: &mut QueryBuilder<'_, Postgres>, host_id: Uuid, filter: &HostBookingFilter) {
    qb.push(" WHERE p.host_id = ").push_bind(host_id);
    if let Some(status) = filter.status {
        qb.push(" AND b.status = ").push_bind(status.as_str());
    }
    if let Some(property_id) = filter.property_id {
        qb.push(" AND b.property_id = ").push_bind(property_id);
    }
}

/// Bookings on the host's properties, newest first
pub async fn list_host_bookings(
    pool: &PgPool,
    host_id: Uuid,
    filter: &HostBookingFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<HostBooking>, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT b.*, p.title AS property_title FROM bookings b JOIN properties p ON b.property_id = p.id",
    );
    push_host_scope(&mut qb, host_id, filter);
    qb.push(" ORDER BY b.created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let bookings = qb.build_query_as::<HostBooking>().fetch_all(pool).await?;
    Ok(bookings)
}

/// Count bookings on the host's properties (for pagination)
pub async fn count_host_bookings(
    pool: &PgPool,
    host_id: Uuid,
    filter: &HostBookingFilter,
) -> Result<i64, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM bookings b JOIN properties p ON b.property_id = p.id",
    );
    push_host_scope(&mut qb, host_id, filter);

    let count = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(count)
}

/// A single booking on one of the host's properties
pub async fn get_host_booking(
    pool: &PgPool,
    host_id: Uuid,
    booking_id: Uuid,
) -> Result<HostBooking, AppError> {
    sqlx::query_as::<_, HostBooking>(
        r#"
        SELECT b.*, p.title AS property_title
        FROM bookings b
        JOIN properties p ON b.property_id = p.id
        WHERE b.id = $1
          AND p.host_id = $2
        "#,
    )
    .bind(booking_id)
    .bind(host_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

/// Dashboard figures across all of the host's properties
pub async fn host_stats(pool: &PgPool, host_id: Uuid, today: NaiveDate) -> Result<HostStats, AppError> {
    let stats = sqlx::query_as::<_, HostStats>(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE b.status = 'pending') AS pending_bookings,
            COUNT(*) FILTER (WHERE b.status = 'confirmed') AS active_bookings,
            COALESCE(
                SUM(b.host_payout_cents) FILTER (WHERE b.status IN ('confirmed', 'completed')),
                0
            )::BIGINT AS total_earnings_cents,
            COUNT(*) FILTER (WHERE b.status = 'confirmed' AND b.check_in >= $2) AS upcoming_check_ins
        FROM bookings b
        JOIN properties p ON b.property_id = p.id
        WHERE p.host_id = $1
        "#,
    )
    .bind(host_id)
    .bind(today)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Active stays that still occupy the property calendar
pub async fn blocked_dates(
    pool: &PgPool,
    property_id: Uuid,
    today: NaiveDate,
) -> Result<Vec<BlockedRange>, AppError> {
    let ranges = sqlx::query_as::<_, BlockedRange>(
        r#"
        SELECT check_in, check_out, status
        FROM bookings
        WHERE property_id = $1
          AND status IN ('pending', 'confirmed')
          AND check_out >= $2
        ORDER BY check_in
        "#,
    )
    .bind(property_id)
    .bind(today)
    .fetch_all(pool)
    .await?;

    Ok(ranges)
}
