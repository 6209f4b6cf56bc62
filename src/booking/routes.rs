//! Booking and payment route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::caller::Caller;
use crate::config::PaymentMode;
use crate::error::{AppError, Result};
use crate::AppState;

use super::models::{Booking, HostBooking, HostStats};
use super::queries;
use super::requests::{
    ConfirmPaymentRequest, CreateBookingRequest, HostBookingsQuery, UpdateBookingStatusRequest,
};
use super::responses::{
    BookingResponse, CalendarResponse, CheckoutResponse, HostBookingListResponse, QuoteResponse,
};
use super::services::{self, BookingRequest, Payment};
use super::store::PgBookingStore;

/// Booking and payment routes, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/stats", get(booking_stats))
        .route("/bookings/calendar/:property_id", get(booking_calendar))
        .route("/bookings/:id", get(get_booking).patch(update_booking))
        .route("/payments/checkout", post(checkout))
        .route("/payments/confirm", post(confirm_payment))
}

/// Run the booking orchestrator in one transaction and commit on success
async fn book(state: &AppState, request: BookingRequest, payment: Payment) -> Result<Booking> {
    let mut store = PgBookingStore::begin(&state.db).await?;
    let booking = services::request_booking(&mut store, &state.fees, request, payment).await?;
    store.commit().await?;
    Ok(booking)
}

/// Guest books a stay; host confirms later
async fn create_booking(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse<Booking>>)> {
    let booking = book(&state, req.into_booking_request(caller.user_id), Payment::Deferred).await?;
    Ok((StatusCode::CREATED, Json(BookingResponse { booking })))
}

/// Bookings on the caller's properties
async fn list_bookings(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<HostBookingsQuery>,
) -> Result<Json<HostBookingListResponse>> {
    let filter = query.filter();
    let (limit, offset) = query.page();

    let bookings = queries::list_host_bookings(&state.db, caller.user_id, &filter, limit, offset).await?;
    let total = queries::count_host_bookings(&state.db, caller.user_id, &filter).await?;

    Ok(Json(HostBookingListResponse {
        bookings,
        total,
        limit,
        offset,
    }))
}

async fn get_booking(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse<HostBooking>>> {
    let booking = queries::get_host_booking(&state.db, caller.user_id, id).await?;
    Ok(Json(BookingResponse { booking }))
}

/// Host confirms, completes or cancels a booking
async fn update_booking(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> Result<Json<BookingResponse<Booking>>> {
    let mut store = PgBookingStore::begin(&state.db).await?;
    let booking = services::transition_booking(
        &mut store,
        caller.user_id,
        id,
        req.status,
        req.cancellation_reason,
    )
    .await?;
    store.commit().await?;

    Ok(Json(BookingResponse { booking }))
}

async fn booking_stats(State(state): State<AppState>, caller: Caller) -> Result<Json<HostStats>> {
    let today = Utc::now().date_naive();
    let stats = queries::host_stats(&state.db, caller.user_id, today).await?;
    Ok(Json(stats))
}

/// Public calendar of held nights for a property
async fn booking_calendar(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<CalendarResponse>> {
    let today = Utc::now().date_naive();
    let blocked_dates = queries::blocked_dates(&state.db, property_id, today).await?;
    Ok(Json(CalendarResponse { blocked_dates }))
}

/// Checkout: confirm immediately in simulation mode, otherwise quote the
/// amount for the external processor
async fn checkout(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<CheckoutResponse>> {
    match state.payment_mode {
        PaymentMode::Simulation => {
            let booking = book(&state, req.into_booking_request(caller.user_id), Payment::Simulated).await?;
            let quote: QuoteResponse = booking.quote().into();
            Ok(Json(CheckoutResponse::Simulation {
                booking,
                quote,
                message: "Booking confirmed (payment simulation, no processor configured)",
            }))
        }
        PaymentMode::External => {
            // Quote only; the transaction is rolled back on drop
            let mut store = PgBookingStore::begin(&state.db).await?;
            let priced = services::quote_booking(
                &mut store,
                &state.fees,
                req.property_id,
                req.check_in,
                req.check_out,
                req.guest_count,
            )
            .await?;

            Ok(Json(CheckoutResponse::External {
                quote: priced.quote.into(),
                property_title: priced.property.title,
                nightly_price_cents: priced.property.nightly_price_cents,
            }))
        }
    }
}

/// Record a booking whose payment the external processor captured
async fn confirm_payment(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<(StatusCode, Json<BookingResponse<Booking>>)> {
    let (reference, request) = req.into_parts(caller.user_id);
    if reference.trim().is_empty() {
        return Err(AppError::BadRequest("payment_reference is required".to_string()));
    }
    let booking = book(&state, request, Payment::Captured { reference }).await?;
    Ok((StatusCode::CREATED, Json(BookingResponse { booking })))
}
