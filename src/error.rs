//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::booking::{BookingError, StoreError};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(&'static str),

    #[error("{0}")]
    Booking(#[from] BookingError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Booking(err.into())
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: &'static str,
    pub message: String,
}

impl AppError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AppError::Booking(err) => {
                let status = match err {
                    BookingError::PropertyUnavailable(_) | BookingError::NotFound => {
                        StatusCode::NOT_FOUND
                    }
                    BookingError::InvalidDateRange { .. }
                    | BookingError::GuestCountInvalid { .. }
                    | BookingError::PriceOutOfRange { .. }
                    | BookingError::InvalidStatusTransition { .. } => StatusCode::BAD_REQUEST,
                    BookingError::DatesUnavailable
                    | BookingError::ConflictOnCommit
                    | BookingError::PaymentAlreadyRecorded => StatusCode::CONFLICT,
                    BookingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code())
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        // Server faults are logged here and hidden from the client
        let message = if status.is_server_error() {
            tracing::error!("{}: {}", error_type, self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                error_type,
                message,
            }),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
