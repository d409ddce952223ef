//! Response types for the ERP calculation engine API.
//!
//! This module defines the success bodies that have no counterpart in
//! [`crate::models`], the error response structure, and the mapping from
//! [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{AttendanceCalculation, AttendanceProjection, AttendanceTally};
use crate::error::EngineError;
use crate::models::{FeeTotals, PaymentMethod, StudentPayment};

/// Response body for `POST /attendance/compute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceReport {
    /// Current attendance figures.
    pub calculation: AttendanceCalculation,
    /// Projection over the remaining classes, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<AttendanceProjection>,
}

/// Response body for `POST /attendance/tally`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TallyReport {
    /// Counts derived from the records.
    pub tally: AttendanceTally,
    /// Attendance figures computed from the counts.
    pub calculation: AttendanceCalculation,
}

/// One entry in the `GET /payments/methods` listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodInfo {
    /// The method.
    pub method: PaymentMethod,
    /// Display name.
    pub name: String,
    /// Processing fee percentage.
    pub fee_percent: Decimal,
}

/// Response body for `GET /payments/methods`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodsResponse {
    /// Methods currently offered, in display order.
    pub methods: Vec<PaymentMethodInfo>,
}

/// Response body for `GET /students/:id/payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentPaymentsResponse {
    /// The student the payments belong to.
    pub student_id: String,
    /// Payments with status refreshed as of today.
    pub payments: Vec<StudentPayment>,
    /// Totals over `payments`.
    pub totals: FeeTotals,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::InvalidInput { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "VALIDATION_ERROR",
                    message,
                    format!("The field '{}' was rejected", field),
                ),
            ),
            EngineError::InvalidPolicy { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_POLICY",
                    message,
                    "Thresholds must lie in 0..=100 with critical <= minimum <= warning",
                ),
            ),
            EngineError::PolicyNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("POLICY_NOT_FOUND", message),
            ),
            EngineError::UnknownPaymentMethod { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "UNKNOWN_PAYMENT_METHOD",
                    message,
                    "See GET /payments/methods for the methods on offer",
                ),
            ),
            EngineError::FeeStructureNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("FEE_STRUCTURE_NOT_FOUND", message),
            ),
            EngineError::PaymentNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("PAYMENT_NOT_FOUND", message),
            ),
            EngineError::DuplicateAttendanceRecord { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("DUPLICATE_ATTENDANCE_RECORD", message),
            ),
            EngineError::Overpayment { outstanding, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "OVERPAYMENT",
                    message,
                    format!("At most {} can be recorded", outstanding),
                ),
            ),
            EngineError::StorageError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("STORAGE_ERROR", message),
            ),
            EngineError::CalculationError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
        };

        ApiErrorResponse { status, error }
    }
}
