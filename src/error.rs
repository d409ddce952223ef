//! Error types for the ERP calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every error condition that can occur while computing attendance,
//! evaluating policies or settling fee obligations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the ERP calculation engine.
///
/// All fallible operations in the engine return this error type, making it
/// easy to surface failures consistently to callers.
///
/// # Example
///
/// ```
/// use erp_engine::error::EngineError;
///
/// let error = EngineError::UnknownPaymentMethod {
///     method: "cheque".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown payment method: cheque");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A numeric or structural input was out of range.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The input field that was rejected.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// An attendance policy carried inconsistent thresholds.
    #[error("Invalid policy '{policy_id}': {message}")]
    InvalidPolicy {
        /// The ID of the invalid policy.
        policy_id: String,
        /// A description of what made the policy invalid.
        message: String,
    },

    /// No attendance policy exists with the given ID.
    #[error("Policy not found: {id}")]
    PolicyNotFound {
        /// The policy ID that was not found.
        id: String,
    },

    /// The payment method identifier is not supported.
    #[error("Unknown payment method: {method}")]
    UnknownPaymentMethod {
        /// The method identifier that was supplied.
        method: String,
    },

    /// No fee structure exists with the given ID.
    #[error("Fee structure not found: {id}")]
    FeeStructureNotFound {
        /// The fee structure ID that was not found.
        id: String,
    },

    /// No student payment exists with the given ID.
    #[error("Payment not found: {id}")]
    PaymentNotFound {
        /// The payment ID that was not found.
        id: String,
    },

    /// Two attendance records share the same date and subject.
    #[error("Duplicate attendance record for {date} ({subject})")]
    DuplicateAttendanceRecord {
        /// The date that appears more than once.
        date: NaiveDate,
        /// The subject of the duplicated record, or "general" when untagged.
        subject: String,
    },

    /// A payment would push the paid amount beyond what is owed.
    #[error("Overpayment on '{payment_id}': {attempted} exceeds outstanding balance {outstanding}")]
    Overpayment {
        /// The ID of the payment being settled.
        payment_id: String,
        /// The amount the caller tried to apply.
        attempted: Decimal,
        /// The balance that was still owed.
        outstanding: Decimal,
    },

    /// The payment store could not be read or written.
    #[error("Storage error: {message}")]
    StorageError {
        /// A description of the storage failure.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
