//! Request types for the ERP calculation engine API.
//!
//! This module defines the JSON request bodies accepted by the attendance,
//! compliance and payment endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AttendancePolicy, AttendanceRecord, CourseContext, UserProfile};

/// Request body for `POST /attendance/compute`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceComputeRequest {
    /// Classes held so far.
    pub total_classes: u32,
    /// Classes attended so far.
    pub attended_classes: u32,
    /// Required percentage; the institution default when omitted.
    #[serde(default)]
    pub required_percentage: Option<Decimal>,
    /// Classes still to be held; adds a projection when present.
    #[serde(default)]
    pub remaining_classes: Option<u32>,
}

/// Request body for `POST /attendance/tally`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceTallyRequest {
    /// Daily attendance records.
    pub records: Vec<AttendanceRecord>,
    /// Only count records for this subject.
    #[serde(default)]
    pub subject: Option<String>,
    /// Required percentage; the institution default when omitted.
    #[serde(default)]
    pub required_percentage: Option<Decimal>,
}

/// Request body for `POST /attendance/evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyEvaluationRequest {
    /// The student's standing in the course.
    pub course: CourseContext,
    /// Policies to evaluate against; the configured ones when omitted.
    #[serde(default)]
    pub policies: Option<Vec<AttendancePolicy>>,
}

/// Request body for `POST /students/compliance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentComplianceRequest {
    /// The student being evaluated.
    pub student: UserProfile,
    /// One entry per enrolled course.
    pub courses: Vec<CourseContext>,
    /// Policies to evaluate against; the configured ones when omitted.
    #[serde(default)]
    pub policies: Option<Vec<AttendancePolicy>>,
}

/// Request body for `POST /payments/quote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentQuoteRequest {
    /// Base fee amount.
    pub amount: Decimal,
    /// Payment method identifier (e.g., "card", "netbanking").
    pub method: String,
}

/// Request body for `POST /payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    /// The student who owes the fee.
    pub student_id: String,
    /// The fee structure to bill.
    pub structure_id: String,
    /// Identifier for the new payment; generated when omitted.
    #[serde(default)]
    pub id: Option<String>,
}

/// Request body for `POST /payments/:id/record`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    /// Amount received, before any gateway fee.
    pub amount: Decimal,
    /// Date the payment was received; today when omitted.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}
