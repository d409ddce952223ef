//! Calculation result models for the ERP calculation engine.
//!
//! This module contains the audit types shared by every calculation, the
//! [`ComplianceReport`] produced for a student across all of their courses,
//! and the [`FeeTotals`] aggregate used by the finance views.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ConsequenceType;

/// Compliance of a student with the policy governing one course.
///
/// Variants are ordered from best to worst so the overall standing of a
/// student is the maximum over their courses.
///
/// # Example
///
/// ```
/// use erp_engine::models::PolicyStatus;
///
/// assert!(PolicyStatus::Critical > PolicyStatus::Warning);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    /// At or above the warning threshold.
    Compliant,
    /// At or above the minimum but below the warning threshold.
    Warning,
    /// Below the minimum but at or above the critical threshold.
    Shortage,
    /// Below the critical threshold.
    Critical,
}

impl PolicyStatus {
    /// Returns the snake_case name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Compliant => "compliant",
            PolicyStatus::Warning => "warning",
            PolicyStatus::Shortage => "shortage",
            PolicyStatus::Critical => "critical",
        }
    }

    /// Returns true if the policy's consequence is triggered.
    pub fn triggers_consequence(&self) -> bool {
        matches!(self, PolicyStatus::Shortage | PolicyStatus::Critical)
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The policy or fee schedule the rule came from, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_ref: Option<String>,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate potential issues that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use erp_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The outcome for one course inside a [`ComplianceReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseCompliance {
    /// The course that was evaluated.
    pub course_id: String,
    /// The resulting status.
    pub status: PolicyStatus,
    /// The ID of the governing policy, if any applied.
    pub governing_policy_id: Option<String>,
    /// Attendance percentage after exemptions and grace, 2 dp.
    pub percentage: Decimal,
    /// Classes still needed to reach the governing minimum.
    pub classes_needed: Option<u32>,
    /// Consequence triggered by the status, if any.
    pub consequence: Option<ConsequenceType>,
}

/// A student's attendance compliance across all of their courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Unique identifier for this report.
    pub report_id: Uuid,
    /// When the report was produced.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that produced the report.
    pub engine_version: String,
    /// The student the report is for.
    pub student_id: String,
    /// One entry per evaluated course, in input order.
    pub courses: Vec<CourseCompliance>,
    /// The worst status across all courses.
    pub overall_status: PolicyStatus,
    /// Complete audit trace of evaluation decisions.
    pub audit_trace: AuditTrace,
}

impl ComplianceReport {
    /// Returns the courses whose status triggers a consequence.
    pub fn courses_with_consequences(&self) -> impl Iterator<Item = &CourseCompliance> {
        self.courses.iter().filter(|c| c.consequence.is_some())
    }
}

/// Aggregated totals over a set of student payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTotals {
    /// Sum of base amounts billed.
    pub total_billed: Decimal,
    /// Sum of late fees attached.
    pub late_fees: Decimal,
    /// Sum of amounts paid.
    pub total_collected: Decimal,
    /// Sum of balances still owed.
    pub total_outstanding: Decimal,
    /// Number of pending payments.
    pub pending_count: u32,
    /// Number of partially paid payments.
    pub partial_count: u32,
    /// Number of settled payments.
    pub paid_count: u32,
    /// Number of overdue payments.
    pub overdue_count: u32,
}
