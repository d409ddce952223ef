//! Calculation logic for the ERP calculation engine.
//!
//! This module contains all the calculation functions behind the campus
//! dashboards: attendance percentages and projections, tallies of daily
//! attendance records, attendance policy evaluation per course and per
//! student, payment totals including gateway processing fees, and fee
//! obligation bookkeeping.

mod attendance;
mod attendance_tally;
mod compliance;
mod payment_status;
mod payment_summary;
mod payment_total;
mod policy;

pub use attendance::{
    AttendanceCalculation, AttendanceLevel, AttendanceProjection, WARNING_MARGIN,
    attendance_percentage, classify_attendance, compute_attendance, project_attendance,
};
pub use attendance_tally::{AttendanceTally, records_for_subject, tally_records};
pub use compliance::evaluate_student;
pub use payment_status::{
    PaymentApplication, apply_payment, assess_late_fee, derive_payment_status,
    new_student_payment, outstanding_balance, validate_payment,
};
pub use payment_summary::summarize_payments;
pub use payment_total::{
    CURRENCY_SCALE, PaymentQuote, quote_payment, resolve_payment_total, round_currency,
};
pub use policy::{
    PolicyEvaluation, applicable_policies, evaluate_policy, policy_applies,
    select_governing_policy,
};
