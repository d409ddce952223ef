//! Core data models for the ERP calculation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod calculation_result;
mod payment;
mod policy;
mod user;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, ComplianceReport, CourseCompliance, FeeTotals,
    PolicyStatus,
};
pub use payment::{FeeCategory, PaymentMethod, PaymentStatus, PaymentStructure, StudentPayment};
pub use policy::{AttendancePolicy, ConsequenceType, CourseContext, PolicyScope};
pub use user::{ProfileIdentity, UserProfile, UserRole};
