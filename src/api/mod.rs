//! HTTP API module for the ERP calculation engine.
//!
//! This module provides the REST API endpoints for attendance calculation,
//! policy compliance, payment quotes and fee obligation tracking.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AttendanceComputeRequest, AttendanceTallyRequest, CreatePaymentRequest, PaymentQuoteRequest,
    PolicyEvaluationRequest, RecordPaymentRequest, StudentComplianceRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, AttendanceReport, PaymentMethodInfo, PaymentMethodsResponse,
    StudentPaymentsResponse, TallyReport,
};
pub use state::AppState;
