//! HTTP request handlers for the ERP calculation engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    PaymentQuote, apply_payment, assess_late_fee, compute_attendance, derive_payment_status,
    evaluate_policy, evaluate_student, new_student_payment, project_attendance, quote_payment,
    records_for_subject, summarize_payments, tally_records,
};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{PaymentMethod, StudentPayment};

use super::request::{
    AttendanceComputeRequest, AttendanceTallyRequest, CreatePaymentRequest,
    PaymentQuoteRequest, PolicyEvaluationRequest, RecordPaymentRequest,
    StudentComplianceRequest,
};
use super::response::{
    ApiError, ApiErrorResponse, AttendanceReport, PaymentMethodInfo, PaymentMethodsResponse,
    StudentPaymentsResponse, TallyReport,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/attendance/compute", post(compute_attendance_handler))
        .route("/attendance/tally", post(tally_attendance_handler))
        .route("/attendance/evaluate", post(evaluate_policy_handler))
        .route("/students/compliance", post(student_compliance_handler))
        .route("/students/:id/payments", get(student_payments_handler))
        .route("/payments", post(create_payment_handler))
        .route("/payments/methods", get(payment_methods_handler))
        .route("/payments/quote", post(quote_payment_handler))
        .route("/payments/:id", get(get_payment_handler))
        .route("/payments/:id/record", post(record_payment_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, error: EngineError, context: &str) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        "{}", context
    );
    let api_error: ApiErrorResponse = error.into();
    json_response(api_error.status, &api_error.error)
}

/// Unwraps a JSON body or builds the 400 response for a rejected one.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    Err(json_response(StatusCode::BAD_REQUEST, &error))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Attaches any late fee due and re-derives the status as of `as_of`.
fn refresh_payment(
    config: &ConfigLoader,
    payment: &StudentPayment,
    as_of: NaiveDate,
) -> EngineResult<StudentPayment> {
    match config.get_fee_structure(&payment.structure_id) {
        Ok(structure) => assess_late_fee(payment, structure, as_of),
        Err(_) => {
            let mut refreshed = payment.clone();
            refreshed.status = derive_payment_status(&refreshed, as_of);
            Ok(refreshed)
        }
    }
}

/// Handler for POST /attendance/compute.
async fn compute_attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceComputeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing attendance request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    match perform_attendance(&state, &request) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                total_classes = request.total_classes,
                percentage = %report.calculation.percentage,
                duration_us = start_time.elapsed().as_micros(),
                "Attendance computed"
            );
            json_response(StatusCode::OK, &report)
        }
        Err(err) => error_response(correlation_id, err, "Attendance calculation failed"),
    }
}

fn perform_attendance(
    state: &AppState,
    request: &AttendanceComputeRequest,
) -> EngineResult<AttendanceReport> {
    let required = request
        .required_percentage
        .unwrap_or(state.config().institution().default_required_percentage);

    let calculation = compute_attendance(
        request.total_classes,
        request.attended_classes,
        required,
        1,
    )?;
    let projection = request
        .remaining_classes
        .map(|remaining| {
            project_attendance(
                request.total_classes,
                request.attended_classes,
                remaining,
                required,
                2,
            )
        })
        .transpose()?;

    Ok(AttendanceReport {
        calculation,
        projection,
    })
}

/// Handler for POST /attendance/tally.
async fn tally_attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceTallyRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing attendance tally request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match perform_tally(&state, &request) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                records_count = request.records.len(),
                total_classes = report.tally.total_classes,
                "Attendance tallied"
            );
            json_response(StatusCode::OK, &report)
        }
        Err(err) => error_response(correlation_id, err, "Attendance tally failed"),
    }
}

fn perform_tally(state: &AppState, request: &AttendanceTallyRequest) -> EngineResult<TallyReport> {
    let required = request
        .required_percentage
        .unwrap_or(state.config().institution().default_required_percentage);

    let tally = match &request.subject {
        Some(subject) => tally_records(&records_for_subject(&request.records, subject))?,
        None => tally_records(&request.records)?,
    };
    let calculation = compute_attendance(tally.total_classes, tally.attended_classes, required, 1)?;

    Ok(TallyReport { tally, calculation })
}

/// Handler for POST /attendance/evaluate.
async fn evaluate_policy_handler(
    State(state): State<AppState>,
    payload: Result<Json<PolicyEvaluationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing policy evaluation request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let policies = request
        .policies
        .unwrap_or_else(|| state.config().active_policies());

    match evaluate_policy(&request.course, &policies, 1) {
        Ok(evaluation) => {
            info!(
                correlation_id = %correlation_id,
                course_id = %evaluation.course_id,
                status = evaluation.status.as_str(),
                policies_count = policies.len(),
                "Policy evaluated"
            );
            json_response(StatusCode::OK, &evaluation)
        }
        Err(err) => error_response(correlation_id, err, "Policy evaluation failed"),
    }
}

/// Handler for POST /students/compliance.
async fn student_compliance_handler(
    State(state): State<AppState>,
    payload: Result<Json<StudentComplianceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing compliance request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let policies = request
        .policies
        .unwrap_or_else(|| state.config().active_policies());

    match evaluate_student(&request.student, &request.courses, &policies) {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                student_id = %report.student_id,
                courses_count = report.courses.len(),
                overall_status = report.overall_status.as_str(),
                duration_us = report.audit_trace.duration_us,
                "Compliance report produced"
            );
            json_response(StatusCode::OK, &report)
        }
        Err(err) => error_response(correlation_id, err, "Compliance evaluation failed"),
    }
}

/// Handler for GET /payments/methods.
async fn payment_methods_handler(State(state): State<AppState>) -> Response {
    let methods = state
        .config()
        .payment_methods()
        .into_iter()
        .map(|m| PaymentMethodInfo {
            method: m.method,
            name: m.name.clone(),
            fee_percent: m.fee_percent,
        })
        .collect();

    json_response(StatusCode::OK, &PaymentMethodsResponse { methods })
}

/// Handler for POST /payments/quote.
async fn quote_payment_handler(
    State(state): State<AppState>,
    payload: Result<Json<PaymentQuoteRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payment quote request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match perform_quote(state.config(), &request) {
        Ok(quote) => {
            info!(
                correlation_id = %correlation_id,
                method = %quote.method,
                total_amount = %quote.total_amount,
                "Payment quoted"
            );
            json_response(StatusCode::OK, &quote)
        }
        Err(err) => error_response(correlation_id, err, "Payment quote failed"),
    }
}

fn perform_quote(config: &ConfigLoader, request: &PaymentQuoteRequest) -> EngineResult<PaymentQuote> {
    let method: PaymentMethod = request.method.parse()?;
    let fee_percent = config.fee_percent(method)?;
    quote_payment(request.amount, method, fee_percent, 1)
}

/// Handler for POST /payments.
async fn create_payment_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payment creation request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match perform_create_payment(&state, &request) {
        Ok(payment) => {
            info!(
                correlation_id = %correlation_id,
                payment_id = %payment.id,
                student_id = %payment.student_id,
                amount = %payment.amount,
                "Payment created"
            );
            json_response(StatusCode::CREATED, &payment)
        }
        Err(err) => error_response(correlation_id, err, "Payment creation failed"),
    }
}

fn perform_create_payment(
    state: &AppState,
    request: &CreatePaymentRequest,
) -> EngineResult<StudentPayment> {
    let structure = state.config().get_fee_structure(&request.structure_id)?;
    let id = request
        .id
        .clone()
        .unwrap_or_else(|| format!("pay_{}", Uuid::new_v4().simple()));

    let payment = new_student_payment(structure, &request.student_id, &id)?;
    state.payments().insert(payment.clone())?;
    Ok(payment)
}

/// Handler for GET /payments/:id.
async fn get_payment_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();

    let result = state
        .payments()
        .get(&id)
        .and_then(|payment| refresh_payment(state.config(), &payment, today()));

    match result {
        Ok(payment) => json_response(StatusCode::OK, &payment),
        Err(err) => error_response(correlation_id, err, "Payment lookup failed"),
    }
}

/// Handler for POST /payments/:id/record.
async fn record_payment_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RecordPaymentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, payment_id = %id, "Processing payment record request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match perform_record_payment(&state, &id, &request) {
        Ok(payment) => {
            info!(
                correlation_id = %correlation_id,
                payment_id = %payment.id,
                paid_amount = %payment.paid_amount,
                status = ?payment.status,
                "Payment recorded"
            );
            json_response(StatusCode::OK, &payment)
        }
        Err(err) => error_response(correlation_id, err, "Payment recording failed"),
    }
}

fn perform_record_payment(
    state: &AppState,
    id: &str,
    request: &RecordPaymentRequest,
) -> EngineResult<StudentPayment> {
    let as_of = request.as_of.unwrap_or_else(today);
    state.payments().modify(id, &mut |stored| {
        let refreshed = refresh_payment(state.config(), stored, as_of)?;
        Ok(apply_payment(&refreshed, request.amount, as_of, 1)?.payment)
    })
}

/// Handler for GET /students/:id/payments.
async fn student_payments_handler(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let as_of = today();

    let result = state.payments().list_for_student(&student_id).and_then(|payments| {
        payments
            .iter()
            .map(|p| refresh_payment(state.config(), p, as_of))
            .collect::<EngineResult<Vec<_>>>()
    });

    match result {
        Ok(payments) => {
            let totals = summarize_payments(&payments, as_of);
            info!(
                correlation_id = %correlation_id,
                student_id = %student_id,
                payments_count = payments.len(),
                outstanding = %totals.total_outstanding,
                "Student payments listed"
            );
            json_response(
                StatusCode::OK,
                &StudentPaymentsResponse {
                    student_id,
                    payments,
                    totals,
                },
            )
        }
        Err(err) => error_response(correlation_id, err, "Student payment listing failed"),
    }
}
