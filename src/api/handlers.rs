//! HTTP request handlers for the Payroll Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    calculate_ctc, calculate_leave_duration, merge_allowance_records, net_salary_calendar_divisor,
    net_salary_fixed_divisor, parse_clock_time,
};
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, CalculationResult, EmployeeRef, SalaryRecord,
};

use super::request::{AllowanceMergeRequest, CtcRequest, LeaveDurationRequest};
use super::response::{
    AllowanceMergeOutput, ApiError, ApiErrorResponse, CtcOutput, LeaveDurationOutput,
    NetSalaryOutput,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/leave/duration", post(leave_duration_handler))
        .route("/salary/net/fixed-divisor", post(net_salary_fixed_handler))
        .route(
            "/salary/net/calendar-divisor",
            post(net_salary_calendar_handler),
        )
        .route("/allowances/merge", post(allowance_merge_handler))
        .route("/ctc", post(ctc_handler))
        .with_state(state)
}

/// Handler for POST /leave/duration.
async fn leave_duration_handler(
    State(state): State<AppState>,
    payload: Result<Json<LeaveDurationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing leave duration request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match perform_leave_duration(&request, state.config()) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                start_date = %request.start_date,
                end_date = %request.end_date,
                days = %result.output.days,
                duration_us = result.audit_trace.duration_us,
                "Leave duration calculated"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /salary/net/fixed-divisor.
async fn net_salary_fixed_handler(
    State(state): State<AppState>,
    payload: Result<Json<SalaryRecord>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing fixed-divisor net salary request");

    let record = match payload {
        Ok(Json(record)) => record,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let started = Instant::now();
    let divisor = state.config().fixed_divisor();
    match net_salary_fixed_divisor(&record, divisor, 1) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee = %employee_label(record.employee_id.as_ref()),
                period = %record.pay_period(),
                net_salary = %result.net_salary,
                "Net salary calculated"
            );
            let output = NetSalaryOutput::from(&result);
            let body = envelope(output, vec![result.audit_step], result.warnings, started);
            json_response(StatusCode::OK, body)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /salary/net/calendar-divisor.
async fn net_salary_calendar_handler(
    payload: Result<Json<SalaryRecord>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calendar-divisor net salary request");

    let record = match payload {
        Ok(Json(record)) => record,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let started = Instant::now();
    match net_salary_calendar_divisor(&record, 1) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee = %employee_label(record.employee_id.as_ref()),
                period = %record.pay_period(),
                net_salary = %result.net_salary,
                "Net salary calculated"
            );
            let output = NetSalaryOutput::from(&result);
            let body = envelope(output, vec![result.audit_step], result.warnings, started);
            json_response(StatusCode::OK, body)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /allowances/merge.
async fn allowance_merge_handler(
    State(state): State<AppState>,
    payload: Result<Json<AllowanceMergeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing allowance merge request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let started = Instant::now();
    let result = merge_allowance_records(&request.records, 1);

    let mut warnings = result.warnings.clone();
    warnings.extend(unknown_type_warnings(
        state.config(),
        request.records.iter().map(|r| r.allowance_type.as_str()),
    ));

    if !result.skipped.is_empty() {
        warn!(
            correlation_id = %correlation_id,
            skipped = result.skipped.len(),
            "Allowance records without an employee code were skipped"
        );
    }
    info!(
        correlation_id = %correlation_id,
        records = request.records.len(),
        rows = result.rows.len(),
        "Allowance records merged"
    );

    let output = AllowanceMergeOutput::from(&result);
    json_response(
        StatusCode::OK,
        envelope(output, vec![result.audit_step], warnings, started),
    )
}

/// Handler for POST /ctc.
async fn ctc_handler(
    State(state): State<AppState>,
    payload: Result<Json<CtcRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing CTC request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let started = Instant::now();
    let result = match calculate_ctc(
        request.gross_salary,
        &request.dynamic_allowances,
        &request.fixed_allowances,
        1,
    ) {
        Ok(result) => result,
        Err(err) => return engine_error_response(correlation_id, err),
    };

    let warnings = unknown_type_warnings(
        state.config(),
        request
            .dynamic_allowances
            .iter()
            .chain(&request.fixed_allowances)
            .map(|e| e.allowance_type.as_str()),
    );

    info!(
        correlation_id = %correlation_id,
        total_ctc = %result.total_ctc,
        excluded_entries = result.excluded_entries,
        "CTC calculated"
    );

    let output = CtcOutput::from(&result);
    json_response(
        StatusCode::OK,
        envelope(output, vec![result.audit_step], warnings, started),
    )
}

/// Resolves request times against the configured defaults and measures the leave.
fn perform_leave_duration(
    request: &LeaveDurationRequest,
    config: &ConfigLoader,
) -> EngineResult<CalculationResult<LeaveDurationOutput>> {
    let started = Instant::now();

    let start_time = request
        .start_time
        .as_deref()
        .map(parse_clock_time)
        .transpose()?
        .flatten();
    let end_time = request
        .end_time
        .as_deref()
        .map(parse_clock_time)
        .transpose()?
        .flatten();

    let result = calculate_leave_duration(
        request.start_date,
        start_time,
        request.end_date,
        end_time,
        config.leave_defaults(),
        1,
    )?;

    let output = LeaveDurationOutput::from(&result);
    Ok(envelope(output, vec![result.audit_step], vec![], started))
}

/// Wraps a calculator output in the standard result envelope.
fn envelope<T>(
    output: T,
    steps: Vec<AuditStep>,
    warnings: Vec<AuditWarning>,
    started: Instant,
) -> CalculationResult<T> {
    CalculationResult {
        calculation_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        output,
        audit_trace: AuditTrace {
            steps,
            warnings,
            duration_us: started.elapsed().as_micros() as u64,
        },
    }
}

/// One warning per distinct allowance type missing from the catalog, in first-seen order.
fn unknown_type_warnings<'a>(
    config: &ConfigLoader,
    types: impl Iterator<Item = &'a str>,
) -> Vec<AuditWarning> {
    let mut seen: Vec<&str> = Vec::new();
    for allowance_type in types {
        if config.allowance_kind(allowance_type).is_none() && !seen.contains(&allowance_type) {
            seen.push(allowance_type);
        }
    }

    seen.into_iter()
        .map(|allowance_type| {
            AuditWarning::new(
                "UNKNOWN_ALLOWANCE_TYPE",
                format!(
                    "Allowance type '{}' is not in the allowance catalog",
                    allowance_type
                ),
                "low",
            )
        })
        .collect()
}

fn employee_label(employee: Option<&EmployeeRef>) -> String {
    employee
        .and_then(|e| e.employee_id.as_ref())
        .map(|code| code.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

/// Maps a JSON extraction failure to a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
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
    json_response(StatusCode::BAD_REQUEST, error)
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Calculation failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}
