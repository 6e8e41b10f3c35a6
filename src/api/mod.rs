//! HTTP API module for the Payroll Engine.
//!
//! This module provides the REST endpoints for leave duration, net salary,
//! allowance merging and CTC aggregation.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AllowanceMergeRequest, CtcRequest, LeaveDurationRequest};
pub use response::{
    AllowanceMergeOutput, ApiError, ApiErrorResponse, CtcOutput, LeaveDurationOutput,
    NetSalaryOutput,
};
pub use state::AppState;
