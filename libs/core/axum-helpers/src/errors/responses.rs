//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "status": "error",
        "code": 1001,
        "error": "VALIDATION_ERROR",
        "message": "vector 1 has length 3, expected 4"
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Service Unavailable - readiness gate not open",
    content_type = "application/json",
    example = json!({
        "status": "error",
        "code": 1503,
        "error": "SERVICE_UNAVAILABLE",
        "message": "service is not ready (awaiting_store)"
    })
)]
pub struct ServiceUnavailableResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Gateway - storage backend failure",
    content_type = "application/json",
    example = json!({
        "status": "error",
        "code": 2001,
        "error": "STORE_ERROR",
        "message": "The storage backend failed to complete the request"
    })
)]
pub struct BadGatewayResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Gateway Timeout - request exceeded its latency budget",
    content_type = "application/json",
    example = json!({
        "status": "error",
        "code": 1504,
        "error": "TIMEOUT",
        "message": "operation timed out after 30000ms"
    })
)]
pub struct GatewayTimeoutResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "status": "error",
        "code": 1500,
        "error": "INTERNAL_ERROR",
        "message": "An unexpected error occurred"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);
