//! HTTP handlers for the vector engine

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::AppJson;
use axum_helpers::errors::responses::{
    BadGatewayResponse, BadRequestValidationResponse, GatewayTimeoutResponse,
    InternalServerErrorResponse, ServiceUnavailableResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::{OpenApi, ToSchema};

use crate::error::VectorResult;
use crate::gate::GateState;
use crate::models::{
    DeleteRequest, DeleteResponse, InsertRequest, InsertResponse, OperationStatus, SearchRequest,
    SearchResponse,
};
use crate::service::VectorService;
use crate::store::RecordStore;

/// Body of `GET /ready`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadyResponse {
    /// `ready` or `not ready`
    #[schema(example = "ready")]
    pub status: String,
    /// Readiness gate state
    #[schema(example = "ready")]
    pub gate: String,
    /// `connected` or `disconnected`
    #[schema(example = "connected")]
    pub store: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(insert, search, delete, drop_collection, ready),
    components(
        schemas(
            InsertRequest, InsertResponse,
            SearchRequest, SearchResponse,
            DeleteRequest, DeleteResponse,
            OperationStatus, ReadyResponse
        ),
        responses(
            BadRequestValidationResponse,
            ServiceUnavailableResponse,
            BadGatewayResponse,
            GatewayTimeoutResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "vectors", description = "Vector ingestion, similarity search and deletion")
    )
)]
pub struct VectorApiDoc;

/// Insert or overwrite a batch of records
#[utoipa::path(
    post,
    path = "/insert",
    tag = "vectors",
    request_body = InsertRequest,
    responses(
        (status = 200, description = "Batch stored", body = InsertResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 504, response = GatewayTimeoutResponse)
    )
)]
pub async fn insert<S>(
    State(service): State<Arc<VectorService<S>>>,
    AppJson(request): AppJson<InsertRequest>,
) -> VectorResult<Json<InsertResponse>>
where
    S: RecordStore + ?Sized + 'static,
{
    let inserted_count = service.insert(request.into_records()).await?;

    Ok(Json(InsertResponse {
        status: OperationStatus::Success,
        message: format!("Inserted {inserted_count} vectors"),
        inserted_count,
    }))
}

/// Rank the collection against one or more query vectors
#[utoipa::path(
    post,
    path = "/search",
    tag = "vectors",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "One ranked list per query vector", body = SearchResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 504, response = GatewayTimeoutResponse)
    )
)]
pub async fn search<S>(
    State(service): State<Arc<VectorService<S>>>,
    AppJson(request): AppJson<SearchRequest>,
) -> VectorResult<Json<SearchResponse>>
where
    S: RecordStore + ?Sized + 'static,
{
    let result = service
        .search(
            request.vectors,
            &request.measure_type,
            request.count,
            request.offset,
        )
        .await?;

    Ok(Json(SearchResponse {
        status: OperationStatus::Success,
        message: format!("Searched {} query vectors", result.len()),
        result,
    }))
}

/// Delete records by id; unknown ids are ignored
#[utoipa::path(
    post,
    path = "/delete",
    tag = "vectors",
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "Records removed", body = DeleteResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 504, response = GatewayTimeoutResponse)
    )
)]
pub async fn delete<S>(
    State(service): State<Arc<VectorService<S>>>,
    AppJson(request): AppJson<DeleteRequest>,
) -> VectorResult<Json<DeleteResponse>>
where
    S: RecordStore + ?Sized + 'static,
{
    let deleted_count = service.delete(request.ids).await?;

    Ok(Json(DeleteResponse {
        status: OperationStatus::Success,
        message: format!("Deleted {deleted_count} vectors"),
        deleted_count,
    }))
}

/// Remove every record in the collection
#[utoipa::path(
    post,
    path = "/drop",
    tag = "vectors",
    responses(
        (status = 200, description = "Collection emptied", body = DeleteResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 504, response = GatewayTimeoutResponse)
    )
)]
pub async fn drop_collection<S>(
    State(service): State<Arc<VectorService<S>>>,
) -> VectorResult<Json<DeleteResponse>>
where
    S: RecordStore + ?Sized + 'static,
{
    let deleted_count = service.drop_collection().await?;

    Ok(Json(DeleteResponse {
        status: OperationStatus::Success,
        message: format!("Dropped collection, {deleted_count} vectors removed"),
        deleted_count,
    }))
}

/// Readiness: gate state plus a live store ping
#[utoipa::path(
    get,
    path = "/ready",
    tag = "vectors",
    responses(
        (status = 200, description = "Serving requests", body = ReadyResponse),
        (status = 503, description = "Not serving requests", body = ReadyResponse)
    )
)]
pub async fn ready<S>(State(service): State<Arc<VectorService<S>>>) -> Response
where
    S: RecordStore + ?Sized + 'static,
{
    let readiness = service.readiness().await;
    let is_ready = readiness.is_ready();

    let reason = match (&readiness.gate, &readiness.store) {
        (GateState::Failed(reason), _) => Some(reason.clone()),
        (_, Err(e)) => Some(e.clone()),
        _ => None,
    };
    if let Some(reason) = &reason {
        warn!(gate = readiness.gate.name(), "Readiness check failed: {}", reason);
    }

    let body = ReadyResponse {
        status: if is_ready { "ready" } else { "not ready" }.to_string(),
        gate: readiness.gate.name().to_string(),
        store: if readiness.store.is_ok() {
            "connected"
        } else {
            "disconnected"
        }
        .to_string(),
        reason,
    };

    let status = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}

/// Routes for the vector API, mounted at the root.
pub fn router<S>(service: Arc<VectorService<S>>) -> Router
where
    S: RecordStore + ?Sized + 'static,
{
    Router::new()
        .route("/insert", post(insert::<S>))
        .route("/search", post(search::<S>))
        .route("/delete", post(delete::<S>))
        .route("/drop", post(drop_collection::<S>))
        .route("/ready", get(ready::<S>))
        .with_state(service)
}
