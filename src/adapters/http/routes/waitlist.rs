use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    adapters::http::{
        app_state::AppState,
        middleware::{AdminAccess, RequestContext, rate_limit_middleware},
    },
    app_error::{AppError, AppResult},
    application::{use_cases::waitlist::ListEntriesQuery, validators::FieldErrors},
    domain::entities::entry_status::EntryStatus,
};

pub fn router(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(submit_entry).route_layer(middleware::from_fn_with_state(
                app_state.clone(),
                rate_limit_middleware,
            )),
        )
        .route("/", get(list_entries))
        .route("/stats", get(get_stats))
        .route("/{entry_id}/status", patch(update_status))
        .route("/{entry_id}", delete(delete_entry))
}

// ============================================================================
// POST /
// ============================================================================

#[derive(Serialize)]
struct SubmitResponse {
    success: bool,
    message: &'static str,
    id: Uuid,
}

/// The body is taken raw so a malformed payload maps to our own 400 and the
/// configuration check can run before parsing.
async fn submit_entry(
    State(app_state): State<AppState>,
    RequestContext(metadata): RequestContext,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let id = app_state.waitlist_use_cases.submit(&body, metadata).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            success: true,
            message: "Successfully joined the waitlist!",
            id,
        }),
    ))
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<u32>,
    limit: Option<u32>,
    status: Option<String>,
}

async fn list_entries(
    _admin: AdminAccess,
    State(app_state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params.map_err(|e| {
        AppError::Validation(FieldErrors::single("query", e.body_text()))
    })?;

    let status = params
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(parse_status)
        .transpose()?;

    let page = app_state
        .waitlist_use_cases
        .list_entries(ListEntriesQuery::new(params.page, params.limit, status))
        .await?;

    Ok(Json(page))
}

async fn get_stats(
    _admin: AdminAccess,
    State(app_state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats = app_state.waitlist_use_cases.stats().await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusPayload {
    status: String,
}

async fn update_status(
    _admin: AdminAccess,
    State(app_state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    payload: Result<Json<UpdateStatusPayload>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(payload) = payload.map_err(|_| AppError::MalformedRequest)?;
    let status = parse_status(&payload.status)?;

    if !app_state
        .waitlist_use_cases
        .update_status(entry_id, status)
        .await?
    {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "success": true, "status": status })))
}

async fn delete_entry(
    _admin: AdminAccess,
    State(app_state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    if !app_state.waitlist_use_cases.delete_entry(entry_id).await? {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({ "success": true })))
}

fn parse_status(raw: &str) -> AppResult<EntryStatus> {
    raw.parse::<EntryStatus>().map_err(|_| {
        AppError::Validation(FieldErrors::single(
            "status",
            "Status must be one of pending, contacted, converted, declined",
        ))
    })
}
