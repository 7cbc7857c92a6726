use axum::{Json, Router, body::Bytes, extract::State, response::IntoResponse, routing::post};
use serde::Serialize;

use crate::{adapters::http::app_state::AppState, app_error::AppResult};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(send_conversion))
}

#[derive(Serialize)]
struct ConversionResponse {
    message: &'static str,
    event_uuid: String,
}

async fn send_conversion(
    State(app_state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let event_uuid = app_state.conversion_use_cases.forward(&body).await?;

    Ok(Json(ConversionResponse {
        message: "Conversion sent successfully",
        event_uuid,
    }))
}
