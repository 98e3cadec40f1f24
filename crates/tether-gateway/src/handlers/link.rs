use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tether_core::{CoreError, ShortCode};

use crate::error::{AppError, Result};
use crate::extract::StrictJson;
use crate::model::{AccessCountResponse, LinkResponse, UrlRequest};
use crate::state::AppState;

fn parse_code(raw: &str) -> Result<ShortCode> {
    Ok(ShortCode::new(raw)?)
}

pub async fn create_link_handler(
    State(state): State<AppState>,
    StrictJson(request): StrictJson<UrlRequest>,
) -> Result<Json<LinkResponse>> {
    let record = state.shortener().shorten(&request.url).await?;
    Ok(Json(record.into()))
}

pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>> {
    let code = parse_code(&code)?;
    let record = state.shortener().get(&code).await?;
    Ok(Json(record.into()))
}

pub async fn update_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    StrictJson(request): StrictJson<UrlRequest>,
) -> Result<Json<LinkResponse>> {
    let code = parse_code(&code)?;
    let record = state.shortener().update(&code, &request.url).await?;
    Ok(Json(record.into()))
}

pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let code = parse_code(&code)?;
    state.shortener().delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn link_stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>> {
    let code = parse_code(&code)?;
    let record = state.shortener().stats(&code).await?;
    Ok(Json(record.into()))
}

pub async fn increment_access_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AccessCountResponse>> {
    let code = parse_code(&code)?;
    let access_count = state.shortener().increment_access(&code).await?;
    Ok(Json(AccessCountResponse { access_count }))
}

/// `/shorten/` with nothing after the slash.
pub async fn missing_code_handler() -> AppError {
    CoreError::MissingShortCode.into()
}

pub async fn fallback_handler() -> AppError {
    AppError::RouteNotFound
}
