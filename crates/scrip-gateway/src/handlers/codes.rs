use crate::error::{AppError, Result};
use crate::model::{
    CodeResponse, CreateCodesRequest, CreateCodesResponse, PageQuery, PageResponse, PurgeResponse,
    SearchQuery, UpdateCodeRequest, UpdateStatusRequest,
};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

/// Identifies the creating principal. Authentication lives in front of
/// this service; absent the header, ownership falls back to 0.
const OWNER_ID_HEADER: &str = "x-owner-id";

fn owner_id_from(headers: &HeaderMap) -> Result<i64> {
    let Some(value) = headers.get(OWNER_ID_HEADER) else {
        return Ok(0);
    };
    value
        .to_str()
        .ok()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| AppError::BadRequest(format!("invalid {OWNER_ID_HEADER} header")))
}

pub async fn create_codes_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateCodesRequest>,
) -> Result<(StatusCode, Json<CreateCodesResponse>)> {
    let owner_id = owner_id_from(&headers)?;
    let request = request.into_mint_request()?;
    let keys = state.minter().mint(owner_id, request).await?;
    Ok((StatusCode::CREATED, Json(CreateCodesResponse { keys })))
}

pub async fn get_code_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<CodeResponse>> {
    let code = state.minter().get(id).await?;
    Ok(Json(code.into()))
}

pub async fn list_codes_handler(
    Query(query): Query<PageQuery>,
    State(state): State<AppState>,
) -> Result<Json<PageResponse>> {
    let (offset, limit) = query.offset_limit();
    let page = state.minter().list(offset, limit).await?;
    Ok(Json(page.into()))
}

pub async fn search_codes_handler(
    Query(query): Query<SearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<PageResponse>> {
    let (offset, limit) = query.page().offset_limit();
    let page = state.minter().search(&query.keyword, offset, limit).await?;
    Ok(Json(page.into()))
}

pub async fn update_code_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(request): Json<UpdateCodeRequest>,
) -> Result<Json<CodeResponse>> {
    let patch = request.into_field_patch()?;
    let code = state.minter().update_fields(id, patch).await?;
    Ok(Json(code.into()))
}

pub async fn update_status_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<CodeResponse>> {
    let code = state.minter().update_status(id, request.status).await?;
    Ok(Json(code.into()))
}

pub async fn delete_code_handler(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    state.minter().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn purge_invalid_handler(
    State(state): State<AppState>,
) -> Result<Json<PurgeResponse>> {
    let removed = state.minter().purge_invalid().await?;
    Ok(Json(PurgeResponse { removed }))
}
