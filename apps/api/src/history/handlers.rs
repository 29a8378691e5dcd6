use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{AppError, AppJson};
use crate::models::history::{DashboardSummary, HistoryRecord, NewHistoryRecord};
use crate::models::user::{ProfileUpdate, UserProfile};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHistoryQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHistoryRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub record: NewHistoryRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub update: ProfileUpdate,
}

/// GET /api/v1/history
pub async fn handle_list_history(
    State(state): State<AppState>,
    Query(params): Query<ListHistoryQuery>,
) -> Result<Json<Vec<HistoryRecord>>, AppError> {
    let records = state.history.list_records(params.user_id, params.limit).await?;
    Ok(Json(records))
}

/// POST /api/v1/history
pub async fn handle_create_history(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateHistoryRequest>,
) -> Result<(StatusCode, Json<HistoryRecord>), AppError> {
    let record = state.history.create_record(req.user_id, req.record).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/v1/history/:id
pub async fn handle_delete_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    state.history.delete_record(params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/history/events
///
/// Server-sent events: one `snapshot`, then `recordAdded` / `recordRemoved` /
/// `profileUpdated` as they happen. The stream closes after the subscription
/// lifetime; clients reconnect to resume.
pub async fn handle_history_events(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, AppError> {
    let events = state.history.subscribe(params.user_id).await?;
    let stream = events.map(|event| Event::default().event(event.name()).json_data(&event));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<DashboardSummary>, AppError> {
    Ok(Json(state.history.dashboard(params.user_id).await?))
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.history.get_profile(params.user_id).await?))
}

/// PUT /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.history.update_profile(req.user_id, req.update).await?;
    Ok(Json(profile))
}
