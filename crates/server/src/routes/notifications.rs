//! Routes for the team notification feed.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::notification::Notification;
use serde::{Deserialize, Serialize};
use services::services::{notification::NotificationService, quest::QuestService};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct MarkAllReadResponse {
    pub marked: u64,
}

/// Latest feed entries for the caller's team
pub async fn list_feed(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Notification>>>, ApiError> {
    let team_id = QuestService::team_for_user(&state.db.pool, user_id).await?;
    let feed = NotificationService::list_feed(&state.db.pool, team_id, user_id).await?;
    Ok(ResponseJson(ApiResponse::success(feed)))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path((user_id, notification_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    NotificationService::mark_read(&state.db.pool, notification_id, user_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<MarkAllReadResponse>>, ApiError> {
    let team_id = QuestService::team_for_user(&state.db.pool, user_id).await?;
    let marked = NotificationService::mark_all_read(&state.db.pool, team_id, user_id).await?;
    Ok(ResponseJson(ApiResponse::success(MarkAllReadResponse {
        marked,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/users/{user_id}/notifications",
        Router::new()
            .route("/", get(list_feed))
            .route("/{notification_id}/read", post(mark_read))
            .route("/read-all", post(mark_all_read)),
    )
}
