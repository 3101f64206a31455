//! Routes for today's quest set, completion, progress and MVP.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use services::services::quest::{
    CompletionOutcome, MvpEntry, QuestService, TodayProgress, TodaySet,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Get (or lazily create) today's quest set for the caller's team
pub async fn get_today(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<TodaySet>>, ApiError> {
    let team_id = QuestService::team_for_user(&state.db.pool, user_id).await?;
    let set = QuestService::get_or_create_today_set(&state.db.pool, team_id, user_id).await?;
    Ok(ResponseJson(ApiResponse::success(set)))
}

/// Mark one daily item completed; duplicate taps are an idempotent success
pub async fn complete_item(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<CompletionOutcome>>, ApiError> {
    let outcome = QuestService::complete(&state.db.pool, user_id, item_id).await?;
    Ok(ResponseJson(ApiResponse::success(outcome)))
}

/// Per-item completion counts vs. team size
pub async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<TodayProgress>>, ApiError> {
    let team_id = QuestService::team_for_user(&state.db.pool, user_id).await?;
    let progress = QuestService::get_today_progress(&state.db.pool, team_id).await?;
    Ok(ResponseJson(ApiResponse::success(progress)))
}

/// Today's top point-earner for the caller's team, if anyone has completed
/// anything yet
pub async fn get_mvp(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Option<MvpEntry>>>, ApiError> {
    let team_id = QuestService::team_for_user(&state.db.pool, user_id).await?;
    let mvp = QuestService::get_today_mvp(&state.db.pool, team_id).await?;
    Ok(ResponseJson(ApiResponse::success(mvp)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/users/{user_id}/quests",
        Router::new()
            .route("/today", get(get_today))
            .route("/{item_id}/complete", post(complete_item))
            .route("/progress", get(get_progress))
            .route("/mvp", get(get_mvp)),
    )
}
