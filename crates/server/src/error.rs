use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    notification::NotificationServiceError, quest::QuestServiceError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

/// Boundary error type. Domain errors are translated into generic
/// user-facing failure notices; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Quest(#[from] QuestServiceError),
    #[error(transparent)]
    Notification(#[from] NotificationServiceError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Quest(QuestServiceError::TeamNotFound) => {
                (StatusCode::NOT_FOUND, "Join a team first.")
            }
            ApiError::Quest(QuestServiceError::ItemNotFound) => {
                (StatusCode::NOT_FOUND, "That quest could not be found.")
            }
            ApiError::Quest(QuestServiceError::PermissionDenied) => (
                StatusCode::FORBIDDEN,
                "You cannot act on another team's quests.",
            ),
            ApiError::Quest(QuestServiceError::Stale) => (
                StatusCode::GONE,
                "That quest is no longer part of today's set.",
            ),
            ApiError::Notification(NotificationServiceError::NotFound) => {
                (StatusCode::NOT_FOUND, "That notification could not be found.")
            }
            ApiError::Notification(NotificationServiceError::NoTeam) => {
                (StatusCode::NOT_FOUND, "Join a team first.")
            }
            ApiError::Notification(NotificationServiceError::PermissionDenied) => (
                StatusCode::FORBIDDEN,
                "You cannot view another team's notifications.",
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again.",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {self}");
        }
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
