//! Team notification feed: persistence of quest events plus the
//! list/mark-read surface consumed by the notifications routes.

use db::models::{
    notification::{Notification, NotificationKind},
    team::TeamMember,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

const FEED_LIMIT: i64 = 50;

#[derive(Debug, Error)]
pub enum NotificationServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("notification not found")]
    NotFound,
    #[error("user does not belong to a team")]
    NoTeam,
    #[error("notification belongs to another team")]
    PermissionDenied,
}

pub struct NotificationService;

impl NotificationService {
    /// Persist a feed entry for the team. Callers treat delivery as
    /// fire-and-forget; failures are theirs to log, not to propagate.
    pub async fn notify(
        pool: &SqlitePool,
        team_id: Uuid,
        kind: NotificationKind,
        message: &str,
        payload: serde_json::Value,
    ) -> Result<Notification, NotificationServiceError> {
        let notification =
            Notification::create(pool, team_id, kind, message, Some(payload.to_string())).await?;

        debug!(
            team_id = %team_id,
            kind = %kind,
            "notification recorded"
        );

        Ok(notification)
    }

    /// Latest feed entries for the team. The caller must belong to it.
    pub async fn list_feed(
        pool: &SqlitePool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Notification>, NotificationServiceError> {
        Self::guard_team(pool, team_id, user_id).await?;
        Ok(Notification::list_for_team(pool, team_id, FEED_LIMIT).await?)
    }

    pub async fn mark_read(
        pool: &SqlitePool,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), NotificationServiceError> {
        let notification = Notification::find_by_id(pool, notification_id)
            .await?
            .ok_or(NotificationServiceError::NotFound)?;

        Self::guard_team(pool, notification.team_id, user_id).await?;

        Notification::mark_read(pool, notification.id).await?;
        Ok(())
    }

    /// Mark the whole team feed read; returns how many entries flipped.
    pub async fn mark_all_read(
        pool: &SqlitePool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, NotificationServiceError> {
        Self::guard_team(pool, team_id, user_id).await?;
        Ok(Notification::mark_all_read(pool, team_id).await?)
    }

    async fn guard_team(
        pool: &SqlitePool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), NotificationServiceError> {
        let my_team = TeamMember::find_team_id(pool, user_id)
            .await?
            .ok_or(NotificationServiceError::NoTeam)?;

        if my_team != team_id {
            return Err(NotificationServiceError::PermissionDenied);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use db::{DBService, models::team::Team};
    use tempfile::TempDir;

    use super::*;

    async fn test_pool(dir: &TempDir) -> SqlitePool {
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        DBService::new(&url).await.unwrap().pool
    }

    async fn team_with_member(pool: &SqlitePool, name: &str) -> (Uuid, Uuid) {
        let team = Team::create(pool, name).await.unwrap();
        let user_id = Uuid::new_v4();
        TeamMember::add(pool, team.id, user_id).await.unwrap();
        (team.id, user_id)
    }

    async fn record_event(pool: &SqlitePool, team_id: Uuid) -> Notification {
        NotificationService::notify(
            pool,
            team_id,
            NotificationKind::MemberCompleted,
            "Quest clear: Plank, 1 min (+40pt)",
            serde_json::json!({ "points": 40 }),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn feed_is_scoped_to_the_callers_team() {
        let dir = TempDir::new().unwrap();
        let pool = test_pool(&dir).await;
        let (team_a, user_a) = team_with_member(&pool, "morning crew").await;
        let (_team_b, user_b) = team_with_member(&pool, "night owls").await;
        record_event(&pool, team_a).await;

        let feed = NotificationService::list_feed(&pool, team_a, user_a)
            .await
            .unwrap();
        assert_eq!(feed.len(), 1);

        let err = NotificationService::list_feed(&pool, team_a, user_b)
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationServiceError::PermissionDenied));
    }

    #[tokio::test]
    async fn mark_read_rejects_cross_team_callers() {
        let dir = TempDir::new().unwrap();
        let pool = test_pool(&dir).await;
        let (team_a, user_a) = team_with_member(&pool, "morning crew").await;
        let (_team_b, user_b) = team_with_member(&pool, "night owls").await;
        let notification = record_event(&pool, team_a).await;

        let err = NotificationService::mark_read(&pool, notification.id, user_b)
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationServiceError::PermissionDenied));

        // The denied attempt must not have flipped the entry.
        let feed = NotificationService::list_feed(&pool, team_a, user_a)
            .await
            .unwrap();
        assert!(!feed[0].is_read);
    }

    #[tokio::test]
    async fn mark_read_unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let pool = test_pool(&dir).await;
        let (_team_a, user_a) = team_with_member(&pool, "morning crew").await;

        let err = NotificationService::mark_read(&pool, Uuid::new_v4(), user_a)
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationServiceError::NotFound));
    }

    #[tokio::test]
    async fn mark_all_read_rejects_cross_team_callers() {
        let dir = TempDir::new().unwrap();
        let pool = test_pool(&dir).await;
        let (team_a, user_a) = team_with_member(&pool, "morning crew").await;
        let (_team_b, user_b) = team_with_member(&pool, "night owls").await;
        record_event(&pool, team_a).await;
        record_event(&pool, team_a).await;

        let err = NotificationService::mark_all_read(&pool, team_a, user_b)
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationServiceError::PermissionDenied));

        let marked = NotificationService::mark_all_read(&pool, team_a, user_a)
            .await
            .unwrap();
        assert_eq!(marked, 2);
    }

    #[tokio::test]
    async fn teamless_caller_is_rejected() {
        let dir = TempDir::new().unwrap();
        let pool = test_pool(&dir).await;
        let (team_a, _user_a) = team_with_member(&pool, "morning crew").await;

        let err = NotificationService::list_feed(&pool, team_a, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationServiceError::NoTeam));
    }
}
