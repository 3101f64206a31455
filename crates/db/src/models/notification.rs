use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display,
)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    MemberCompleted,
    TeamRankUp,
}

/// Team feed entry. `payload` carries the event's structured data as JSON
/// text.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Notification {
    pub id: Uuid,
    pub team_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub payload: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub async fn create(
        pool: &SqlitePool,
        team_id: Uuid,
        kind: NotificationKind,
        message: &str,
        payload: Option<String>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Notification>(
            r#"INSERT INTO notifications (id, team_id, kind, message, payload)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, team_id, kind, message, payload, is_read, created_at"#,
        )
        .bind(id)
        .bind(team_id)
        .bind(kind)
        .bind(message)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"SELECT id, team_id, kind, message, payload, is_read, created_at
            FROM notifications
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_for_team(
        pool: &SqlitePool,
        team_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"SELECT id, team_id, kind, message, payload, is_read, created_at
            FROM notifications
            WHERE team_id = $1
            ORDER BY created_at DESC
            LIMIT $2"#,
        )
        .bind(team_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn mark_read(pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(r#"UPDATE notifications SET is_read = 1 WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(pool: &SqlitePool, team_id: Uuid) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query(r#"UPDATE notifications SET is_read = 1 WHERE team_id = $1 AND is_read = 0"#)
                .bind(team_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
