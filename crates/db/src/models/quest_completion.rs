use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::quest::{QuestCategory, QuestDifficulty};

/// Fact that one user completed one daily item. UNIQUE(user_id,
/// daily_item_id) is enforced by the schema; duplicates are absorbed with
/// INSERT OR IGNORE rather than surfaced as errors.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct QuestCompletion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub daily_item_id: Uuid,
    pub completed_at: DateTime<Utc>,
}

/// Completion joined with the quest's point value, for MVP ranking.
#[derive(Debug, Clone, FromRow)]
pub struct CompletionWithPoints {
    pub user_id: Uuid,
    pub points: i64,
    pub completed_at: DateTime<Utc>,
}

/// Per-item aggregation for the progress view.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ItemProgress {
    pub daily_item_id: Uuid,
    pub quest_name: String,
    pub difficulty: QuestDifficulty,
    pub category: QuestCategory,
    pub points: i64,
    pub completed_count: i64,
}

impl QuestCompletion {
    /// Idempotent insert. Returns whether a row was actually written; a
    /// pre-existing (user, item) pair leaves the table untouched. Runs on a
    /// transaction connection so the caller can pair it with the team
    /// balance update.
    pub async fn insert_ignore(
        conn: &mut SqliteConnection,
        user_id: Uuid,
        daily_item_id: Uuid,
        completed_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT OR IGNORE INTO quest_completions (id, user_id, daily_item_id, completed_at)
            VALUES ($1, $2, $3, $4)"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(daily_item_id)
        .bind(completed_at)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_set(
        pool: &SqlitePool,
        daily_set_id: Uuid,
    ) -> Result<Vec<CompletionWithPoints>, sqlx::Error> {
        sqlx::query_as::<_, CompletionWithPoints>(
            r#"SELECT qc.user_id, q.points, qc.completed_at
            FROM quest_completions qc
            JOIN daily_quest_items di ON di.id = qc.daily_item_id
            JOIN quests q ON q.id = di.quest_id
            WHERE di.daily_set_id = $1"#,
        )
        .bind(daily_set_id)
        .fetch_all(pool)
        .await
    }

    pub async fn progress_for_set(
        pool: &SqlitePool,
        daily_set_id: Uuid,
    ) -> Result<Vec<ItemProgress>, sqlx::Error> {
        sqlx::query_as::<_, ItemProgress>(
            r#"SELECT
                di.id AS daily_item_id,
                q.name AS quest_name,
                q.difficulty,
                q.category,
                q.points,
                COUNT(DISTINCT qc.user_id) AS completed_count
            FROM daily_quest_items di
            JOIN quests q ON q.id = di.quest_id
            LEFT JOIN quest_completions qc ON qc.daily_item_id = di.id
            WHERE di.daily_set_id = $1
            GROUP BY di.id, q.name, q.difficulty, q.category, q.points
            ORDER BY di.position"#,
        )
        .bind(daily_set_id)
        .fetch_all(pool)
        .await
    }
}
