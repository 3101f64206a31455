use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

use super::quest::{QuestCategory, QuestDifficulty};

/// One team's quest set for one calendar date. Created lazily on first
/// access for that team/day and never deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DailyQuestSet {
    pub id: Uuid,
    pub team_id: Uuid,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Item of a daily set, immutable once created.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DailyQuestItem {
    pub id: Uuid,
    pub daily_set_id: Uuid,
    pub quest_id: Uuid,
    pub position: i64,
}

/// Item joined with its quest row, plus a per-viewer completion flag.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DailyItemView {
    pub daily_item_id: Uuid,
    pub quest_id: Uuid,
    pub position: i64,
    pub quest_name: String,
    pub difficulty: QuestDifficulty,
    pub category: QuestCategory,
    pub points: i64,
    pub completed_by_me: bool,
}

/// Everything the completion tracker needs to validate one item.
#[derive(Debug, Clone, FromRow)]
pub struct DailyItemContext {
    pub daily_item_id: Uuid,
    pub daily_set_id: Uuid,
    pub team_id: Uuid,
    pub date: NaiveDate,
    pub quest_name: String,
    pub points: i64,
}

impl DailyQuestSet {
    pub async fn find_by_team_and_date(
        pool: &SqlitePool,
        team_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, DailyQuestSet>(
            r#"SELECT id, team_id, date, created_at
            FROM daily_quest_sets
            WHERE team_id = $1 AND date = $2"#,
        )
        .bind(team_id)
        .bind(date)
        .fetch_optional(pool)
        .await
    }

    /// Insert a set with its items in one transaction. Surfaces the
    /// UNIQUE(team_id, date) violation unchanged so the caller can fall back
    /// to fetching the winner's set.
    pub async fn insert_with_items(
        pool: &SqlitePool,
        team_id: Uuid,
        date: NaiveDate,
        quest_ids: &[Uuid],
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id = Uuid::new_v4();
        let set = sqlx::query_as::<_, DailyQuestSet>(
            r#"INSERT INTO daily_quest_sets (id, team_id, date)
            VALUES ($1, $2, $3)
            RETURNING id, team_id, date, created_at"#,
        )
        .bind(id)
        .bind(team_id)
        .bind(date)
        .fetch_one(&mut *tx)
        .await?;

        for (position, quest_id) in quest_ids.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO daily_quest_items (id, daily_set_id, quest_id, position)
                VALUES ($1, $2, $3, $4)"#,
            )
            .bind(Uuid::new_v4())
            .bind(set.id)
            .bind(quest_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(set)
    }

    pub async fn items(
        pool: &SqlitePool,
        daily_set_id: Uuid,
        viewer: Uuid,
    ) -> Result<Vec<DailyItemView>, sqlx::Error> {
        sqlx::query_as::<_, DailyItemView>(
            r#"SELECT
                di.id AS daily_item_id,
                di.quest_id,
                di.position,
                q.name AS quest_name,
                q.difficulty,
                q.category,
                q.points,
                EXISTS(
                    SELECT 1 FROM quest_completions qc
                    WHERE qc.daily_item_id = di.id AND qc.user_id = $2
                ) AS completed_by_me
            FROM daily_quest_items di
            JOIN quests q ON q.id = di.quest_id
            WHERE di.daily_set_id = $1
            ORDER BY di.position"#,
        )
        .bind(daily_set_id)
        .bind(viewer)
        .fetch_all(pool)
        .await
    }
}

impl DailyItemContext {
    pub async fn find(
        pool: &SqlitePool,
        daily_item_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, DailyItemContext>(
            r#"SELECT
                di.id AS daily_item_id,
                ds.id AS daily_set_id,
                ds.team_id,
                ds.date,
                q.name AS quest_name,
                q.points
            FROM daily_quest_items di
            JOIN daily_quest_sets ds ON ds.id = di.daily_set_id
            JOIN quests q ON q.id = di.quest_id
            WHERE di.id = $1"#,
        )
        .bind(daily_item_id)
        .fetch_optional(pool)
        .await
    }
}
