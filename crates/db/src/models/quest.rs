use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display,
)]
#[sqlx(type_name = "quest_difficulty", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuestDifficulty {
    Easy,
    Normal,
    Hard,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display,
)]
#[sqlx(type_name = "quest_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuestCategory {
    Stretch,
    Muscle,
}

/// Catalog reference row. Identity is (name, difficulty); rows are only
/// written by the seeder.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Quest {
    pub id: Uuid,
    pub name: String,
    pub difficulty: QuestDifficulty,
    pub category: QuestCategory,
    pub points: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quest {
    pub async fn find_active(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Quest>(
            r#"SELECT id, name, difficulty, category, points, is_active, created_at, updated_at
            FROM quests
            WHERE is_active = 1
            ORDER BY difficulty, name"#,
        )
        .fetch_all(pool)
        .await
    }

    /// Idempotent upsert keyed by (name, difficulty). Returns the row and
    /// whether it was newly created. Category, points and the active flag are
    /// unconditionally reapplied on conflict.
    pub async fn upsert(
        conn: &mut SqliteConnection,
        name: &str,
        difficulty: QuestDifficulty,
        category: QuestCategory,
        points: i64,
        is_active: bool,
    ) -> Result<(Self, bool), sqlx::Error> {
        let updated = sqlx::query_as::<_, Quest>(
            r#"UPDATE quests
            SET category = $3, points = $4, is_active = $5, updated_at = CURRENT_TIMESTAMP
            WHERE name = $1 AND difficulty = $2
            RETURNING id, name, difficulty, category, points, is_active, created_at, updated_at"#,
        )
        .bind(name)
        .bind(difficulty)
        .bind(category)
        .bind(points)
        .bind(is_active)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(quest) = updated {
            return Ok((quest, false));
        }

        let id = Uuid::new_v4();
        let created = sqlx::query_as::<_, Quest>(
            r#"INSERT INTO quests (id, name, difficulty, category, points, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, difficulty, category, points, is_active, created_at, updated_at"#,
        )
        .bind(id)
        .bind(name)
        .bind(difficulty)
        .bind(category)
        .bind(points)
        .bind(is_active)
        .fetch_one(&mut *conn)
        .await?;

        Ok((created, true))
    }
}
