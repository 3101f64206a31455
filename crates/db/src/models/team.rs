use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// Team row. `points` is the monotonically increasing balance credited by
/// quest completions.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

/// Membership row. The quest core never mutates membership; `add` exists for
/// the teams module and test fixtures.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TeamMember {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub async fn create(pool: &SqlitePool, name: &str) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Team>(
            r#"INSERT INTO teams (id, name)
            VALUES ($1, $2)
            RETURNING id, name, points, created_at"#,
        )
        .bind(id)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Team>(
            r#"SELECT id, name, points, created_at FROM teams WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Credit points to the team and return the new balance. Runs on a
    /// transaction connection so the credit commits together with the
    /// completion row.
    pub async fn add_points(
        conn: &mut SqliteConnection,
        id: Uuid,
        points: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"UPDATE teams SET points = points + $2 WHERE id = $1 RETURNING points"#,
        )
        .bind(id)
        .bind(points)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn member_count(pool: &SqlitePool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM team_members WHERE team_id = $1"#)
            .bind(team_id)
            .fetch_one(pool)
            .await
    }
}

impl TeamMember {
    pub async fn add(
        pool: &SqlitePool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query_as::<_, TeamMember>(
            r#"INSERT INTO team_members (id, team_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, team_id, user_id, created_at"#,
        )
        .bind(id)
        .bind(team_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_team_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"SELECT team_id FROM team_members WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
