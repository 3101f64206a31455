//! Quest catalog seeding. The catalog is fixed reference data; re-running
//! the seeder is safe and reports created/updated counts.

use db::models::quest::{
    Quest, QuestCategory,
    QuestCategory::{Muscle, Stretch},
    QuestDifficulty,
    QuestDifficulty::{Easy, Hard, Normal},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

/// (difficulty, name, category, points). Easy quests are worth 10, normal
/// 40, hard 100.
pub const QUEST_CATALOG: &[(QuestDifficulty, &str, QuestCategory, i64)] = &[
    (Easy, "Morning full-body stretch, 3 min", Stretch, 10),
    (Easy, "Calf raises x30", Muscle, 10),
    (Easy, "Chair-hover squats x15", Muscle, 10),
    (Easy, "Wall push-ups x20", Muscle, 10),
    (Easy, "Flat-tummy hold, 1 min", Muscle, 10),
    (Easy, "Shoulder blade rolls x20 each way", Stretch, 10),
    (Easy, "Lying leg openers x30", Muscle, 10),
    (Easy, "Toe curls x50", Stretch, 10),
    (Easy, "Waist twists x30", Stretch, 10),
    (Easy, "Shoulder shrug release x20", Stretch, 10),
    (Normal, "Squats x30", Muscle, 40),
    (Normal, "Knee push-ups x20", Muscle, 40),
    (Normal, "Plank, 1 min", Muscle, 40),
    (Normal, "Sit-up curls x30", Muscle, 40),
    (Normal, "Fast high knees, 1 min", Muscle, 40),
    (Normal, "Side-to-side plank, 1 min", Muscle, 40),
    (Normal, "Cross crunches x30", Muscle, 40),
    (Normal, "Twisting mountain climbers, 1 min", Muscle, 40),
    (Normal, "Reverse plank, 1 min", Muscle, 40),
    (Normal, "Cross-touch crunches x30", Muscle, 40),
    (Hard, "Push-ups x30", Muscle, 100),
    (Hard, "V-sit crunches x25", Muscle, 100),
    (Hard, "Jumping lunges x30", Muscle, 100),
    (Hard, "Slow wide squats x20", Muscle, 100),
    (Hard, "Tuck jumps x20", Muscle, 100),
    (Hard, "Side-step push-ups x30", Muscle, 100),
    (Hard, "Jump squats x30", Muscle, 100),
    (Hard, "Star jumps x30", Muscle, 100),
    (Hard, "Shadow boxing, 3 min", Muscle, 100),
    (Hard, "Burpees x20", Muscle, 100),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSummary {
    pub created: usize,
    pub updated: usize,
    pub total: usize,
}

/// Upsert the whole catalog in one transaction, keyed by (name, difficulty).
/// Unchanged rows still count as updated since the defaults are reapplied
/// unconditionally.
pub async fn upsert_quests(
    pool: &SqlitePool,
    is_active: bool,
) -> Result<SeedSummary, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let mut created = 0;
    let mut updated = 0;

    for &(difficulty, name, category, points) in QUEST_CATALOG {
        let (_, was_created) =
            Quest::upsert(&mut tx, name, difficulty, category, points, is_active).await?;
        if was_created {
            created += 1;
        } else {
            updated += 1;
        }
    }

    tx.commit().await?;

    let summary = SeedSummary {
        created,
        updated,
        total: QUEST_CATALOG.len(),
    };

    info!(
        created = summary.created,
        updated = summary.updated,
        total = summary.total,
        "quest catalog seeded"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use db::DBService;
    use tempfile::TempDir;

    use super::*;

    async fn test_pool(dir: &TempDir) -> SqlitePool {
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        DBService::new(&url).await.unwrap().pool
    }

    #[tokio::test]
    async fn second_run_reports_no_creates() {
        let dir = TempDir::new().unwrap();
        let pool = test_pool(&dir).await;

        let first = upsert_quests(&pool, true).await.unwrap();
        assert_eq!(first.created, QUEST_CATALOG.len());
        assert_eq!(first.updated, 0);
        assert_eq!(first.total, QUEST_CATALOG.len());

        let second = upsert_quests(&pool, true).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, second.total);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quests")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count as usize, QUEST_CATALOG.len());
    }

    #[tokio::test]
    async fn inactive_flag_is_applied_on_rerun() {
        let dir = TempDir::new().unwrap();
        let pool = test_pool(&dir).await;

        upsert_quests(&pool, true).await.unwrap();
        upsert_quests(&pool, false).await.unwrap();

        let active: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quests WHERE is_active = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(active, 0);
    }
}
