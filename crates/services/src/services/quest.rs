//! Quest engine: daily set management, completion tracking with point
//! accrual, progress aggregation and MVP ranking.
//!
//! Concurrency-sensitive writes never check-then-act: daily set creation
//! relies on UNIQUE(team_id, date) with a fetch fallback, and completion
//! inserts go through INSERT OR IGNORE paired with the balance update in one
//! transaction.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use db::models::{
    daily_quest_set::{DailyItemContext, DailyItemView, DailyQuestSet},
    notification::NotificationKind,
    quest::{Quest, QuestDifficulty},
    quest_completion::{ItemProgress, QuestCompletion},
    team::{Team, TeamMember},
};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::notification::NotificationService;

/// Items per daily set.
const SET_SIZE: usize = 4;

/// A team gains a rank every this many points; crossing the boundary emits
/// `team_rank_up`.
const RANK_POINT_STEP: i64 = 500;

#[derive(Debug, Error)]
pub enum QuestServiceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("team not found")]
    TeamNotFound,
    #[error("daily quest item not found")]
    ItemNotFound,
    #[error("item belongs to another team")]
    PermissionDenied,
    #[error("item is not part of today's quest set")]
    Stale,
    #[error("not enough active quests in the catalog")]
    CatalogUnavailable,
}

/// Today's set with item views for one viewer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TodaySet {
    pub set: DailyQuestSet,
    pub items: Vec<DailyItemView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CompletionOutcome {
    pub already_completed: bool,
    pub points_gained: i64,
    pub team_points: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TodayProgress {
    pub member_count: i64,
    pub items: Vec<ItemProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct MvpEntry {
    pub user_id: Uuid,
    pub total_points: i64,
    pub first_completion_time: DateTime<Utc>,
}

pub struct QuestService;

impl QuestService {
    /// Resolve the caller's team via membership.
    pub async fn team_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Uuid, QuestServiceError> {
        TeamMember::find_team_id(pool, user_id)
            .await?
            .ok_or(QuestServiceError::TeamNotFound)
    }

    /// Fetch today's set for the team, creating it (4 items drawn from the
    /// active catalog) if this is the first access of the day. Repeated
    /// calls within a day return the same set.
    pub async fn get_or_create_today_set(
        pool: &SqlitePool,
        team_id: Uuid,
        viewer: Uuid,
    ) -> Result<TodaySet, QuestServiceError> {
        let today = Utc::now().date_naive();
        let set = Self::get_or_create_set(pool, team_id, today).await?;
        let items = DailyQuestSet::items(pool, set.id, viewer).await?;
        Ok(TodaySet { set, items })
    }

    /// Record a completion and credit the quest's points to the team, both
    /// in one transaction. A duplicate (user, item) pair is an idempotent
    /// success, not an error.
    pub async fn complete(
        pool: &SqlitePool,
        user_id: Uuid,
        daily_item_id: Uuid,
    ) -> Result<CompletionOutcome, QuestServiceError> {
        let team_id = Self::team_for_user(pool, user_id).await?;

        let ctx = DailyItemContext::find(pool, daily_item_id)
            .await?
            .ok_or(QuestServiceError::ItemNotFound)?;

        if ctx.team_id != team_id {
            return Err(QuestServiceError::PermissionDenied);
        }

        let today = Utc::now().date_naive();
        if ctx.date != today {
            return Err(QuestServiceError::Stale);
        }

        let completed_at = Utc::now();
        let mut tx = pool.begin().await?;

        let inserted =
            QuestCompletion::insert_ignore(&mut tx, user_id, daily_item_id, completed_at).await?;

        if !inserted {
            tx.rollback().await?;
            let team = Team::find_by_id(pool, team_id)
                .await?
                .ok_or(QuestServiceError::TeamNotFound)?;
            return Ok(CompletionOutcome {
                already_completed: true,
                points_gained: 0,
                team_points: team.points,
            });
        }

        let new_balance = Team::add_points(&mut tx, team_id, ctx.points).await?;
        tx.commit().await?;

        info!(
            user_id = %user_id,
            team_id = %team_id,
            daily_item_id = %daily_item_id,
            points = ctx.points,
            team_points = new_balance,
            "quest completed"
        );

        Self::emit_completion_events(pool, team_id, user_id, &ctx, new_balance).await;

        Ok(CompletionOutcome {
            already_completed: false,
            points_gained: ctx.points,
            team_points: new_balance,
        })
    }

    /// Per-item completion counts vs. team size for today's set. Creates the
    /// set if this is the first access of the day.
    pub async fn get_today_progress(
        pool: &SqlitePool,
        team_id: Uuid,
    ) -> Result<TodayProgress, QuestServiceError> {
        let today = Utc::now().date_naive();
        let set = Self::get_or_create_set(pool, team_id, today).await?;

        let items = QuestCompletion::progress_for_set(pool, set.id).await?;
        let member_count = Team::member_count(pool, team_id).await?;

        Ok(TodayProgress {
            member_count,
            items,
        })
    }

    /// Today's top point-earner for the team. Ties go to the user whose
    /// earliest contributing completion is oldest; a residual timestamp tie
    /// falls back to user id so the result is a pure function of the rows.
    /// `None` when nothing has been completed today.
    pub async fn get_today_mvp(
        pool: &SqlitePool,
        team_id: Uuid,
    ) -> Result<Option<MvpEntry>, QuestServiceError> {
        Team::find_by_id(pool, team_id)
            .await?
            .ok_or(QuestServiceError::TeamNotFound)?;

        let today = Utc::now().date_naive();
        let Some(set) = DailyQuestSet::find_by_team_and_date(pool, team_id, today).await? else {
            return Ok(None);
        };

        let completions = QuestCompletion::list_for_set(pool, set.id).await?;
        if completions.is_empty() {
            return Ok(None);
        }

        let mut totals: Vec<MvpEntry> = Vec::new();
        for row in completions {
            match totals.iter_mut().find(|e| e.user_id == row.user_id) {
                Some(entry) => {
                    entry.total_points += row.points;
                    if row.completed_at < entry.first_completion_time {
                        entry.first_completion_time = row.completed_at;
                    }
                }
                None => totals.push(MvpEntry {
                    user_id: row.user_id,
                    total_points: row.points,
                    first_completion_time: row.completed_at,
                }),
            }
        }

        totals.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then(a.first_completion_time.cmp(&b.first_completion_time))
                .then(a.user_id.cmp(&b.user_id))
        });

        Ok(totals.into_iter().next())
    }

    async fn get_or_create_set(
        pool: &SqlitePool,
        team_id: Uuid,
        date: NaiveDate,
    ) -> Result<DailyQuestSet, QuestServiceError> {
        Team::find_by_id(pool, team_id)
            .await?
            .ok_or(QuestServiceError::TeamNotFound)?;

        if let Some(set) = DailyQuestSet::find_by_team_and_date(pool, team_id, date).await? {
            return Ok(set);
        }

        let active = Quest::find_active(pool).await?;
        let quest_ids = select_quest_ids(&active, team_id, date)?;

        match DailyQuestSet::insert_with_items(pool, team_id, date, &quest_ids).await {
            Ok(set) => {
                info!(team_id = %team_id, date = %date, set_id = %set.id, "daily quest set created");
                Ok(set)
            }
            Err(e) if is_unique_violation(&e) => {
                // A concurrent first-visit won the race; use its set.
                DailyQuestSet::find_by_team_and_date(pool, team_id, date)
                    .await?
                    .ok_or(QuestServiceError::Database(sqlx::Error::RowNotFound))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Notifications are fire-and-forget relative to the committed
    /// completion; failures are logged, never propagated.
    async fn emit_completion_events(
        pool: &SqlitePool,
        team_id: Uuid,
        user_id: Uuid,
        ctx: &DailyItemContext,
        new_balance: i64,
    ) {
        let payload = serde_json::json!({
            "user_id": user_id,
            "daily_item_id": ctx.daily_item_id,
            "quest_name": ctx.quest_name,
            "points": ctx.points,
        });
        let message = format!("Quest clear: {} (+{}pt)", ctx.quest_name, ctx.points);

        if let Err(e) = NotificationService::notify(
            pool,
            team_id,
            NotificationKind::MemberCompleted,
            &message,
            payload,
        )
        .await
        {
            warn!(team_id = %team_id, error = %e, "failed to record member_completed");
        }

        let old_balance = new_balance - ctx.points;
        if old_balance / RANK_POINT_STEP < new_balance / RANK_POINT_STEP {
            let rank = new_balance / RANK_POINT_STEP;
            let payload = serde_json::json!({
                "rank": rank,
                "team_points": new_balance,
            });
            let message = format!("Team rank up! Reached rank {rank}");

            if let Err(e) = NotificationService::notify(
                pool,
                team_id,
                NotificationKind::TeamRankUp,
                &message,
                payload,
            )
            .await
            {
                warn!(team_id = %team_id, error = %e, "failed to record team_rank_up");
            }
        }
    }
}

/// Pick 4 distinct active quests: 2 easy, 1 normal, 1 hard, back-filling
/// from the rest of the catalog when a difficulty bucket runs short. The RNG
/// is seeded from (team_id, date) so a team's draw is stable within a day.
fn select_quest_ids(
    active: &[Quest],
    team_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<Uuid>, QuestServiceError> {
    if active.len() < SET_SIZE {
        return Err(QuestServiceError::CatalogUnavailable);
    }

    let mut rng = StdRng::seed_from_u64(selection_seed(team_id, date));
    let mut chosen: Vec<Uuid> = Vec::with_capacity(SET_SIZE);

    for (difficulty, want) in [
        (QuestDifficulty::Easy, 2),
        (QuestDifficulty::Normal, 1),
        (QuestDifficulty::Hard, 1),
    ] {
        let bucket: Vec<&Quest> = active.iter().filter(|q| q.difficulty == difficulty).collect();
        chosen.extend(bucket.choose_multiple(&mut rng, want).map(|q| q.id));
    }

    if chosen.len() < SET_SIZE {
        let remaining: Vec<Uuid> = active
            .iter()
            .map(|q| q.id)
            .filter(|id| !chosen.contains(id))
            .collect();
        chosen.extend(
            remaining
                .choose_multiple(&mut rng, SET_SIZE - chosen.len())
                .copied(),
        );
    }

    Ok(chosen)
}

fn selection_seed(team_id: Uuid, date: NaiveDate) -> u64 {
    let id = team_id.as_u128();
    (id as u64) ^ ((id >> 64) as u64) ^ (date.num_days_from_ce() as u64)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
