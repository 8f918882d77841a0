//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{IDEA_COLUMNS, IdeaRow, UserRow};
use super::{
    IdeaQuery, IdeaRepository, IdeaWithVotes, StreamSummary, UserRepository, Visibility,
    VoteLedger,
};
use crate::config::AppConfig;
use crate::domain::{
    BulkTarget, Idea, IdeaId, IdeaStatus, ProfileUpdate, UserProfile, Vote, VoteInsert,
};
use crate::error::ApiError;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily connecting pool from the configured limits.
    ///
    /// # Errors
    ///
    /// Returns a [`sqlx::Error`] if `database_url` cannot be parsed.
    pub fn connect_lazy(config: &AppConfig, database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect_lazy(database_url)?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`sqlx::migrate::MigrateError`] if a migration fails.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    fn select_ideas_with_votes(filter: &str, order_by: &str) -> String {
        format!(
            "SELECT {IDEA_COLUMNS}, COUNT(v.id) AS vote_count \
             FROM ideas i LEFT JOIN votes v ON v.idea_id = i.id \
             WHERE {filter} GROUP BY i.id ORDER BY {order_by}"
        )
    }
}

fn statuses_as_text(statuses: &[IdeaStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

fn ids_as_text(ids: &[IdeaId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_string()).collect()
}

#[async_trait]
impl IdeaRepository for PostgresStore {
    async fn insert_idea(&self, idea: &Idea) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO ideas (id, title, description, category, status, submitted_by, \
             submitted_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(idea.id.as_str())
        .bind(&idea.title)
        .bind(&idea.description)
        .bind(&idea.category)
        .bind(idea.status.as_str())
        .bind(&idea.submitted_by)
        .bind(idea.submitted_at)
        .bind(idea.created_at)
        .bind(idea.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_idea(&self, id: &IdeaId) -> Result<Option<IdeaWithVotes>, ApiError> {
        let sql = Self::select_ideas_with_votes("i.id = $1", "i.id");
        let row = sqlx::query_as::<_, IdeaRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(IdeaWithVotes::try_from).transpose()
    }

    async fn list_ideas(&self, query: &IdeaQuery) -> Result<Vec<IdeaWithVotes>, ApiError> {
        let (everything, owner) = match &query.visibility {
            Visibility::Everything => (true, None),
            Visibility::ApprovedOrOwnedBy(email) => (false, Some(email.as_str())),
            Visibility::ApprovedOnly => (false, None),
        };
        let sql = Self::select_ideas_with_votes(
            "($1::text IS NULL OR i.status = $1) \
             AND ($2 OR i.status = 'Approved' OR i.submitted_by = $3)",
            query.sort.order_by(),
        );
        let rows = sqlx::query_as::<_, IdeaRow>(&sql)
            .bind(query.status.map(IdeaStatus::as_str))
            .bind(everything)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(IdeaWithVotes::try_from).collect()
    }

    async fn list_by_statuses(&self, statuses: &[IdeaStatus]) -> Result<Vec<Idea>, ApiError> {
        let sql = format!("SELECT {IDEA_COLUMNS} FROM ideas i WHERE i.status = ANY($1)");
        let rows = sqlx::query_as::<_, IdeaRow>(&sql)
            .bind(statuses_as_text(statuses))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| IdeaWithVotes::try_from(row).map(|item| item.idea))
            .collect()
    }

    async fn update_idea(
        &self,
        idea: &Idea,
        expected: Option<IdeaStatus>,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query(
            "UPDATE ideas SET status = $2, updated_at = $3, scheduled_date = $4, \
             youtube_link = $5, approved_at = $6, scheduled_at = $7, live_at = $8, \
             completed_at = $9, rejected_at = $10 \
             WHERE id = $1 AND ($11::text IS NULL OR status = $11)",
        )
        .bind(idea.id.as_str())
        .bind(idea.status.as_str())
        .bind(idea.updated_at)
        .bind(idea.scheduled_date)
        .bind(idea.youtube_link.as_deref())
        .bind(idea.approved_at)
        .bind(idea.scheduled_at)
        .bind(idea.live_at)
        .bind(idea.completed_at)
        .bind(idea.rejected_at)
        .bind(expected.map(IdeaStatus::as_str))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn bulk_set_status(
        &self,
        ids: &[IdeaId],
        target: BulkTarget,
        now: DateTime<Utc>,
    ) -> Result<Vec<StreamSummary>, ApiError> {
        let rows = sqlx::query_as::<_, StreamSummary>(
            "UPDATE ideas SET status = $1, updated_at = $2, \
             live_at = CASE WHEN $1 = 'Live' THEN COALESCE(live_at, $2) ELSE live_at END, \
             completed_at = CASE WHEN $1 = 'Completed' THEN COALESCE(completed_at, $2) ELSE completed_at END \
             WHERE id = ANY($3) AND status = ANY($4) \
             RETURNING id, title, status",
        )
        .bind(target.status().as_str())
        .bind(now)
        .bind(ids_as_text(ids))
        .bind(statuses_as_text(&IdeaStatus::STREAM))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl VoteLedger for PostgresStore {
    async fn insert_vote(&self, vote: &Vote) -> Result<VoteInsert, ApiError> {
        let result = sqlx::query(
            "INSERT INTO votes (id, idea_id, user_email, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (idea_id, user_email) DO NOTHING",
        )
        .bind(&vote.id)
        .bind(vote.idea_id.as_str())
        .bind(&vote.voter_email)
        .bind(vote.created_at)
        .execute(&self.pool)
        .await?;
        Ok(if result.rows_affected() == 0 {
            VoteInsert::Duplicate
        } else {
            VoteInsert::Inserted
        })
    }

    async fn delete_vote(&self, idea_id: &IdeaId, voter_email: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM votes WHERE idea_id = $1 AND user_email = $2")
            .bind(idea_id.as_str())
            .bind(voter_email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_votes(&self, idea_id: &IdeaId) -> Result<i64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM votes WHERE idea_id = $1")
            .bind(idea_id.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn votes_by_voter(&self, voter_email: &str) -> Result<Vec<IdeaId>, ApiError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT idea_id FROM votes WHERE user_email = $1 ORDER BY created_at DESC",
        )
        .bind(voter_email)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(IdeaId::from).collect())
    }

    async fn approved_vote_counts(&self) -> Result<Vec<(IdeaId, i64)>, ApiError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT i.id, COUNT(v.id) FROM ideas i LEFT JOIN votes v ON v.idea_id = i.id \
             WHERE i.status = 'Approved' GROUP BY i.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, count)| (IdeaId::from(id), count))
            .collect())
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn find_user(&self, email: &str) -> Result<Option<UserProfile>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT email, name, first_name, last_name, bio, is_admin, created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserProfile::from))
    }

    async fn insert_user_if_absent(&self, profile: &UserProfile) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO users (email, name, is_admin, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT (email) DO NOTHING",
        )
        .bind(&profile.email)
        .bind(profile.name.as_deref())
        .bind(profile.is_admin)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn promote_admin(&self, email: &str, now: DateTime<Utc>) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET is_admin = TRUE, updated_at = $2 WHERE email = $1")
            .bind(email)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        email: &str,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<UserProfile>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET first_name = $2, last_name = $3, bio = $4, name = $5, \
             updated_at = $6 WHERE email = $1 \
             RETURNING email, name, first_name, last_name, bio, is_admin, created_at, updated_at",
        )
        .bind(email)
        .bind(update.first_name())
        .bind(update.last_name())
        .bind(update.bio())
        .bind(update.full_name())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserProfile::from))
    }
}
