use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::StashError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    fn weight(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VoteSummary {
    pub upvotes: i64,
    pub downvotes: i64,
    /// Whether the email already held this vote. Derived from set
    /// membership, not from comparing counts before and after.
    pub already_voted: bool,
}

/// Vote and bookmark state transitions, all keyed by document id.
#[derive(Debug, Clone)]
pub struct EngagementDb {
    pool: SqlitePool,
}

impl EngagementDb {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn document_exists(&self, id: Uuid) -> Result<bool, StashError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM documents WHERE id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Cast or move a vote. A single upsert keeps "one vote per email" a
    /// database invariant and makes the move-not-add transition atomic, so
    /// concurrent votes from different users cannot clobber each other.
    pub async fn vote(
        &self,
        id: Uuid,
        email: &str,
        direction: VoteDirection,
    ) -> Result<VoteSummary, StashError> {
        if !self.document_exists(id).await? {
            return Err(StashError::NotFound("Document not found".to_string()));
        }

        let already_voted = self.vote_of(id, email).await? == Some(direction);

        sqlx::query(
            "INSERT INTO votes(document_id, email, vote) VALUES(?, ?, ?)
             ON CONFLICT(document_id, email) DO UPDATE SET vote = excluded.vote",
        )
        .bind(id)
        .bind(email)
        .bind(direction.weight())
        .execute(&self.pool)
        .await?;

        let (upvotes, downvotes) = self.vote_counts(id).await?;

        Ok(VoteSummary {
            upvotes,
            downvotes,
            already_voted,
        })
    }

    /// Toggle bookmark membership. Returns the state after the toggle.
    pub async fn toggle_bookmark(&self, id: Uuid, email: &str) -> Result<bool, StashError> {
        if !self.document_exists(id).await? {
            return Err(StashError::NotFound("Document not found".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM bookmarks WHERE document_id = ? AND email = ?")
            .bind(id)
            .bind(email)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let bookmarked = if removed == 0 {
            sqlx::query("INSERT INTO bookmarks(document_id, email) VALUES(?, ?)")
                .bind(id)
                .bind(email)
                .execute(&mut *tx)
                .await?;
            true
        } else {
            false
        };

        tx.commit().await?;
        Ok(bookmarked)
    }

    pub async fn vote_counts(&self, id: Uuid) -> Result<(i64, i64), StashError> {
        let upvotes = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM votes WHERE document_id = ? AND vote = 1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let downvotes = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM votes WHERE document_id = ? AND vote = -1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok((upvotes, downvotes))
    }

    pub async fn vote_of(
        &self,
        id: Uuid,
        email: &str,
    ) -> Result<Option<VoteDirection>, StashError> {
        let weight = sqlx::query_scalar::<_, i64>(
            "SELECT vote FROM votes WHERE document_id = ? AND email = ?",
        )
        .bind(id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(weight.map(|w| {
            if w > 0 {
                VoteDirection::Up
            } else {
                VoteDirection::Down
            }
        }))
    }

    pub async fn is_bookmarked(&self, id: Uuid, email: &str) -> Result<bool, StashError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookmarks WHERE document_id = ? AND email = ?",
        )
        .bind(id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}
