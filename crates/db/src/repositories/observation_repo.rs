//! Repository for the `observations` table.

use sqlx::{PgConnection, PgPool};
use titulacion_core::types::DbId;

use crate::models::observation::{Observation, ObservationWithAuthor};

const COLUMNS: &str = "id, proposal_id, user_id, comment, created_at";

/// Observation columns plus the author's name (alias `o` / `u`).
const AUTHOR_COLUMNS: &str = "o.id, o.proposal_id, o.user_id, o.comment, o.created_at, \
    u.first_names AS author_first_names, u.last_names AS author_last_names";

pub struct ObservationRepo;

impl ObservationRepo {
    /// Append an observation. Takes a connection so it can join the
    /// transaction of a proposal decision.
    pub async fn create(
        conn: &mut PgConnection,
        proposal_id: DbId,
        user_id: DbId,
        comment: &str,
    ) -> Result<Observation, sqlx::Error> {
        let query = format!(
            "INSERT INTO observations (proposal_id, user_id, comment)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Observation>(&query)
            .bind(proposal_id)
            .bind(user_id)
            .bind(comment)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Observation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM observations WHERE id = $1");
        sqlx::query_as::<_, Observation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_with_author(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ObservationWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {AUTHOR_COLUMNS} FROM observations o
             INNER JOIN users u ON u.id = o.user_id
             WHERE o.id = $1"
        );
        sqlx::query_as::<_, ObservationWithAuthor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All observations on a proposal, oldest first.
    pub async fn list_for_proposal(
        pool: &PgPool,
        proposal_id: DbId,
    ) -> Result<Vec<ObservationWithAuthor>, sqlx::Error> {
        Self::list_for_proposals(pool, &[proposal_id]).await
    }

    /// Observations for a batch of proposals, oldest first.
    pub async fn list_for_proposals(
        pool: &PgPool,
        proposal_ids: &[DbId],
    ) -> Result<Vec<ObservationWithAuthor>, sqlx::Error> {
        let query = format!(
            "SELECT {AUTHOR_COLUMNS} FROM observations o
             INNER JOIN users u ON u.id = o.user_id
             WHERE o.proposal_id = ANY($1)
             ORDER BY o.created_at ASC, o.id ASC"
        );
        sqlx::query_as::<_, ObservationWithAuthor>(&query)
            .bind(proposal_ids)
            .fetch_all(pool)
            .await
    }

    /// Delete an observation. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM observations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
