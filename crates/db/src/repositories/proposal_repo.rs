//! Repository for the `proposals` table.

use std::collections::HashMap;

use sqlx::PgPool;
use titulacion_core::proposal::{ProposalState, ProposalType};
use titulacion_core::types::DbId;

use crate::models::observation::{Observation, ObservationWithAuthor};
use crate::models::proposal::{CreateProposal, Proposal, ProposalDetail, ProposalFilter};
use crate::repositories::{ObservationRepo, StudentRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, student_id, kind, idea_number, topic, objectives, problem, \
    research_area, scope, attachment, deadline, state, created_at, updated_at";

/// Provides CRUD operations for proposals and their embedded read shapes.
pub struct ProposalRepo;

impl ProposalRepo {
    /// Insert a new proposal in `pendiente` state, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProposal) -> Result<Proposal, sqlx::Error> {
        let query = format!(
            "INSERT INTO proposals
                (student_id, kind, idea_number, topic, objectives, problem,
                 research_area, scope, attachment, deadline, state)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pendiente')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(input.student_id)
            .bind(input.kind.as_str())
            .bind(input.idea_number)
            .bind(&input.topic)
            .bind(&input.objectives)
            .bind(&input.problem)
            .bind(&input.research_area)
            .bind(&input.scope)
            .bind(&input.attachment)
            .bind(input.deadline)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Number of proposals of `kind` held by a student.
    pub async fn count_for_student(
        pool: &PgPool,
        student_id: DbId,
        kind: ProposalType,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM proposals WHERE student_id = $1 AND kind = $2",
        )
        .bind(student_id)
        .bind(kind.as_str())
        .fetch_one(pool)
        .await
    }

    /// A student's proposals, newest first.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposals
             WHERE student_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }

    /// All proposals matching the optional filters, newest first.
    pub async fn list(pool: &PgPool, filter: &ProposalFilter) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposals
             WHERE ($1::TEXT IS NULL OR state = $1)
               AND ($2::TEXT IS NULL OR kind = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(filter.state.map(ProposalState::as_str))
            .bind(filter.kind.map(ProposalType::as_str))
            .fetch_all(pool)
            .await
    }

    /// Overwrite a proposal's state and, when `comment` is given, append an
    /// observation by `author_id` in the same transaction.
    ///
    /// Returns `None` if no proposal with `id` exists.
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        state: ProposalState,
        author_id: DbId,
        comment: Option<&str>,
    ) -> Result<Option<(Proposal, Option<Observation>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE proposals SET state = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(proposal) = sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .bind(state.as_str())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let observation = match comment {
            Some(text) => Some(ObservationRepo::create(&mut *tx, id, author_id, text).await?),
            None => None,
        };

        tx.commit().await?;
        Ok(Some((proposal, observation)))
    }

    /// Embed the observation log (and optionally the student identity) into
    /// each proposal, preserving input order.
    pub async fn with_details(
        pool: &PgPool,
        proposals: Vec<Proposal>,
        include_student: bool,
    ) -> Result<Vec<ProposalDetail>, sqlx::Error> {
        if proposals.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<DbId> = proposals.iter().map(|p| p.id).collect();
        let mut observations: HashMap<DbId, Vec<ObservationWithAuthor>> = HashMap::new();
        for obs in ObservationRepo::list_for_proposals(pool, &ids).await? {
            observations.entry(obs.proposal_id).or_default().push(obs);
        }

        let mut students = HashMap::new();
        if include_student {
            let mut student_ids: Vec<DbId> = proposals.iter().map(|p| p.student_id).collect();
            student_ids.sort_unstable();
            student_ids.dedup();
            for identity in StudentRepo::identities(pool, &student_ids).await? {
                students.insert(identity.id, identity);
            }
        }

        Ok(proposals
            .into_iter()
            .map(|proposal| ProposalDetail {
                student: students.get(&proposal.student_id).cloned(),
                observations: observations.remove(&proposal.id).unwrap_or_default(),
                proposal,
            })
            .collect())
    }

    /// Fetch one proposal with student identity and observations embedded.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<ProposalDetail>, sqlx::Error> {
        let Some(proposal) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        Ok(Self::with_details(pool, vec![proposal], true).await?.pop())
    }
}
