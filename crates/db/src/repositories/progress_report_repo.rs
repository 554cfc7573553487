//! Repository for the `progress_reports` table.

use sqlx::PgPool;
use titulacion_core::types::{DbId, Timestamp};

use crate::models::progress_report::{
    CreateProgressReport, ProgressReport, ProgressReportDetail,
};
use crate::models::user::PersonName;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, proposal_id, tutor_id, director_id, coordinator_id, week, content, \
    percent_complete, start_date, due_date, actual_submit_date, grade, review_confirmed, \
    state, created_at, updated_at";

/// Name of the unique key over `(proposal_id, week)`.
pub const WEEK_SLOT_CONSTRAINT: &str = "uq_progress_reports_proposal_week";

/// Provides CRUD operations for weekly progress reports.
pub struct ProgressReportRepo;

impl ProgressReportRepo {
    /// Insert a new report in `pendiente` state.
    ///
    /// A second report for the same `(proposal_id, week)` fails with a
    /// unique violation on [`WEEK_SLOT_CONSTRAINT`].
    pub async fn create(
        pool: &PgPool,
        input: &CreateProgressReport,
    ) -> Result<ProgressReport, sqlx::Error> {
        let query = format!(
            "INSERT INTO progress_reports
                (proposal_id, tutor_id, director_id, coordinator_id, week, content,
                 percent_complete, start_date, due_date, actual_submit_date, state)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pendiente')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProgressReport>(&query)
            .bind(input.proposal_id)
            .bind(input.tutor_id)
            .bind(input.director_id)
            .bind(input.coordinator_id)
            .bind(input.week)
            .bind(&input.content)
            .bind(input.percent_complete)
            .bind(input.start_date)
            .bind(input.due_date)
            .bind(input.actual_submit_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProgressReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM progress_reports WHERE id = $1");
        sqlx::query_as::<_, ProgressReport>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a report with the owning student's and the tutor's names.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProgressReportDetail>, sqlx::Error> {
        let Some(report) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let student = sqlx::query_as::<_, PersonName>(
            "SELECT u.first_names, u.last_names
             FROM proposals p
             INNER JOIN students s ON s.id = p.student_id
             INNER JOIN users u ON u.id = s.user_id
             WHERE p.id = $1",
        )
        .bind(report.proposal_id)
        .fetch_optional(pool)
        .await?;

        let tutor = match report.tutor_id {
            Some(tutor_id) => {
                sqlx::query_as::<_, PersonName>(
                    "SELECT u.first_names, u.last_names
                     FROM tutors t
                     INNER JOIN users u ON u.id = t.user_id
                     WHERE t.id = $1",
                )
                .bind(tutor_id)
                .fetch_optional(pool)
                .await?
            }
            None => None,
        };

        Ok(Some(ProgressReportDetail {
            report,
            student,
            tutor,
        }))
    }

    /// True if the `(proposal_id, week)` slot is already taken.
    pub async fn exists_for_week(
        pool: &PgPool,
        proposal_id: DbId,
        week: i32,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM progress_reports WHERE proposal_id = $1 AND week = $2)",
        )
        .bind(proposal_id)
        .bind(week)
        .fetch_one(pool)
        .await
    }

    /// All reports for a proposal, ordered by week ascending.
    pub async fn list_for_proposal(
        pool: &PgPool,
        proposal_id: DbId,
    ) -> Result<Vec<ProgressReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM progress_reports
             WHERE proposal_id = $1
             ORDER BY week ASC"
        );
        sqlx::query_as::<_, ProgressReport>(&query)
            .bind(proposal_id)
            .fetch_all(pool)
            .await
    }

    /// Raw state strings of every report on a proposal.
    pub async fn states_for_proposal(
        pool: &PgPool,
        proposal_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT state FROM progress_reports WHERE proposal_id = $1")
            .bind(proposal_id)
            .fetch_all(pool)
            .await
    }

    /// Record a submission: new content, delivery date and `entregado` state.
    ///
    /// With `require_pending` the update only applies to a `pendiente` row.
    /// Returns `None` if no row matched.
    pub async fn submit(
        pool: &PgPool,
        id: DbId,
        content: &str,
        submitted_at: Timestamp,
        require_pending: bool,
    ) -> Result<Option<ProgressReport>, sqlx::Error> {
        let query = format!(
            "UPDATE progress_reports
             SET content = $2, actual_submit_date = $3, state = 'entregado'
             WHERE id = $1 AND (NOT $4 OR state = 'pendiente')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProgressReport>(&query)
            .bind(id)
            .bind(content)
            .bind(submitted_at)
            .bind(require_pending)
            .fetch_optional(pool)
            .await
    }

    /// Grade an `entregado` report and move it to `revisado`.
    ///
    /// Returns `None` if the row is absent or not in `entregado` state.
    pub async fn grade(
        pool: &PgPool,
        id: DbId,
        grade: f64,
        review_confirmed: bool,
    ) -> Result<Option<ProgressReport>, sqlx::Error> {
        let query = format!(
            "UPDATE progress_reports
             SET grade = $2, review_confirmed = $3, state = 'revisado'
             WHERE id = $1 AND state = 'entregado'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProgressReport>(&query)
            .bind(id)
            .bind(grade)
            .bind(review_confirmed)
            .fetch_optional(pool)
            .await
    }
}
