//! Repository for the `prerequisites` and `student_prerequisites` tables.

use sqlx::PgPool;
use titulacion_core::types::DbId;

use crate::models::prerequisite::{
    CreatePrerequisite, Prerequisite, StudentPrerequisite, StudentPrerequisiteDetail,
};

/// Column list for prerequisites queries.
const COLUMNS: &str = "id, name, description, created_at, updated_at";

/// Column list for student_prerequisites queries.
const STATUS_COLUMNS: &str = "id, student_id, prerequisite_id, validation_state, \
    marked_at, validated_at, created_at, updated_at";

/// Provides reference-data reads and the two-step confirmation writes.
pub struct PrerequisiteRepo;

impl PrerequisiteRepo {
    /// List every prerequisite, ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Prerequisite>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prerequisites ORDER BY id ASC");
        sqlx::query_as::<_, Prerequisite>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Prerequisite>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prerequisites WHERE id = $1");
        sqlx::query_as::<_, Prerequisite>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        input: &CreatePrerequisite,
    ) -> Result<Prerequisite, sqlx::Error> {
        let query = format!(
            "INSERT INTO prerequisites (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Prerequisite>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find the confirmation row for a (student, prerequisite) pair.
    pub async fn find_status(
        pool: &PgPool,
        student_id: DbId,
        prerequisite_id: DbId,
    ) -> Result<Option<StudentPrerequisite>, sqlx::Error> {
        let query = format!(
            "SELECT {STATUS_COLUMNS} FROM student_prerequisites
             WHERE student_id = $1 AND prerequisite_id = $2"
        );
        sqlx::query_as::<_, StudentPrerequisite>(&query)
            .bind(student_id)
            .bind(prerequisite_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or refresh a self-report as `completado`, stamping `marked_at`.
    ///
    /// The upsert leaves an already `validado` row untouched and returns
    /// `None`.
    pub async fn mark_completed(
        pool: &PgPool,
        student_id: DbId,
        prerequisite_id: DbId,
    ) -> Result<Option<StudentPrerequisite>, sqlx::Error> {
        let query = format!(
            "INSERT INTO student_prerequisites
                (student_id, prerequisite_id, validation_state, marked_at)
             VALUES ($1, $2, 'completado', NOW())
             ON CONFLICT ON CONSTRAINT uq_student_prerequisites_pair DO UPDATE SET
                validation_state = 'completado',
                marked_at = NOW()
             WHERE student_prerequisites.validation_state <> 'validado'
             RETURNING {STATUS_COLUMNS}"
        );
        sqlx::query_as::<_, StudentPrerequisite>(&query)
            .bind(student_id)
            .bind(prerequisite_id)
            .fetch_optional(pool)
            .await
    }

    /// Move a `completado` row to `validado`, stamping `validated_at`.
    ///
    /// Returns `None` if the row is not currently `completado` (including a
    /// concurrent validation that won the race).
    pub async fn validate(
        pool: &PgPool,
        student_id: DbId,
        prerequisite_id: DbId,
    ) -> Result<Option<StudentPrerequisite>, sqlx::Error> {
        let query = format!(
            "UPDATE student_prerequisites SET
                validation_state = 'validado',
                validated_at = NOW()
             WHERE student_id = $1 AND prerequisite_id = $2
               AND validation_state = 'completado'
             RETURNING {STATUS_COLUMNS}"
        );
        sqlx::query_as::<_, StudentPrerequisite>(&query)
            .bind(student_id)
            .bind(prerequisite_id)
            .fetch_optional(pool)
            .await
    }

    /// All confirmation rows for a student, joined with the prerequisite.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<StudentPrerequisiteDetail>, sqlx::Error> {
        sqlx::query_as::<_, StudentPrerequisiteDetail>(
            "SELECT sp.id, sp.student_id, sp.prerequisite_id, sp.validation_state,
                    sp.marked_at, sp.validated_at,
                    p.name AS prerequisite_name,
                    p.description AS prerequisite_description
             FROM student_prerequisites sp
             INNER JOIN prerequisites p ON p.id = sp.prerequisite_id
             WHERE sp.student_id = $1
             ORDER BY sp.prerequisite_id ASC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }
}
