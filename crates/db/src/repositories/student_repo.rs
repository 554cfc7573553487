//! Repository for the `students` table.

use sqlx::PgPool;
use titulacion_core::types::DbId;

use crate::models::student::{Student, StudentIdentity};

const COLUMNS: &str = "id, user_id, semester, created_at, updated_at";

/// Column list for the student + user join.
const IDENTITY_COLUMNS: &str =
    "s.id, s.user_id, s.semester, u.first_names, u.last_names, u.email";

pub struct StudentRepo;

impl StudentRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE user_id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Student identities for a batch of student ids (unordered).
    pub async fn identities(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<StudentIdentity>, sqlx::Error> {
        let query = format!(
            "SELECT {IDENTITY_COLUMNS} FROM students s
             INNER JOIN users u ON u.id = s.user_id
             WHERE s.id = ANY($1)"
        );
        sqlx::query_as::<_, StudentIdentity>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
