//! Repository for the `users` table and user registration.

use sqlx::{PgConnection, PgPool};
use titulacion_core::roles::{ROLE_COORDINATOR, ROLE_DIRECTOR, ROLE_STUDENT, ROLE_TUTOR};
use titulacion_core::types::DbId;

use crate::models::user::{CreateUser, NewRegistration, RegisteredUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, first_names, last_names, email, password_hash, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Register a user with all of their roles and role-specific profile rows.
    ///
    /// Runs in a single transaction: either the user, every `user_roles` row
    /// and every profile row (`students`, `tutors`, `directors`,
    /// `coordinators`) exist afterwards, or none of them do.
    pub async fn register(
        pool: &PgPool,
        input: &NewRegistration,
    ) -> Result<RegisteredUser, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = Self::insert_user(&mut *tx, &input.user).await?;

        let mut student_id = None;
        let mut role_names = Vec::with_capacity(input.roles.len());
        for role in &input.roles {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)
                 ON CONFLICT (user_id, role_id) DO NOTHING",
            )
            .bind(user.id)
            .bind(role.id)
            .execute(&mut *tx)
            .await?;

            match role.name.as_str() {
                ROLE_STUDENT => {
                    let id = sqlx::query_scalar::<_, DbId>(
                        "INSERT INTO students (user_id, semester) VALUES ($1, $2) RETURNING id",
                    )
                    .bind(user.id)
                    .bind(input.student_semester)
                    .fetch_one(&mut *tx)
                    .await?;
                    student_id = Some(id);
                }
                ROLE_TUTOR => Self::insert_profile(&mut *tx, "tutors", user.id).await?,
                ROLE_DIRECTOR => Self::insert_profile(&mut *tx, "directors", user.id).await?,
                ROLE_COORDINATOR => Self::insert_profile(&mut *tx, "coordinators", user.id).await?,
                _ => {}
            }

            if !role_names.contains(&role.name) {
                role_names.push(role.name.clone());
            }
        }

        tx.commit().await?;

        tracing::debug!(user_id = user.id, roles = ?role_names, "User registered");

        Ok(RegisteredUser {
            user,
            role_names,
            student_id,
        })
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by institutional email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    async fn insert_user(conn: &mut PgConnection, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (first_names, last_names, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.first_names)
            .bind(&input.last_names)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(conn)
            .await
    }

    /// Insert a bare `(user_id)` profile row into one of the staff tables.
    ///
    /// `table` is always one of the literals above, never caller input.
    async fn insert_profile(
        conn: &mut PgConnection,
        table: &'static str,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let query = format!("INSERT INTO {table} (user_id) VALUES ($1)");
        sqlx::query(&query).bind(user_id).execute(conn).await?;
        Ok(())
    }
}
