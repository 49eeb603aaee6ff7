//! Database helpers for the credential store (`users` table).

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

/// Outcome when attempting to create a new user.
#[derive(Debug)]
pub(super) enum SignupOutcome {
    Created,
    Conflict,
}

/// Everything the login and admin flows need about a user.
pub(super) struct UserRecord {
    pub(super) id: Uuid,
    pub(super) email: String,
    pub(super) password_hash: String,
    pub(super) first_name: String,
    pub(super) last_name: String,
    pub(super) roles: Vec<String>,
    pub(super) status: String,
    pub(super) otp_enabled: bool,
    pub(super) contact_number: Option<String>,
}

pub(super) async fn lookup_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>> {
    let query = r"
        SELECT id, email, password_hash, first_name, last_name,
               roles, status::text AS status, otp_enabled, contact_number
        FROM users
        WHERE email = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;

    Ok(row.map(|row| UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        roles: row.get("roles"),
        status: row.get("status"),
        otp_enabled: row.get("otp_enabled"),
        contact_number: row.get("contact_number"),
    }))
}

/// Current status only — the route guard re-reads this on every guarded
/// request instead of trusting the token snapshot.
pub(super) async fn lookup_status(pool: &PgPool, user_id: Uuid) -> Result<Option<String>> {
    let query = "SELECT status::text AS status FROM users WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user status")?;
    Ok(row.map(|row| row.get("status")))
}

#[allow(clippy::too_many_arguments)]
pub(super) async fn insert_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
    middle_name: Option<&str>,
    contact_number: Option<&str>,
    roles: &[String],
) -> Result<SignupOutcome> {
    // New registrations always land as pending; approval flips them active.
    let query = r"
        INSERT INTO users
            (email, password_hash, first_name, last_name, middle_name,
             contact_number, roles, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(middle_name)
        .bind(contact_number)
        .bind(roles)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(_) => Ok(SignupOutcome::Created),
        Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

/// Approve a pending account. Returns false when the user does not exist
/// or is not pending — approval is not a general status setter.
pub(super) async fn approve_user(pool: &PgPool, user_id: Uuid) -> Result<bool> {
    let query = r"
        UPDATE users
        SET status = 'active', updated_at = NOW()
        WHERE id = $1
          AND status = 'pending'
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to approve user")?;
    Ok(row.is_some())
}

/// Replace a user's role set. Callers validate the tags and non-emptiness.
pub(super) async fn update_roles(pool: &PgPool, user_id: Uuid, roles: &[String]) -> Result<bool> {
    let query = r"
        UPDATE users
        SET roles = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .bind(roles)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to update roles")?;
    Ok(row.is_some())
}
