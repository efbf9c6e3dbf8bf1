use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::{postgres::PgQueryResult, Executor, PgPool};
use tracing::info;

use crate::{
    web::{
        data::{ValidWaitlistEntry, WaitlistPayload},
        Error, WebResult,
    },
    AppState,
};

/// Validates and normalizes a waitlist signup, then inserts it.
///
/// Validation runs before the database is touched: an invalid submission
/// writes nothing and doesn't need the database to be configured at all.
/// A duplicate email is answered like a success, the caller's intent is
/// already satisfied.
#[tracing::instrument(name = "Adding an email to the waitlist", skip(app_state, payload))]
pub async fn join_waitlist(
    State(app_state): State<AppState>,
    payload: Result<Json<WaitlistPayload>, JsonRejection>,
) -> WebResult<(StatusCode, Json<Value>)> {
    // An unreadable body is nothing the caller can fix by correcting a field,
    // so it maps to the internal-error branch rather than a validation error.
    let Json(payload) = payload.map_err(|rej| Error::PayloadRejection(rej.body_text()))?;

    let entry: ValidWaitlistEntry = payload.try_into().map_err(Error::DataParsing)?;

    let db = app_state.db()?;
    let was_registered = insert_waitlist_entry(db, &entry).await?;

    let message = if was_registered {
        "You are already on the waitlist!"
    } else {
        info!(email = %entry.email.as_ref(), "New waitlist signup");
        "Successfully joined waitlist"
    };

    Ok((StatusCode::OK, Json(json!({ "message": message }))))
}

/// Tries to insert a new entry into the waitlist table and returns
/// `Result<was_registered>`. If the insert fails because the email is already
/// on the list this does ***NOT*** return an `Err`, instead the
/// `was_registered` flag is set to `true`.
async fn insert_waitlist_entry(db: &PgPool, entry: &ValidWaitlistEntry) -> WebResult<bool> {
    let query = sqlx::query(
        r#"
        INSERT INTO waitlist (email, drone_type, created_at)
        VALUES ($1, $2, $3)
    "#,
    )
    .bind(entry.email.as_ref())
    .bind(entry.drone_type.as_deref())
    .bind(Utc::now());

    let query_result = db.execute(query).await;
    was_email_registered(query_result)
}

// ###################################
// ->   HELPERS
// ###################################

/// A helper function that checks if the email was already registered prior to
/// making the SQL query. Propagates every error except the unique-constraint
/// violation on the email column: that one means the email was already on the
/// waitlist (true). An `Ok` query result means it was just added (false).
fn was_email_registered(
    query_result: core::result::Result<PgQueryResult, sqlx::Error>,
) -> WebResult<bool> {
    use sqlx::postgres::PgDatabaseError;

    let is_unique_violation_err = |er: Option<&PgDatabaseError>| {
        if let Some(er) = er {
            er.code() == "23505"
        } else {
            false
        }
    };

    match query_result {
        Err(error) => match error {
            sqlx::Error::Database(er)
                // The email is already registered, report it without erroring
                if is_unique_violation_err(er.try_downcast_ref::<PgDatabaseError>()) =>
            {
                Ok(true)
            }
            // Anything else is a genuine storage failure, propagate it
            _ => Err(error.into()),
        },
        Ok(_) => Ok(false),
    }
}
