use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::{spawn_test_app, spawn_test_app_without_db};

#[tokio::test]
async fn waitlist_join_ok() -> Result<()> {
    let app = spawn_test_app().await?;

    let json_request = json!({
        "email": "pilot@example.com",
        "droneType": "DJI Mavic 3"
    });

    let res = app.post_waitlist(&json_request).await?;

    assert_eq!(
        res.status(),
        StatusCode::OK,
        "Wrong response StatusCode: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Successfully joined waitlist");

    let (email, drone_type, created_at): (String, Option<String>, DateTime<Utc>) =
        sqlx::query_as("SELECT email, drone_type, created_at FROM waitlist")
            .fetch_one(app.db())
            .await?;

    assert_eq!(email, "pilot@example.com");
    assert_eq!(drone_type.as_deref(), Some("DJI Mavic 3"));
    assert!(created_at <= Utc::now());

    Ok(())
}

#[tokio::test]
async fn waitlist_email_is_normalized_before_storage() -> Result<()> {
    let app = spawn_test_app().await?;

    let res = app
        .post_waitlist(&json!({ "email": "PILOT@Example.com " }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let (email,): (String,) = sqlx::query_as("SELECT email FROM waitlist")
        .fetch_one(app.db())
        .await?;

    assert_eq!(email, "pilot@example.com");

    Ok(())
}

#[tokio::test]
async fn waitlist_duplicate_email_is_a_friendly_success() -> Result<()> {
    let app = spawn_test_app().await?;
    let json_request = json!({ "email": "pilot@example.com" });

    let res = app.post_waitlist(&json_request).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Successfully joined waitlist");

    // Same address again, normalization included: still a 200, different message.
    let res = app
        .post_waitlist(&json!({ "email": " Pilot@Example.COM" }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "You are already on the waitlist!");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM waitlist")
        .fetch_one(app.db())
        .await?;
    assert_eq!(count, 1, "duplicate signup must not create a second row");

    Ok(())
}

#[tokio::test]
async fn waitlist_missing_email_is_rejected() -> Result<()> {
    let app = spawn_test_app().await?;

    let cases = [
        (json!({}), "empty body"),
        (json!({ "droneType": "Parrot Anafi" }), "only droneType"),
        (json!({ "email": null }), "null email"),
        (json!({ "email": 42 }), "non-string email"),
    ];

    for (json_request, description) in cases {
        let res = app.post_waitlist(&json_request).await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "Wrong response for request with: {description}"
        );
        let body: Value = res.json().await?;
        assert_eq!(body["error"], "Email is required");
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM waitlist")
        .fetch_one(app.db())
        .await?;
    assert_eq!(count, 0);

    Ok(())
}

#[tokio::test]
async fn waitlist_malformed_email_is_rejected_without_a_write() -> Result<()> {
    let app = spawn_test_app().await?;

    let cases = [
        "not-an-email",
        "@example.com",
        "pilot@example",
        "pi lot@example.com",
        "",
    ];

    for email in cases {
        let res = app.post_waitlist(&json!({ "email": email })).await?;
        assert_eq!(
            res.status(),
            StatusCode::BAD_REQUEST,
            "The API did not return a 400 BAD REQUEST for email: {email:?}"
        );
        let body: Value = res.json().await?;
        assert_eq!(body["error"], "Invalid email format");
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM waitlist")
        .fetch_one(app.db())
        .await?;
    assert_eq!(count, 0, "rejected submissions must not write any rows");

    Ok(())
}

#[tokio::test]
async fn waitlist_omitted_drone_type_is_stored_as_absent() -> Result<()> {
    let app = spawn_test_app().await?;

    let cases = [
        (json!({ "email": "a@example.com" }), "a@example.com"),
        (
            json!({ "email": "b@example.com", "droneType": null }),
            "b@example.com",
        ),
        (
            json!({ "email": "c@example.com", "droneType": "   " }),
            "c@example.com",
        ),
    ];

    for (json_request, email) in cases {
        let res = app.post_waitlist(&json_request).await?;
        assert_eq!(res.status(), StatusCode::OK);

        let (drone_type,): (Option<String>,) =
            sqlx::query_as("SELECT drone_type FROM waitlist WHERE email = $1")
                .bind(email)
                .fetch_one(app.db())
                .await?;
        assert_eq!(drone_type, None, "expected NULL drone_type for {email}");
    }

    Ok(())
}

#[tokio::test]
async fn waitlist_drone_type_is_trimmed() -> Result<()> {
    let app = spawn_test_app().await?;

    let res = app
        .post_waitlist(&json!({ "email": "pilot@example.com", "droneType": "  Skydio 2+ " }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let (drone_type,): (Option<String>,) = sqlx::query_as("SELECT drone_type FROM waitlist")
        .fetch_one(app.db())
        .await?;
    assert_eq!(drone_type.as_deref(), Some("Skydio 2+"));

    Ok(())
}

#[tokio::test]
async fn waitlist_unreadable_body_is_an_internal_error() -> Result<()> {
    let app = spawn_test_app().await?;

    let res = app.post_waitlist_raw("this is not json").await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Internal server error");

    Ok(())
}

#[tokio::test]
async fn waitlist_without_database_reports_a_configuration_error() -> Result<()> {
    let app = spawn_test_app_without_db().await?;

    for json_request in [
        json!({ "email": "pilot@example.com" }),
        json!({ "email": "other@example.com", "droneType": "DJI Mini 4 Pro" }),
    ] {
        let res = app.post_waitlist(&json_request).await?;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = res.json().await?;
        assert_eq!(body["error"], "Server configuration error");
    }

    // Validation still runs first: a bad email is the caller's problem even
    // when no database is configured.
    let res = app.post_waitlist(&json!({ "email": "not-an-email" })).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid email format");

    Ok(())
}
