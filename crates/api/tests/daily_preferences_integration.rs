//! Integration tests for per-day user preferences.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, create_user, days_from_now, delete_request, get_request, id, json_request,
    send,
};
use serde_json::json;

// ============================================================================
// Single Date Tests
// ============================================================================

#[tokio::test]
async fn test_put_creates_then_replaces() {
    let app = create_test_app();
    let user = create_user(&app).await;
    let date = days_from_now(5);
    let uri = format!("/api/v1/users/{}/preferences/{}", id(&user), date);

    let (status, created) = send(
        &app,
        json_request(
            Method::PUT,
            &uri,
            json!({ "breakfast_at_host": true, "toilet_preference": "western" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["preferences"]["breakfast_at_host"], true);

    let (status, replaced) = send(
        &app,
        json_request(
            Method::PUT,
            &uri,
            json!({ "dinner_at_host": false, "notes": "Arriving late" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["id"], created["id"]);
    assert_eq!(replaced["preferences"]["notes"], "Arriving late");
    assert!(replaced["preferences"]["breakfast_at_host"].is_null());

    let (_, list) = send(
        &app,
        get_request(&format!("/api/v1/users/{}/preferences", id(&user))),
    )
    .await;
    assert_eq!(list["total_count"], 1);
}

#[tokio::test]
async fn test_get_and_delete_preference() {
    let app = create_test_app();
    let user = create_user(&app).await;
    let uri = format!(
        "/api/v1/users/{}/preferences/{}",
        id(&user),
        days_from_now(2)
    );
    send(
        &app,
        json_request(Method::PUT, &uri, json!({ "staying_with_group": true })),
    )
    .await;

    let (status, preference) = send(&app, get_request(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preference["preferences"]["staying_with_group"], true);

    let (status, _) = send(&app, delete_request(&uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get_request(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_unknown_user_not_found() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!(
                "/api/v1/users/{}/preferences/{}",
                uuid::Uuid::new_v4(),
                days_from_now(1)
            ),
            json!({ "lunch_with_group": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_invalid_toilet_preference_rejected() {
    let app = create_test_app();
    let user = create_user(&app).await;
    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!(
                "/api/v1/users/{}/preferences/{}",
                id(&user),
                days_from_now(1)
            ),
            json!({ "toilet_preference": "squat" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_invalid_date_rejected() {
    let app = create_test_app();
    let user = create_user(&app).await;
    let (status, body) = send(
        &app,
        get_request(&format!("/api/v1/users/{}/preferences/2030-02-30", id(&user))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

// ============================================================================
// Listing Tests
// ============================================================================

#[tokio::test]
async fn test_list_within_range() {
    let app = create_test_app();
    let user = create_user(&app).await;
    for offset in [1, 3, 5] {
        send(
            &app,
            json_request(
                Method::PUT,
                &format!(
                    "/api/v1/users/{}/preferences/{}",
                    id(&user),
                    days_from_now(offset)
                ),
                json!({ "lunch_with_group": true }),
            ),
        )
        .await;
    }

    let (status, list) = send(
        &app,
        get_request(&format!(
            "/api/v1/users/{}/preferences?from={}&to={}",
            id(&user),
            days_from_now(2),
            days_from_now(5)
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total_count"], 2);
    assert_eq!(list["data"][0]["date"], json!(days_from_now(3)));
    assert_eq!(list["data"][1]["date"], json!(days_from_now(5)));
}

#[tokio::test]
async fn test_list_rejects_inverted_range() {
    let app = create_test_app();
    let user = create_user(&app).await;
    let (status, body) = send(
        &app,
        get_request(&format!(
            "/api/v1/users/{}/preferences?from={}&to={}",
            id(&user),
            days_from_now(5),
            days_from_now(1)
        )),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

// ============================================================================
// Cascade Tests
// ============================================================================

#[tokio::test]
async fn test_deleting_user_removes_preferences() {
    let app = create_test_app();
    let user = create_user(&app).await;
    let uri = format!(
        "/api/v1/users/{}/preferences/{}",
        id(&user),
        days_from_now(1)
    );
    send(&app, json_request(Method::PUT, &uri, json!({}))).await;

    send(&app, delete_request(&format!("/api/v1/users/{}", id(&user)))).await;

    let (status, _) = send(&app, get_request(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
