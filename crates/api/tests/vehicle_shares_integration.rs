//! Integration tests for vehicle sharing.

mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use common::{
    create_event, create_test_app, create_user, delete_request, get_request, id, json_request,
    post_request, register_user, send,
};
use serde_json::{json, Value};

/// An event with a registered driver offering `capacity` seats.
async fn share_with_driver(app: &Router, capacity: i32) -> (Value, Value) {
    let event = create_event(app, None).await;
    let driver = create_user(app).await;
    register_user(app, &id(&event), &id(&driver)).await;

    let (status, share) = send(
        app,
        json_request(
            Method::POST,
            &format!("/api/v1/events/{}/vehicle-shares", id(&event)),
            json!({ "driver_user_id": id(&driver), "capacity": capacity, "notes": "Leaves 7am" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "share creation failed: {}", share);
    (event, share)
}

/// Creates a user registered for the event.
async fn registered_user(app: &Router, event: &Value) -> Value {
    let user = create_user(app).await;
    register_user(app, &id(event), &id(&user)).await;
    user
}

async fn join(app: &Router, share: &Value, user: &Value) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            &format!("/api/v1/vehicle-shares/{}/passengers", id(share)),
            json!({ "passenger_user_id": id(user) }),
        ),
    )
    .await
}

// ============================================================================
// Share Creation Tests
// ============================================================================

#[tokio::test]
async fn test_create_share() {
    let app = create_test_app();
    let (event, share) = share_with_driver(&app, 3).await;

    assert_eq!(share["event_id"], event["id"]);
    assert_eq!(share["capacity"], 3);
    assert_eq!(share["passengers"], json!([]));

    let (status, list) = send(
        &app,
        get_request(&format!("/api/v1/events/{}/vehicle-shares", id(&event))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total_count"], 1);
}

#[tokio::test]
async fn test_driver_must_be_registered() {
    let app = create_test_app();
    let event = create_event(&app, None).await;
    let driver = create_user(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/v1/events/{}/vehicle-shares", id(&event)),
            json!({ "driver_user_id": id(&driver), "capacity": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_capacity_out_of_range_rejected() {
    let app = create_test_app();
    let event = create_event(&app, None).await;
    let driver = create_user(&app).await;
    register_user(&app, &id(&event), &id(&driver)).await;

    for capacity in [0, 51] {
        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                &format!("/api/v1/events/{}/vehicle-shares", id(&event)),
                json!({ "driver_user_id": id(&driver), "capacity": capacity }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }
}

// ============================================================================
// Passenger Tests
// ============================================================================

#[tokio::test]
async fn test_join_until_full() {
    let app = create_test_app();
    let (event, share) = share_with_driver(&app, 1).await;
    let first = registered_user(&app, &event).await;
    let second = registered_user(&app, &event).await;

    let (status, joined) = join(&app, &share, &first).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["passengers"], json!([first["id"]]));

    let (status, body) = join(&app, &share, &second).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "capacity_exceeded");

    let (_, current) = send(
        &app,
        get_request(&format!("/api/v1/vehicle-shares/{}", id(&share))),
    )
    .await;
    assert_eq!(current["passengers"], json!([first["id"]]));
}

#[tokio::test]
async fn test_passenger_must_be_registered() {
    let app = create_test_app();
    let (_, share) = share_with_driver(&app, 2).await;
    let outsider = create_user(&app).await;

    let (status, body) = join(&app, &share, &outsider).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_driver_cannot_join_own_vehicle() {
    let app = create_test_app();
    let (_, share) = share_with_driver(&app, 2).await;
    let driver = json!({ "id": share["driver_user_id"] });

    let (status, _) = join(&app, &share, &driver).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_passenger_rides_in_one_vehicle() {
    let app = create_test_app();
    let (event, share) = share_with_driver(&app, 2).await;

    let other_driver = registered_user(&app, &event).await;
    let (_, other_share) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/v1/events/{}/vehicle-shares", id(&event)),
            json!({ "driver_user_id": id(&other_driver), "capacity": 2 }),
        ),
    )
    .await;

    let passenger = registered_user(&app, &event).await;
    let (status, _) = join(&app, &share, &passenger).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = join(&app, &other_share, &passenger).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_leave_vehicle() {
    let app = create_test_app();
    let (event, share) = share_with_driver(&app, 2).await;
    let passenger = registered_user(&app, &event).await;
    join(&app, &share, &passenger).await;
    let uri = format!(
        "/api/v1/vehicle-shares/{}/passengers/{}",
        id(&share),
        id(&passenger)
    );

    let (status, left) = send(&app, delete_request(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(left["passengers"], json!([]));

    let (status, _) = send(&app, delete_request(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancelling_registration_releases_seat() {
    let app = create_test_app();
    let (event, share) = share_with_driver(&app, 2).await;
    let passenger = create_user(&app).await;
    let registration = register_user(&app, &id(&event), &id(&passenger)).await;
    join(&app, &share, &passenger).await;

    send(
        &app,
        post_request(&format!(
            "/api/v1/registrations/{}/cancel",
            id(&registration)
        )),
    )
    .await;

    let (_, current) = send(
        &app,
        get_request(&format!("/api/v1/vehicle-shares/{}", id(&share))),
    )
    .await;
    assert_eq!(current["passengers"], json!([]));
}

// ============================================================================
// Update and Deletion Tests
// ============================================================================

#[tokio::test]
async fn test_capacity_update_below_passenger_count() {
    let app = create_test_app();
    let (event, share) = share_with_driver(&app, 3).await;
    for _ in 0..2 {
        let passenger = registered_user(&app, &event).await;
        join(&app, &share, &passenger).await;
    }
    let uri = format!("/api/v1/vehicle-shares/{}", id(&share));

    let (status, body) = send(
        &app,
        json_request(Method::PATCH, &uri, json!({ "capacity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, updated) = send(
        &app,
        json_request(Method::PATCH, &uri, json!({ "capacity": 2, "notes": "Full car" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["capacity"], 2);
    assert_eq!(updated["notes"], "Full car");
}

#[tokio::test]
async fn test_delete_share() {
    let app = create_test_app();
    let (_, share) = share_with_driver(&app, 2).await;
    let uri = format!("/api/v1/vehicle-shares/{}", id(&share));

    let (status, _) = send(&app, delete_request(&uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, get_request(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
