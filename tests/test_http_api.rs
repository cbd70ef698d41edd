use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use helpdesk::infrastructure::http::router::build_router;
use serde_json::{json, Value};
use tower::ServiceExt;

mod helpers;
use helpers::*;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let test_db = setup_test_db().await;
    let app = build_router(build_test_state(&test_db.db()));

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_queue_endpoints() {
    let test_db = setup_test_db().await;
    let app = build_router(build_test_state(&test_db.db()));

    let (status, queue) = send(
        &app,
        "POST",
        "/api/queues",
        Some(json!({
            "title": "Support",
            "slug": "support",
            "email_address": "support@example.com",
            "email_box_type": "imap",
            "email_box_pass": "hunter2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(queue["from_address"], "Support <support@example.com>");
    assert_eq!(queue["email_box_imap_folder"], "INBOX");
    assert_eq!(queue["email_box_interval"], 5);
    assert!(queue.get("email_box_pass").is_none());
    let id = queue["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/queues",
        Some(json!({ "title": "Again", "slug": "support" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "POST",
        "/api/queues",
        Some(json!({ "title": "Bad", "slug": "not a slug" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, by_slug) = send(&app, "GET", "/api/queues/slug/support", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_slug["id"], id);

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/api/queues/{}", id),
        Some(json!({ "title": "Customer Support", "email_address": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Customer Support");
    assert!(updated["from_address"].is_null());

    let (status, list) = send(&app, "GET", "/api/queues", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/queues/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/queues/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_ticket_lifecycle() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let queue = create_test_queue(&state, "Support", "support").await;
    let agent = create_test_user(&state, "jdoe", Some("Jane"), Some("Doe")).await;
    let app = build_router(state);

    let (status, ticket) = send(
        &app,
        "POST",
        "/api/tickets",
        Some(json!({
            "title": "VPN down",
            "queue_id": queue.id,
            "submitter_email": "customer@example.com",
            "description": "Cannot connect",
            "user_id": agent.id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = ticket["id"].as_i64().unwrap();
    assert_eq!(ticket["ticket"], format!("[support-{}]", id));
    assert_eq!(ticket["status"], "open");
    assert_eq!(ticket["status_label"], "Open");
    assert_eq!(ticket["assigned_to_display"], "Unassigned");

    let (status, update) = send(
        &app,
        "PATCH",
        &format!("/api/tickets/{}", id),
        Some(json!({ "user_id": agent.id, "assigned_to": agent.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(update["ticket"]["assigned_to_display"], "Jane Doe");
    assert_eq!(update["followup"]["title"], "Assigned to Jane Doe");
    assert_eq!(update["followup"]["public"], false);
    assert_eq!(update["followup"]["changes"][0]["field"], "Owner");
    assert_eq!(
        update["followup"]["changes"][0]["display"],
        "Owner set to Jane Doe"
    );

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/tickets/{}", id),
        Some(json!({ "user_id": agent.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, followup) = send(
        &app,
        "POST",
        &format!("/api/tickets/{}/followups", id),
        Some(json!({
            "user_id": agent.id,
            "comment": "Restarted the gateway",
            "public": true,
            "new_status": "resolved"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(followup["ticket"]["status"], "resolved");
    assert_eq!(followup["followup"]["title"], "Resolved");
    assert_eq!(followup["followup"]["new_status"], "resolved");
    assert_eq!(followup["followup"]["public"], true);
    let followup_id = followup["followup"]["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/api/tickets/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "resolved");
    assert_eq!(fetched["resolution"], "Restarted the gateway");

    let (status, journal) = send(
        &app,
        "GET",
        &format!("/api/tickets/{}/followups", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = journal
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Ticket Opened", "Assigned to Jane Doe", "Resolved"]);

    let (status, single) = send(&app, "GET", &format!("/api/followups/{}", followup_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        single["changes"][0]["display"],
        "Resolution set to Restarted the gateway"
    );

    let (status, latest) = send(&app, "GET", "/api/tickets/latest", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["id"], id);

    let (status, _) = send(&app, "DELETE", &format!("/api/tickets/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/tickets/{}/followups", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ticket_list_filters() {
    let test_db = setup_test_db().await;
    let state = build_test_state(&test_db.db());
    let support = create_test_queue(&state, "Support", "support").await;
    let sales = create_test_queue(&state, "Sales", "sales").await;
    create_test_ticket(&state, &support, "One").await;
    create_test_ticket(&state, &support, "Two").await;
    create_test_ticket(&state, &sales, "Three").await;
    let app = build_router(state);

    let (status, all) = send(&app, "GET", "/api/tickets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total"], 3);
    assert_eq!(all["limit"], 50);
    assert_eq!(all["tickets"][0]["title"], "Three");

    let (status, page) = send(
        &app,
        "GET",
        &format!("/api/tickets?queue_id={}&limit=1&offset=1", support.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["tickets"].as_array().unwrap().len(), 1);
    assert_eq!(page["tickets"][0]["title"], "One");

    let (status, none) = send(&app, "GET", "/api/tickets?status=closed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none["total"], 0);
}

#[tokio::test]
async fn test_missing_resources() {
    let test_db = setup_test_db().await;
    let app = build_router(build_test_state(&test_db.db()));

    let (status, _) = send(&app, "GET", "/api/tickets/latest", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/users/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/followups/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/tickets",
        Some(json!({ "title": "Nowhere", "queue_id": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_endpoints() {
    let test_db = setup_test_db().await;
    let app = build_router(build_test_state(&test_db.db()));

    let (status, user) = send(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["display_name"], "bob");

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, list) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}
