// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

mod common;

use axum::http::{Method, StatusCode};
use common::{task_body, TestApp};
use serde_json::{json, Value};

fn titles(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn create_expands_creator_and_defaults_status() {
    let app = TestApp::new();
    let (alice, token) = app.sign_up("Alice", "alice@example.com").await;

    let response = app
        .request(Method::POST, "/tasks", Some(task_body("Ship v1")), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let task = response.body;
    assert_eq!(task["title"], "Ship v1");
    assert_eq!(task["status"], "TODO");
    assert_eq!(task["priority"], "HIGH");
    assert_eq!(task["creatorId"], alice.as_str());
    assert_eq!(task["creator"]["name"], "Alice");
    assert!(task.get("assignedToId").is_none());
    assert!(task.get("assignee").is_none());
    assert!(task["dueDate"].as_str().unwrap().starts_with("2025-12-31T00:00:00"));
    assert!(task.get("passwordHash").is_none());
}

#[tokio::test]
async fn client_cannot_choose_the_creator() {
    let app = TestApp::new();
    let (alice, token) = app.sign_up("Alice", "alice@example.com").await;
    let (bob, _) = app.sign_up("Bob", "bob@example.com").await;

    let mut body = task_body("Spoof");
    body["creatorId"] = json!(bob);
    let response = app
        .request(Method::POST, "/tasks", Some(body), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["creatorId"], alice.as_str());
}

#[tokio::test]
async fn invalid_task_input_is_rejected() {
    let app = TestApp::new();
    let (_, token) = app.sign_up("Alice", "alice@example.com").await;

    let mut unknown_priority = task_body("x");
    unknown_priority["priority"] = json!("CRITICAL");
    let mut long_title = task_body("x");
    long_title["title"] = json!("t".repeat(101));
    let mut bad_date = task_body("x");
    bad_date["dueDate"] = json!("31/12/2025");
    let mut ghost_assignee = task_body("x");
    ghost_assignee["assignedToId"] = json!("ghost");

    for body in [unknown_priority, long_title, bad_date, ghost_assignee] {
        let response = app
            .request(Method::POST, "/tasks", Some(body.clone()), Some(&token))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert_eq!(response.body["statusCode"], 400);
    }

    let mut bad_date = task_body("x");
    bad_date["dueDate"] = json!("someday");
    let response = app
        .request(Method::POST, "/tasks", Some(bad_date), Some(&token))
        .await;
    assert_eq!(response.body["error"], "Validation failed");
    assert!(response.body["details"]["dueDate"].is_array());
    assert!(response.body["details"].get("due_date").is_none());
}

#[tokio::test]
async fn legacy_labels_are_accepted_and_normalised() {
    let app = TestApp::new();
    let (_, token) = app.sign_up("Alice", "alice@example.com").await;

    let mut body = task_body("Legacy");
    body["priority"] = json!("Urgent");
    body["status"] = json!("In Progress");
    let response = app
        .request(Method::POST, "/tasks", Some(body), Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["priority"], "URGENT");
    assert_eq!(response.body["status"], "IN_PROGRESS");
}

#[tokio::test]
async fn get_update_and_delete_lifecycle() {
    let app = TestApp::new();
    let (_, alice_token) = app.sign_up("Alice", "alice@example.com").await;
    let (bob, bob_token) = app.sign_up("Bob", "bob@example.com").await;

    let created = app
        .request(Method::POST, "/tasks", Some(task_body("Ship v1")), Some(&alice_token))
        .await
        .body;
    let uri = format!("/tasks/{}", created["id"].as_str().unwrap());

    // Any authenticated user may read and update
    let fetched = app.request(Method::GET, &uri, None, Some(&bob_token)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["id"], created["id"]);

    let updated = app
        .request(
            Method::PUT,
            &uri,
            Some(json!({ "status": "REVIEW", "assignedToId": bob })),
            Some(&bob_token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["status"], "REVIEW");
    assert_eq!(updated.body["title"], "Ship v1");
    assert_eq!(updated.body["assignee"]["email"], "bob@example.com");
    assert_eq!(updated.body["creatorId"], created["creatorId"]);

    let unassigned = app
        .request(Method::PUT, &uri, Some(json!({ "assignedToId": null })), Some(&bob_token))
        .await;
    assert_eq!(unassigned.status, StatusCode::OK);
    assert!(unassigned.body.get("assignedToId").is_none());

    // Only the creator may delete
    let forbidden = app.request(Method::DELETE, &uri, None, Some(&bob_token)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.body["error"], "Only the creator can delete this task");

    let deleted = app.request(Method::DELETE, &uri, None, Some(&alice_token)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({ "message": "Task deleted successfully" }));

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let body = (method == Method::PUT).then(|| json!({ "title": "again" }));
        let gone = app.request(method.clone(), &uri, body, Some(&alice_token)).await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(gone.body["error"], "Task not found");
    }
}

#[tokio::test]
async fn listing_filters_and_sorts() {
    let app = TestApp::new();
    let (alice, alice_token) = app.sign_up("Alice", "alice@example.com").await;
    let (bob, bob_token) = app.sign_up("Bob", "bob@example.com").await;

    for (title, due, priority, status, token) in [
        ("late-done", "2025-09-01", "LOW", "DONE", &alice_token),
        ("open", "2025-01-01", "URGENT", "TODO", &alice_token),
        ("early-done", "2025-02-01", "MEDIUM", "DONE", &bob_token),
    ] {
        let body = json!({
            "title": title,
            "description": "d",
            "dueDate": due,
            "priority": priority,
            "status": status,
            "assignedToId": (title == "open").then(|| bob.clone())
        });
        let response = app.request(Method::POST, "/tasks", Some(body), Some(token)).await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let newest_first = app.request(Method::GET, "/tasks", None, Some(&bob_token)).await;
    assert_eq!(titles(&newest_first.body), vec!["early-done", "open", "late-done"]);

    let done_by_due = app
        .request(
            Method::GET,
            "/tasks?status=DONE&sortBy=dueDate&order=asc",
            None,
            Some(&bob_token),
        )
        .await;
    assert_eq!(titles(&done_by_due.body), vec!["early-done", "late-done"]);

    let by_priority = app
        .request(Method::GET, "/tasks?sortBy=priority", None, Some(&bob_token))
        .await;
    assert_eq!(titles(&by_priority.body), vec!["late-done", "early-done", "open"]);

    let by_status_desc = app
        .request(Method::GET, "/tasks?sortBy=status&order=desc", None, Some(&bob_token))
        .await;
    assert_eq!(titles(&by_status_desc.body)[2], "open");

    let alices = app
        .request(
            Method::GET,
            &format!("/tasks?creatorId={alice}"),
            None,
            Some(&bob_token),
        )
        .await;
    assert_eq!(titles(&alices.body), vec!["open", "late-done"]);

    let urgent = app
        .request(Method::GET, "/tasks?priority=URGENT", None, Some(&bob_token))
        .await;
    assert_eq!(titles(&urgent.body), vec!["open"]);

    let bobs = app
        .request(
            Method::GET,
            &format!("/tasks?assignedToId={bob}&sortBy=dueDate"),
            None,
            Some(&bob_token),
        )
        .await;
    assert_eq!(titles(&bobs.body), vec!["open"]);
    assert_eq!(bobs.body[0]["assignee"]["name"], "Bob");

    // Blank id filters are ignored rather than matching nothing
    let blank = app
        .request(Method::GET, "/tasks?assignedToId=&creatorId=", None, Some(&bob_token))
        .await;
    assert_eq!(titles(&blank.body), vec!["early-done", "open", "late-done"]);
}

#[tokio::test]
async fn unknown_query_values_are_rejected() {
    let app = TestApp::new();
    let (_, token) = app.sign_up("Alice", "alice@example.com").await;

    for uri in ["/tasks?status=BLOCKED", "/tasks?sortBy=title", "/tasks?order=sideways"] {
        let response = app.request(Method::GET, uri, None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
    }
}
