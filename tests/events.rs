mod common;

use chrono::{DateTime, Utc};
use common::{ids, spawn_app};
use reqwest::StatusCode;
use serde_json::{json, Value};

fn parse(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn created_event_lists_with_the_same_fields() {
    let app = spawn_app().await;
    let admin = app.signup("Ada", "ada").await;

    let response = app
        .post_json(
            &admin,
            "/events",
            json!({
                "title": "Launch",
                "start": "2024-03-01T09:30:00Z",
                "end": "2024-03-01T11:00:00.250Z"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    let id = created["event"]["id"].as_i64().unwrap();

    let list: Value = app.get(&admin, "/events").await.json().await.unwrap();
    let event = &list["documents"][0];
    assert_eq!(event["id"], id);
    assert_eq!(event["title"], "Launch");
    assert_eq!(
        parse(&event["start"]),
        "2024-03-01T09:30:00Z".parse::<DateTime<Utc>>().unwrap()
    );
    assert_eq!(
        parse(&event["end"]),
        "2024-03-01T11:00:00.250Z".parse::<DateTime<Utc>>().unwrap()
    );
}

#[tokio::test]
async fn events_list_newest_created_first() {
    let app = spawn_app().await;
    let admin = app.signup("Ada", "ada").await;

    let mut created = vec![];
    for title in ["first", "second", "third"] {
        let body: Value = app
            .post_json(
                &admin,
                "/events",
                json!({"title": title, "start": "2024-01-01T00:00:00Z", "end": "2024-01-01T01:00:00Z"}),
            )
            .await
            .json()
            .await
            .unwrap();
        created.push(body["event"]["id"].as_i64().unwrap());
    }
    created.reverse();

    let list: Value = app.get(&admin, "/events").await.json().await.unwrap();
    assert_eq!(ids(&list), created);
}

#[tokio::test]
async fn only_admins_change_events() {
    let app = spawn_app().await;
    let admin = app.signup("Ada", "ada").await;
    let user = app.signup("Grace", "grace").await;

    let event = json!({"title": "Standup", "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T09:15:00Z"});
    let response = app.post_json(&user, "/events", event.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body: Value = app
        .post_json(&admin, "/events", event)
        .await
        .json()
        .await
        .unwrap();
    let id = body["event"]["id"].as_i64().unwrap();

    let response = app.delete(&user, &format!("/events/{id}")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let list: Value = app.get(&user, "/events").await.json().await.unwrap();
    assert_eq!(list["total"], 1);
}

#[tokio::test]
async fn update_replaces_the_event() {
    let app = spawn_app().await;
    let admin = app.signup("Ada", "ada").await;

    let body: Value = app
        .post_json(
            &admin,
            "/events",
            json!({"title": "Draft", "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T10:00:00Z"}),
        )
        .await
        .json()
        .await
        .unwrap();
    let id = body["event"]["id"].as_i64().unwrap();

    let response = app
        .put_json(
            &admin,
            &format!("/events/{id}"),
            json!({"title": "Final", "start": "2024-02-02T09:00:00Z", "end": "2024-02-02T12:00:00Z"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["event"]["title"], "Final");
    assert_eq!(
        parse(&body["event"]["start"]),
        "2024-02-02T09:00:00Z".parse::<DateTime<Utc>>().unwrap()
    );

    let response = app
        .put_json(
            &admin,
            "/events/999",
            json!({"title": "Ghost", "start": "2024-02-02T09:00:00Z", "end": "2024-02-02T12:00:00Z"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_missing_event_still_succeeds() {
    let app = spawn_app().await;
    let admin = app.signup("Ada", "ada").await;

    let body: Value = app
        .post_json(
            &admin,
            "/events",
            json!({"title": "Once", "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T10:00:00Z"}),
        )
        .await
        .json()
        .await
        .unwrap();
    let id = body["event"]["id"].as_i64().unwrap();

    assert_eq!(app.delete(&admin, &format!("/events/{id}")).await.status(), StatusCode::OK);
    assert_eq!(app.delete(&admin, &format!("/events/{id}")).await.status(), StatusCode::OK);

    let list: Value = app.get(&admin, "/events").await.json().await.unwrap();
    assert_eq!(list["total"], 0);
}
