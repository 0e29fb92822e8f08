mod common;

use common::{ids, spawn_app};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn conversation_contains_exactly_the_pair() {
    let app = spawn_app().await;
    let ada = app.signup("Ada", "ada").await;
    let grace = app.signup("Grace", "grace").await;
    let alan = app.signup("Alan", "alan").await;

    let mut expected = vec![];
    for (from, to, text) in [
        (&ada, &grace, "hi grace"),
        (&grace, &ada, "hi ada"),
        (&ada, &alan, "hi alan"),
        (&alan, &grace, "hello grace"),
        (&ada, &grace, "how are you?"),
    ] {
        let response = app
            .post_json(from, "/messages", json!({"receiverId": to.id, "message": text}))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        let involves_pair = [from.id, to.id] == [ada.id, grace.id]
            || [from.id, to.id] == [grace.id, ada.id];
        if involves_pair {
            expected.push(body["message"]["id"].as_i64().unwrap());
        }
    }

    let from_ada: Value = app
        .get(&ada, &format!("/messages/with/{}", grace.id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(ids(&from_ada), expected);

    let from_grace: Value = app
        .get(&grace, &format!("/messages/with/{}", ada.id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(ids(&from_grace), expected);

    let alan_all: Value = app.get(&alan, "/messages").await.json().await.unwrap();
    assert_eq!(alan_all["total"], 2);
}

#[tokio::test]
async fn sender_deletes_exactly_one_message() {
    let app = spawn_app().await;
    let ada = app.signup("Ada", "ada").await;
    let grace = app.signup("Grace", "grace").await;

    let mut sent = vec![];
    for text in ["one", "two"] {
        let body: Value = app
            .post_json(&ada, "/messages", json!({"receiverId": grace.id, "message": text}))
            .await
            .json()
            .await
            .unwrap();
        sent.push(body["message"]["id"].as_i64().unwrap());
    }

    let response = app.delete(&grace, &format!("/messages/{}", sent[0])).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.delete(&ada, &format!("/messages/{}", sent[0])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.delete(&ada, &format!("/messages/{}", sent[0])).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = app
        .get(&ada, &format!("/messages/with/{}", grace.id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(ids(&body), vec![sent[1]]);
}

#[tokio::test]
async fn messages_need_a_known_receiver_and_text() {
    let app = spawn_app().await;
    let ada = app.signup("Ada", "ada").await;

    let response = app
        .post_json(&ada, "/messages", json!({"receiverId": 999, "message": "hello?"}))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post_json(&ada, "/messages", json!({"receiverId": ada.id, "message": "   "}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
