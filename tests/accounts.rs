mod common;

use common::spawn_app;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn first_account_is_admin_and_later_ones_are_users() {
    let app = spawn_app().await;

    let body: Value = app.register("Ada Lovelace", "ada").await.json().await.unwrap();
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["name"], "Ada Lovelace");
    assert_eq!(
        body["user"]["imageUrl"],
        app.url("/avatars/initials?name=Ada+Lovelace")
    );
    assert!(body["user"].get("password").is_none());

    let body: Value = app.register("Grace Hopper", "grace").await.json().await.unwrap();
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = spawn_app().await;
    assert_eq!(app.register("Ada", "ada").await.status(), StatusCode::CREATED);

    let response = app.register("Ada Again", "ada").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"]["body"][0], "Email or username already exists");
}

#[tokio::test]
async fn short_password_is_rejected() {
    let app = spawn_app().await;
    let response = app
        .client
        .post(app.url("/account"))
        .json(&serde_json::json!({
            "user": {"name": "Ada", "username": "ada", "email": "ada@example.com", "password": "short"}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sign_in_checks_the_password() {
    let app = spawn_app().await;
    app.register("Ada", "ada").await;

    let response = app.login("ada@example.com", "wrong-password").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.login("nobody@example.com", "password123").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app.login("ada@example.com", "password123").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn current_account_requires_a_session() {
    let app = spawn_app().await;
    let ada = app.signup("Ada", "ada").await;

    let response = app.client.get(app.url("/account")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .client
        .get(app.url("/account"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = app.get(&ada, "/account").await.json().await.unwrap();
    assert_eq!(body["user"]["id"], ada.id);
    assert_eq!(body["user"]["username"], "ada");
}

#[tokio::test]
async fn sign_out_invalidates_the_token() {
    let app = spawn_app().await;
    let ada = app.signup("Ada", "ada").await;

    let response = app.delete(&ada, "/account/sessions/current").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&ada, "/account").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn initials_avatar_is_svg() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(app.url("/avatars/initials?name=Ada+Lovelace"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/svg+xml");
    assert!(response.text().await.unwrap().contains(">AL<"));
}

#[tokio::test]
async fn unknown_routes_fall_through() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/nowhere")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
