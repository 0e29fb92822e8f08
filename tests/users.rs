mod common;

use common::{ids, image_part, spawn_app};
use reqwest::{multipart, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn users_list_newest_first_with_limit() {
    let app = spawn_app().await;
    let ada = app.signup("Ada", "ada").await;
    let grace = app.signup("Grace", "grace").await;
    let alan = app.signup("Alan", "alan").await;

    let all: Value = app.get(&ada, "/users").await.json().await.unwrap();
    assert_eq!(ids(&all), vec![alan.id, grace.id, ada.id]);

    let limited: Value = app.get(&ada, "/users?limit=2").await.json().await.unwrap();
    assert_eq!(ids(&limited), vec![alan.id, grace.id]);

    let unlimited: Value = app.get(&ada, "/users?limit=0").await.json().await.unwrap();
    assert_eq!(unlimited["total"], 3);

    let one: Value = app
        .get(&ada, &format!("/users/{}", grace.id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(one["user"]["username"], "grace");
    assert_eq!(app.get(&ada, "/users/999").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn users_edit_only_their_own_profile() {
    let app = spawn_app().await;
    let ada = app.signup("Ada", "ada").await;
    let grace = app.signup("Grace", "grace").await;

    let form = multipart::Form::new().text("name", "Hacked");
    let response = app
        .client
        .put(app.url(&format!("/users/{}", ada.id)))
        .bearer_auth(&grace.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let form = multipart::Form::new()
        .text("name", "Grace Hopper")
        .text("bio", "COBOL")
        .part("file", image_part(b"avatar"));
    let response = app
        .client
        .put(app.url(&format!("/users/{}", grace.id)))
        .bearer_auth(&grace.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["name"], "Grace Hopper");
    assert_eq!(body["user"]["bio"], "COBOL");
    assert_eq!(body["user"]["role"], "user");
    let image_id = body["user"]["imageId"].as_str().unwrap();
    assert!(body["user"]["imageUrl"]
        .as_str()
        .unwrap()
        .contains(&format!("/storage/files/{image_id}/preview")));
}

#[tokio::test]
async fn admins_change_roles_and_users_cannot() {
    let app = spawn_app().await;
    let admin = app.signup("Ada", "ada").await;
    let grace = app.signup("Grace", "grace").await;
    let path = format!("/admin/users/{}", grace.id);

    let form = multipart::Form::new().text("role", "admin");
    let response = app
        .client
        .put(app.url(&path))
        .bearer_auth(&grace.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let form = multipart::Form::new()
        .text("role", "Admin")
        .text("email", "grace@navy.mil");
    let response = app
        .client
        .put(app.url(&path))
        .bearer_auth(&admin.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["user"]["email"], "grace@navy.mil");
    assert_eq!(body["user"]["name"], "Grace");

    let form = multipart::Form::new().text("role", "superuser");
    let response = app
        .client
        .put(app.url(&path))
        .bearer_auth(&admin.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_user_cascades_to_posts_and_saves() {
    let app = spawn_app().await;
    let admin = app.signup("Ada", "ada").await;
    let grace = app.signup("Grace", "grace").await;
    let alan = app.signup("Alan", "alan").await;

    let grace_post = app.create_post(&grace, "Grace's post", "").await;
    let alan_post = app.create_post(&alan, "Alan's post", "").await;
    app.post_json(&grace, &format!("/posts/{}/saves", alan_post["id"]), json!({}))
        .await;
    app.post_json(&alan, &format!("/posts/{}/saves", grace_post["id"]), json!({}))
        .await;
    app.post_json(&grace, "/messages", json!({"receiverId": alan.id, "message": "bye"}))
        .await;

    let response = app
        .delete(&grace, &format!("/admin/users/{}", alan.id))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .delete(&admin, &format!("/admin/users/{}", grace.id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let posts: Value = app
        .get(&admin, &format!("/users/{}/posts", grace.id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(posts["total"], 0);
    assert_eq!(
        app.get(&admin, &format!("/users/{}", grace.id)).await.status(),
        StatusCode::NOT_FOUND
    );

    // Alan's save of Grace's post went with it.
    let saves: Value = app.get(&alan, "/account/saves").await.json().await.unwrap();
    assert_eq!(saves["total"], 0);

    // Grace's session is gone too.
    assert_eq!(app.get(&grace, "/account").await.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .client
        .get(grace_post["imageUrl"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .delete(&admin, &format!("/admin/users/{}", grace.id))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_profile_write_discards_the_new_image() {
    let app = spawn_app().await;
    let admin = app.signup("Ada", "ada").await;
    let grace = app.signup("Grace", "grace").await;
    app.signup("Alan", "alan").await;
    assert_eq!(app.stored_files(), 0);

    let form = multipart::Form::new()
        .text("email", "alan@example.com")
        .part("file", image_part(b"avatar"));
    let response = app
        .client
        .put(app.url(&format!("/admin/users/{}", grace.id)))
        .bearer_auth(&admin.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.stored_files(), 0);

    let body: Value = app
        .get(&admin, &format!("/users/{}", grace.id))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["user"]["email"], "grace@example.com");
    assert!(body["user"]["imageId"].is_null());
}
