#![allow(dead_code)]

use std::{path::PathBuf, time::Duration};

use reqwest::{multipart, Client, Response, StatusCode};
use serde_json::{json, Value};
use snapgram::{get_random_free_port, make_router, run_app, Config};
use tempfile::TempDir;

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub storage_dir: PathBuf,
    _dir: TempDir,
}

pub struct Account {
    pub id: i64,
    pub token: String,
}

pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let (_, addr) = get_random_free_port();
    let address = format!("http://{}", addr);
    let storage_dir = dir.path().join("files");
    let config = Config {
        database_url: format!("sqlite://{}", dir.path().join("test.db").display()),
        jwt_secret: "test-secret".to_owned(),
        bind_address: addr,
        storage_dir: storage_dir.clone(),
        public_url: address.clone(),
        session_ttl_days: 1,
    };
    tokio::spawn(run_app(make_router(), config));

    let client = Client::new();
    for _ in 0..100 {
        if let Ok(response) = client
            .get(format!("{}/check_health", address))
            .send()
            .await
        {
            if response.status() == StatusCode::OK {
                return TestApp {
                    address,
                    client,
                    storage_dir,
                    _dir: dir,
                };
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server did not come up on {}", address);
}

impl TestApp {
    /// Number of file blobs currently on disk.
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(&self.storage_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, name: &str, username: &str) -> Response {
        self.client
            .post(self.url("/account"))
            .json(&json!({
                "user": {
                    "name": name,
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "password123"
                }
            }))
            .send()
            .await
            .unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/account/sessions"))
            .json(&json!({ "user": { "email": email, "password": password } }))
            .send()
            .await
            .unwrap()
    }

    /// Registers and signs in a new account.
    pub async fn signup(&self, name: &str, username: &str) -> Account {
        let response = self.register(name, username).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        let id = body["user"]["id"].as_i64().unwrap();

        let response = self
            .login(&format!("{username}@example.com"), "password123")
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        Account {
            id,
            token: body["session"]["token"].as_str().unwrap().to_owned(),
        }
    }

    pub async fn get(&self, account: &Account, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(&account.token)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete(&self, account: &Account, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(&account.token)
            .send()
            .await
            .unwrap()
    }

    pub async fn post_json(&self, account: &Account, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .bearer_auth(&account.token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn put_json(&self, account: &Account, path: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .bearer_auth(&account.token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn create_post(&self, account: &Account, caption: &str, tags: &str) -> Value {
        let form = multipart::Form::new()
            .text("caption", caption.to_owned())
            .text("location", "Lagos")
            .text("tags", tags.to_owned())
            .part("file", image_part(b"fake image bytes"));
        let response = self
            .client
            .post(self.url("/posts"))
            .bearer_auth(&account.token)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        body["post"].clone()
    }
}

pub fn image_part(bytes: &[u8]) -> multipart::Part {
    multipart::Part::bytes(bytes.to_vec())
        .file_name("photo.png")
        .mime_str("image/png")
        .unwrap()
}

pub fn ids(list: &Value) -> Vec<i64> {
    list["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["id"].as_i64().unwrap())
        .collect()
}
