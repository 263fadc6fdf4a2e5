use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use configuration::{AppSettings, ServerSettings};
use core_types::{
    Anime, AnimeChanges, AnimeFilter, Episode, EpisodeSource, NewAnime, NewUserRecord, Page,
    UserChanges, UserRecord,
};
use credentials::CredentialManager;
use database::{CatalogStore, DbError, MemoryStore};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use web_server::health::LivenessReporter;
use web_server::{build_router, AppState};

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::over(store.clone(), store)
    }

    /// Serves `catalog`; `store` is the memory store behind it, for assertions.
    fn over(catalog: Arc<dyn CatalogStore>, store: Arc<MemoryStore>) -> Self {
        let started_at: DateTime<Utc> = Utc::now();
        let state = Arc::new(AppState {
            store: catalog.clone(),
            credentials: CredentialManager::new(1).unwrap(),
            liveness: LivenessReporter::new(started_at, catalog).silent(),
            app: AppSettings {
                environment: "test".to_string(),
                version: "9.9.9".to_string(),
            },
        });
        let router = build_router(state, &ServerSettings::default()).unwrap();
        Self { router, store }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

/// A store whose renames take a while to reach the memory store.
struct SlowRenames {
    inner: Arc<MemoryStore>,
    delay: Duration,
}

#[async_trait]
impl CatalogStore for SlowRenames {
    async fn ping(&self) -> Result<(), DbError> {
        self.inner.ping().await
    }

    async fn list_users(&self, page: Page) -> Result<Vec<UserRecord>, DbError> {
        self.inner.list_users(page).await
    }

    async fn find_user(&self, id: i32) -> Result<Option<UserRecord>, DbError> {
        self.inner.find_user(id).await
    }

    async fn create_user(&self, user: NewUserRecord) -> Result<UserRecord, DbError> {
        self.inner.create_user(user).await
    }

    async fn update_user(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, DbError> {
        if changes.display_name.is_some() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.update_user(id, changes).await
    }

    async fn delete_user(&self, id: i32) -> Result<bool, DbError> {
        self.inner.delete_user(id).await
    }

    async fn list_animes(&self, filter: &AnimeFilter) -> Result<Vec<Anime>, DbError> {
        self.inner.list_animes(filter).await
    }

    async fn find_anime(&self, id: i32) -> Result<Option<Anime>, DbError> {
        self.inner.find_anime(id).await
    }

    async fn create_anime(&self, anime: NewAnime) -> Result<Anime, DbError> {
        self.inner.create_anime(anime).await
    }

    async fn update_anime(&self, id: i32, changes: AnimeChanges) -> Result<Option<Anime>, DbError> {
        self.inner.update_anime(id, changes).await
    }

    async fn delete_anime(&self, id: i32) -> Result<bool, DbError> {
        self.inner.delete_anime(id).await
    }

    async fn episodes_for_anime(&self, anime_id: i32) -> Result<Vec<Episode>, DbError> {
        self.inner.episodes_for_anime(anime_id).await
    }
}

fn assert_no_secrets(user: &Value) {
    let object = user.as_object().expect("user is an object");
    for key in ["password", "passwordHash", "password_hash", "salt", "plaintextSecret", "credential"] {
        assert!(!object.contains_key(key), "response leaked `{key}`: {user}");
    }
}

fn new_user_body() -> Value {
    json!({
        "email": "aki@example.com",
        "displayName": "AnimeFan123",
        "password": "securePassword123",
        "avatarUrl": "https://example.com/avatar.jpg"
    })
}

#[tokio::test]
async fn health_reports_connected_database() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "Aktív");
    assert_eq!(body["database"]["connected"], true);
    assert_eq!(body["database"]["status"], "Kapcsolódva");
    assert_eq!(body["environment"], "test");
    assert_eq!(body["version"], "9.9.9");
    assert!(body["uptimeMs"].as_i64().unwrap() >= 0);
    assert!(body["uptime"].as_str().unwrap().ends_with("másodperc"));
    assert!(body["timestamp"].is_string());
    assert!(body["startTime"].is_string());
}

#[tokio::test]
async fn health_stays_200_when_database_is_down() {
    let app = TestApp::new();
    app.store.set_reachable(false);

    let (status, body) = app.send(Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Adatbázis hiba");
    assert_eq!(body["database"]["connected"], false);
    assert_eq!(body["database"]["status"], "Nem elérhető");
}

#[tokio::test]
async fn user_lifecycle_never_exposes_credentials() {
    let app = TestApp::new();

    let (status, created) = app.send(Method::POST, "/api/users", Some(new_user_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    assert_no_secrets(&created["data"]);
    assert_eq!(created["data"]["permissionLevel"], 0);
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, fetched) = app.send(Method::GET, &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_no_secrets(&fetched["data"]);
    assert_eq!(fetched["data"]["displayName"], "AnimeFan123");

    let original = app.store.find_user(id as i32).await.unwrap().unwrap().credential;
    assert!(!original.password_hash.contains("securePassword123"));

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/api/users/{id}"),
            Some(json!({ "password": "newPassword123", "permissionLevel": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_no_secrets(&updated["data"]);
    assert_eq!(updated["data"]["permissionLevel"], 1);

    let rotated = app.store.find_user(id as i32).await.unwrap().unwrap().credential;
    assert_ne!(rotated.password_hash, original.password_hash);
    assert_ne!(rotated.salt, original.salt);
    let manager = CredentialManager::new(1).unwrap();
    assert!(manager.verify(&rotated, "newPassword123").unwrap());

    let (status, deleted) = app.send(Method::DELETE, &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Felhasználó sikeresen törölve");

    let (status, missing) = app.send(Method::GET, &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["success"], false);
    assert_eq!(missing["error"], "Felhasználó nem található");
}

#[tokio::test]
async fn update_without_password_keeps_the_credential() {
    let app = TestApp::new();
    let (_, created) = app.send(Method::POST, "/api/users", Some(new_user_body())).await;
    let id = created["data"]["id"].as_i64().unwrap() as i32;
    let before = app.store.find_user(id).await.unwrap().unwrap().credential;

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/api/users/{id}"),
            Some(json!({ "displayName": "Renamed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["displayName"], "Renamed");

    let after = app.store.find_user(id).await.unwrap().unwrap().credential;
    assert_eq!(after, before);
}

#[tokio::test]
async fn slow_rename_does_not_undo_a_concurrent_password_change() {
    let memory = Arc::new(MemoryStore::new());
    let slow = Arc::new(SlowRenames {
        inner: memory.clone(),
        delay: Duration::from_secs(2),
    });
    let app = TestApp::over(slow, memory.clone());

    let mut body = new_user_body();
    body["password"] = json!("old-pass");
    let (_, created) = app.send(Method::POST, "/api/users", Some(body)).await;
    let id = created["data"]["id"].as_i64().unwrap() as i32;
    let uri = format!("/api/users/{id}");

    let rename = app.send(Method::PUT, &uri, Some(json!({ "displayName": "B" })));
    let password_change = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        app.send(Method::PUT, &uri, Some(json!({ "password": "new-pass" }))).await
    };
    let ((rename_status, _), (change_status, _)) = tokio::join!(rename, password_change);
    assert_eq!(rename_status, StatusCode::OK);
    assert_eq!(change_status, StatusCode::OK);

    let stored = memory.find_user(id).await.unwrap().unwrap();
    let manager = CredentialManager::new(1).unwrap();
    assert_eq!(stored.display_name, "B");
    assert!(manager.verify(&stored.credential, "new-pass").unwrap());
    assert!(!manager.verify(&stored.credential, "old-pass").unwrap());
}

#[tokio::test]
async fn updated_email_and_title_are_trimmed() {
    let app = TestApp::new();
    app.send(Method::POST, "/api/users", Some(new_user_body())).await;
    let mut other = new_user_body();
    other["email"] = json!("masik@example.com");
    let (_, created) = app.send(Method::POST, "/api/users", Some(other)).await;
    let uri = format!("/api/users/{}", created["data"]["id"]);

    let (status, _) = app
        .send(Method::PUT, &uri, Some(json!({ "email": " aki@example.com " })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = app
        .send(
            Method::PUT,
            &uri,
            Some(json!({ "email": " uj@example.com ", "displayName": "  Uj  " })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["email"], "uj@example.com");
    assert_eq!(updated["data"]["displayName"], "Uj");

    let (_, anime) = app
        .send(Method::POST, "/api/animes", Some(json!({ "title": "Bleach" })))
        .await;
    let (status, renamed) = app
        .send(
            Method::PUT,
            &format!("/api/animes/{}", anime["data"]["id"]),
            Some(json!({ "title": "  Bleach TYBW " })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["data"]["title"], "Bleach TYBW");
}

#[tokio::test]
async fn empty_password_is_rejected_without_a_write() {
    let app = TestApp::new();
    let mut body = new_user_body();
    body["password"] = json!("");

    let (status, response) = app.send(Method::POST, "/api/users", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["success"], false);
    assert_eq!(response["error"], "Email, felhasználónév és jelszó megadása kötelező!");
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn missing_display_name_is_rejected() {
    let app = TestApp::new();
    let (status, _) = app
        .send(
            Method::POST,
            "/api/users",
            Some(json!({ "email": "a@example.com", "password": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn blank_password_on_update_is_rejected() {
    let app = TestApp::new();
    let (_, created) = app.send(Method::POST, "/api/users", Some(new_user_body())).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .send(Method::PUT, &format!("/api/users/{id}"), Some(json!({ "password": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.write_count(), 1);
}

#[tokio::test]
async fn updating_or_deleting_an_unknown_user_is_404() {
    let app = TestApp::new();
    let (status, _) = app
        .send(Method::PUT, "/api/users/41", Some(json!({ "displayName": "x" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::DELETE, "/api/users/41", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_list_is_redacted_and_paginated() {
    let app = TestApp::new();
    for n in 0..3 {
        let mut body = new_user_body();
        body["email"] = json!(format!("user{n}@example.com"));
        let (status, _) = app.send(Method::POST, "/api/users", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, list) = app.send(Method::GET, "/api/users?limit=2&offset=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 2);
    let users = list["data"].as_array().unwrap();
    assert_eq!(users[0]["email"], "user1@example.com");
    users.iter().for_each(assert_no_secrets);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::new();
    app.send(Method::POST, "/api/users", Some(new_user_body())).await;
    let (status, body) = app.send(Method::POST, "/api/users", Some(new_user_body())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn store_outage_fails_data_endpoints_with_500() {
    let app = TestApp::new();
    app.store.set_reachable(false);

    let (status, body) = app.send(Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn malformed_input_gets_a_json_error() {
    let app = TestApp::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send_request(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app.send(Method::GET, "/api/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "success": false, "error": "Route not found" }));
}

#[tokio::test]
async fn anime_crud_and_filters() {
    let app = TestApp::new();
    for (title, genre, status) in [
        ("Naruto", "Action", "Finished"),
        ("Naruto Shippuden", "Action", "Ongoing"),
        ("Clannad", "Drama", "Finished"),
    ] {
        let (code, _) = app
            .send(
                Method::POST,
                "/api/animes",
                Some(json!({ "title": title, "genre": genre, "status": status })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED);
    }

    let (status, _) = app.send(Method::POST, "/api/animes", Some(json!({ "genre": "Action" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = app
        .send(Method::GET, "/api/animes?genre=Action&search=SHIPP", None)
        .await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["data"][0]["title"], "Naruto Shippuden");

    let (_, finished) = app.send(Method::GET, "/api/animes?status=Finished", None).await;
    assert_eq!(finished["count"], 2);

    let (status, updated) = app
        .send(Method::PUT, "/api/animes/1", Some(json!({ "status": "Remastered" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["status"], "Remastered");
    assert_eq!(updated["data"]["title"], "Naruto");

    let (status, _) = app.send(Method::DELETE, "/api/animes/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.send(Method::GET, "/api/animes/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Anime nem található");
}

#[tokio::test]
async fn episodes_are_listed_in_order_with_sources() {
    let app = TestApp::new();
    for (id, position) in [(11, 2), (10, 1)] {
        app.store.insert_episode(Episode {
            id,
            anime_id: 5,
            title: Some(format!("Rész {position}")),
            position,
            sources: vec![EpisodeSource {
                id: id * 10,
                episode_id: id,
                url: format!("https://video.example.com/{id}"),
                source_type: Some("indavideo".to_string()),
            }],
        });
    }

    let (status, body) = app.send(Method::GET, "/api/episodes/anime/5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["position"], 1);
    assert_eq!(body["data"][1]["position"], 2);
    assert_eq!(body["data"][0]["sources"][0]["sourceType"], "indavideo");

    let (status, body) = app.send(Method::GET, "/api/episodes/anime/6", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Nem található részek ehhez az animéhez");
}
