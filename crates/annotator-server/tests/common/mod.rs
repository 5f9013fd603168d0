#![allow(dead_code)]

use std::sync::Arc;

use annotator_server::config::{BulkUploadMode, DatabaseConfig, ServerConfig};
use annotator_server::storage::Database;
use annotator_server::{build_router, AppState};
use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const INDEX_MARKER: &str = "<h1>Annotator test page</h1>";

/// Router over a fresh SQLite file. The temp dir lives as long as the app.
pub struct TestApp {
    pub router: Router,
    _dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(BulkUploadMode::Atomic).await
}

pub async fn spawn_app_with(bulk_upload: BulkUploadMode) -> TestApp {
    let dir = tempfile::tempdir().unwrap();

    let index_path = dir.path().join("index.html");
    std::fs::write(
        &index_path,
        format!("<!DOCTYPE html><html><body>{INDEX_MARKER}</body></html>"),
    )
    .unwrap();

    let config = ServerConfig {
        index_path,
        bulk_upload,
        database: DatabaseConfig {
            path: dir.path().join("sqlite").join("annotations.db"),
            max_connections: 2,
        },
        ..Default::default()
    };

    let db = Database::connect(&config.database).await.unwrap();
    let state = AppState::new(Arc::new(db), config.bulk_upload);

    TestApp {
        router: build_router(state, &config),
        _dir: dir,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> Response {
        self.send(Method::GET, uri, Body::empty(), true).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.send(Method::DELETE, uri, Body::empty(), true).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.send(Method::POST, uri, Body::from(body.to_string()), true)
            .await
    }

    /// POST a raw body without a `Content-Type` header.
    pub async fn post_raw(&self, uri: &str, body: &str) -> Response {
        self.send(Method::POST, uri, Body::from(body.to_string()), false)
            .await
    }

    pub async fn annotations(&self) -> Vec<Value> {
        let json = body_json(self.get("/annotations").await).await;
        json["annotations"].as_array().cloned().unwrap()
    }

    async fn send(&self, method: Method, uri: &str, body: Body, json: bool) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if json {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        self.router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
