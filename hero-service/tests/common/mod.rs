#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use hero_service::services::{HeroStore, InMemoryStore};
use hero_service::{build_router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Router wired to a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestApp {
    pub fn spawn() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let router = build_router(AppState::new(store.clone() as Arc<dyn HeroStore>));
        TestApp { router, store }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        let text = String::from_utf8_lossy(&bytes).into_owned();

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.request("PATCH", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request("DELETE", uri, None).await
    }

    /// Create a hero and return its id.
    pub async fn create_hero(&self, body: Value) -> String {
        let response = self.post("/heroes/", body).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["_id"].as_str().unwrap().to_string()
    }
}

/// A well-formed id that no hero was ever assigned.
pub fn unassigned_id() -> String {
    mongodb::bson::oid::ObjectId::new().to_hex()
}
