//! Shared test utilities for alp-api integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alp_api::services::{LlmError, TextGenerator};
use alp_api::{build_router, AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tower::util::ServiceExt;

pub const TOKEN_SECRET: &str = "integration-test-secret";

/// Text generator double: returns a fixed reply and records every prompt
pub struct ScriptedGenerator {
    configured: bool,
    reply: Result<String, u16>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            configured: true,
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with an upstream HTTP status
    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            ..Self::replying("")
        }
    }

    /// No API key available
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::replying("unused")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model(&self) -> &str {
        "scripted-model"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if !self.configured {
            return Err(LlmError::NotConfigured);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(LlmError::ApiError(*status, "scripted failure".to_string())),
        }
    }
}

/// Router plus handles on its collaborators
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub llm: Arc<ScriptedGenerator>,
    /// Valid bearer token when authentication is enabled
    pub token: Option<String>,
}

/// In-memory database with schema
pub async fn setup_test_db() -> SqlitePool {
    // One connection: each :memory: connection is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");
    alp_common::db::init_schema(&pool)
        .await
        .expect("Should create schema");
    pool
}

/// App with authentication disabled
pub async fn setup_app(llm: ScriptedGenerator) -> TestApp {
    build_app(llm, None).await
}

/// App with bearer authentication enabled and a valid token issued
pub async fn setup_app_with_auth(llm: ScriptedGenerator) -> TestApp {
    build_app(llm, Some(TOKEN_SECRET)).await
}

async fn build_app(llm: ScriptedGenerator, secret: Option<&str>) -> TestApp {
    let pool = setup_test_db().await;
    let llm = Arc::new(llm);
    let state = AppState::new(
        pool.clone(),
        llm.clone(),
        secret.map(str::to_string),
    );

    let token = secret.map(|s| {
        let expires_at = chrono::Utc::now().timestamp_millis() + 60 * 60 * 1000;
        alp_common::api::issue_token("tester", expires_at, s).expect("Should issue token")
    });

    TestApp {
        router: build_router(state),
        pool,
        llm,
        token,
    }
}

impl TestApp {
    /// Send a request with an optional JSON body, authenticated if a token exists
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
        self.send(method, uri, body, self.token.as_deref()).await
    }

    /// Send a request with an explicit bearer token (or none)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send a urlencoded form body without authentication
    pub async fn send_form(&self, uri: &str, form: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Create a course through the API and return its id
    pub async fn create_course(&self, name: &str, modules: Value) -> String {
        let response = self
            .request(
                "POST",
                "/course",
                Some(serde_json::json!({"name": name, "modules": modules})),
            )
            .await;
        assert_eq!(response.status(), 201, "course creation failed");
        let course = extract_json(response).await;
        course["id"].as_str().expect("course id").to_string()
    }

    /// Create an asset through the API and return its JSON
    pub async fn create_asset(&self, code: &str, language: &str, content: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/course/assets",
                Some(serde_json::json!({
                    "code": code,
                    "name": format!("{} name", code),
                    "content": content,
                    "language": language,
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "asset creation failed");
        extract_json(response).await
    }
}

/// Extract JSON body from response
pub async fn extract_json(response: Response<Body>) -> Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Should read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
