#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use saas_api_rust::app::{self, AppState};
use saas_api_rust::auth::PasswordHasher;
use saas_api_rust::config::AppConfig;
use saas_api_rust::database::models::Tenant;
use saas_api_rust::database::seed::seed_demo_data;
use saas_api_rust::database::{MemoryDirectory, TenantRepository};
use saas_api_rust::notify::LogNotifier;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// In-process service over a seeded in-memory directory
pub struct TestApp {
    pub state: AppState,
    pub config: AppConfig,
    pub directory: MemoryDirectory,
    pub demo: Tenant,
    pub techstart: Tenant,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::for_tests()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        let directory = MemoryDirectory::new();
        seed_demo_data(&directory, PasswordHasher::new(config.security.bcrypt_cost)).await?;

        let demo = directory.find_by_domain("demo").await?.context("demo tenant")?;
        let techstart = directory.find_by_domain("techstart").await?.context("techstart tenant")?;

        let (state, _worker) = AppState::build(config.clone(), directory.clone(), Arc::new(LogNotifier))?;

        Ok(Self { state, config, directory, demo, techstart })
    }

    pub fn router(&self) -> Router {
        app::router(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        send(self.router(), request).await
    }

    /// Log in through the HTTP API and return the token
    pub async fn tenant_token(&self, tenant: &str, email: &str, password: &str) -> Result<String> {
        let (status, body) = self
            .send(
                RequestBuilder::post("/api/v1/auth/login")
                    .tenant(tenant)
                    .json(serde_json::json!({ "email": email, "password": password })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
        token_of(&body)
    }

    pub async fn super_token(&self) -> Result<String> {
        let (status, body) = self
            .send(
                RequestBuilder::post("/api/super-auth/login")
                    .json(serde_json::json!({ "email": "admin@saas.com", "password": "admin123" })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "super login failed: {} {}", status, body);
        token_of(&body)
    }
}

pub fn token_of(body: &Value) -> Result<String> {
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("response carries no token")
}

pub async fn send(router: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body: {:?}", bytes))?
    };
    Ok((status, body))
}

/// Small request builder for the tenant header, bearer token and JSON body
pub struct RequestBuilder {
    method: Method,
    uri: String,
    tenant: Option<String>,
    token: Option<String>,
}

impl RequestBuilder {
    pub fn get(uri: &str) -> Self {
        Self { method: Method::GET, uri: uri.to_string(), tenant: None, token: None }
    }

    pub fn post(uri: &str) -> Self {
        Self { method: Method::POST, uri: uri.to_string(), tenant: None, token: None }
    }

    pub fn tenant(mut self, tenant: &str) -> Self {
        self.tenant = Some(tenant.to_string());
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn builder(self) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(tenant) = self.tenant {
            builder = builder.header(TENANT_HEADER, tenant);
        }
        if let Some(token) = self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
    }

    pub fn json(self, body: Value) -> Request<Body> {
        self.builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    pub fn raw(self, content_type: &str, body: &str) -> Request<Body> {
        self.builder()
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    pub fn empty(self) -> Request<Body> {
        self.builder().body(Body::empty()).expect("valid request")
    }
}
