mod common;

use anyhow::Result;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use chrono::{Duration, Utc};

use common::{send, RequestBuilder, TestApp};
use saas_api_rust::app::{router_with, AppState};
use saas_api_rust::auth::{Audience, PrincipalClaims, TokenCodec};
use saas_api_rust::error::SESSION_REJECTED;
use saas_api_rust::middleware::{ApiResponse, RequestContext};
use saas_api_rust::types::Role;

fn tenant_codec(app: &TestApp) -> Result<TokenCodec> {
    Ok(TokenCodec::from_config(Audience::Tenant, &app.config.security)?)
}

#[tokio::test]
async fn whoami_reports_principal_and_tenant() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.tenant_token("demo", "user@demo.com", "password").await?;

    let (status, body) = app
        .send(RequestBuilder::get("/api/v1/auth/me").tenant("demo").bearer(&token).empty())
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["email"], "user@demo.com");
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["tenant_id"], app.demo.id);
    assert_eq!(body["data"]["tenant"]["domain"], "demo");
    Ok(())
}

#[tokio::test]
async fn missing_and_expired_tokens_look_the_same() -> Result<()> {
    let app = TestApp::spawn().await?;

    let (missing_status, missing) = app
        .send(RequestBuilder::get("/api/v1/auth/me").tenant("demo").empty())
        .await?;

    let stale = tenant_codec(&app)?.issue_at(
        &PrincipalClaims {
            principal_id: 1,
            email: "admin@demo.com".into(),
            role: Role::Admin,
            tenant_id: Some(app.demo.id),
        },
        Utc::now().timestamp() - Duration::days(3).num_seconds(),
    )?;
    let (expired_status, expired) = app
        .send(RequestBuilder::get("/api/v1/auth/me").tenant("demo").bearer(&stale.token).empty())
        .await?;

    let (garbage_status, garbage) = app
        .send(RequestBuilder::get("/api/v1/auth/me").tenant("demo").bearer("not.a.token").empty())
        .await?;

    assert_eq!(missing_status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired_status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage_status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing, expired);
    assert_eq!(expired, garbage);
    assert_eq!(missing["message"], SESSION_REJECTED);
    Ok(())
}

#[tokio::test]
async fn token_from_foreign_secret_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let forger = TokenCodec::new(Audience::Tenant, "not-the-secret", Duration::hours(1), 0)?;
    let forged = forger.issue(&PrincipalClaims {
        principal_id: 1,
        email: "admin@demo.com".into(),
        role: Role::Admin,
        tenant_id: Some(app.demo.id),
    })?;

    let (status, body) = app
        .send(RequestBuilder::get("/api/v1/auth/me").tenant("demo").bearer(&forged.token).empty())
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], SESSION_REJECTED);
    Ok(())
}

#[tokio::test]
async fn token_cannot_be_replayed_against_another_tenant() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.tenant_token("demo", "admin@demo.com", "password").await?;

    let (status, body) = app
        .send(RequestBuilder::get("/api/v1/auth/me").tenant("techstart").bearer(&token).empty())
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");
    Ok(())
}

#[tokio::test]
async fn super_admin_tokens_do_not_open_tenant_routes() -> Result<()> {
    let app = TestApp::spawn().await?;

    // Real super-admin token: wrong secret for the tenant codec
    let super_token = app.super_token().await?;
    let (status, _) = app
        .send(RequestBuilder::get("/api/v1/auth/me").tenant("demo").bearer(&super_token).empty())
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // super_admin role signed with the tenant secret is refused by role
    let minted = tenant_codec(&app)?.issue(&PrincipalClaims {
        principal_id: 99,
        email: "admin@saas.com".into(),
        role: Role::SuperAdmin,
        tenant_id: None,
    })?;
    let (status, body) = app
        .send(RequestBuilder::get("/api/v1/auth/me").tenant("demo").bearer(&minted.token).empty())
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");
    Ok(())
}

#[tokio::test]
async fn admin_group_requires_admin_role() -> Result<()> {
    let app = TestApp::spawn().await?;

    let user = app.tenant_token("demo", "user@demo.com", "password").await?;
    let (status, _) = app
        .send(RequestBuilder::get("/api/v1/admin/me").tenant("demo").bearer(&user).empty())
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.tenant_token("demo", "admin@demo.com", "password").await?;
    let (status, body) = app
        .send(RequestBuilder::get("/api/v1/admin/me").tenant("demo").bearer(&admin).empty())
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");
    Ok(())
}

async fn tenant_products(context: RequestContext) -> ApiResponse<Option<i32>> {
    ApiResponse::success(context.tenant.map(|t| t.id))
}

async fn super_tenants(context: RequestContext) -> ApiResponse<bool> {
    ApiResponse::success(context.is_super_admin())
}

fn mounted(state: AppState) -> Router {
    router_with(
        state,
        Router::new().route("/products", get(tenant_products)),
        Router::new().route("/tenants", get(super_tenants)),
    )
}

#[tokio::test]
async fn downstream_routes_inherit_the_gates() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.tenant_token("techstart", "user@techstart.com", "password").await?;
    let super_token = app.super_token().await?;

    let (status, body) = send(
        mounted(app.state.clone()),
        RequestBuilder::get("/api/v1/products").tenant("techstart").bearer(&token).empty(),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], app.techstart.id);

    let (status, _) = send(
        mounted(app.state.clone()),
        RequestBuilder::get("/api/v1/products").bearer(&token).empty(),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        mounted(app.state.clone()),
        RequestBuilder::get("/api/v1/products").tenant("techstart").empty(),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        mounted(app.state.clone()),
        RequestBuilder::get("/api/super/tenants").bearer(&super_token).empty(),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);

    let (status, _) = send(
        mounted(app.state.clone()),
        RequestBuilder::get("/api/super/tenants").bearer(&token).empty(),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}
