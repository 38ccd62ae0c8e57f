// handlers/public/auth.rs - token acquisition endpoints

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::app::AppState;
use crate::auth::{AuthResponse, LoginRequest, LoginScope, RegisterRequest};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ResolvedTenant};

/// POST /api/v1/auth/login - Authenticate a tenant user
///
/// The tenant comes from the request's tenant hint (resolved by middleware),
/// never from the body.
///
/// Expected Input:
/// ```json
/// { "email": "a@demo.com", "password": "pw1234" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "expires_in": 86400,
///     "user": { "id": 1, "email": "a@demo.com", "role": "user", "tenant_id": 1, ... }
///   }
/// }
/// ```
pub async fn tenant_login(
    State(state): State<AppState>,
    ResolvedTenant(tenant): ResolvedTenant,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<AuthResponse> {
    let Json(request) = payload?;

    let response = state
        .authenticator
        .login(&request.email, &request.password, LoginScope::Tenant(tenant.id))
        .await
        .map_err(ApiError::from_login)?;

    Ok(ApiResponse::success(response))
}

/// POST /api/v1/auth/register - Create a user in the resolved tenant
///
/// Responds 201 with the same body as login. Duplicate emails in the tenant
/// yield 409.
pub async fn tenant_register(
    State(state): State<AppState>,
    ResolvedTenant(tenant): ResolvedTenant,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<AuthResponse> {
    let Json(request) = payload?;

    let response = state.authenticator.register(request, tenant.id).await?;

    Ok(ApiResponse::created(response))
}

/// POST /api/super-auth/login - Authenticate a super-admin
///
/// No tenant hint is read; the token is signed with the super-admin secret.
pub async fn super_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<AuthResponse> {
    let Json(request) = payload?;

    let response = state
        .authenticator
        .login(&request.email, &request.password, LoginScope::SuperAdmin)
        .await
        .map_err(ApiError::from_login)?;

    Ok(ApiResponse::success(response))
}
