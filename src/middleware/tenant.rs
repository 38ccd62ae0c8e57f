use axum::{
    async_trait,
    extract::{FromRequestParts, OriginalUri, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::app::AppState;
use crate::auth::AuthError;
use crate::database::models::Tenant;
use crate::error::ApiError;

/// Tenant resolved for the current request, injected by [`resolve_tenant`]
#[derive(Clone, Debug)]
pub struct ResolvedTenant(pub Tenant);

/// Resolve the request's tenant hint and attach the tenant record.
///
/// Paths under the super-admin prefix pass through untouched.
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Nested routers see a stripped path; exemption is decided on the full one
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    if state.resolver.is_exempt(&path) {
        debug!("Skipping tenant resolution for {}", path);
        return Ok(next.run(request).await);
    }

    let tenant = state.resolver.resolve(request.headers()).await?;
    request.extensions_mut().insert(ResolvedTenant(tenant));

    Ok(next.run(request).await)
}

/// Reject requests that reached a tenant-scoped route without a tenant
pub async fn require_tenant(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<ResolvedTenant>().is_none() {
        return Err(AuthError::TenantRequired.into());
    }
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for ResolvedTenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedTenant>()
            .cloned()
            .ok_or_else(|| AuthError::TenantRequired.into())
    }
}
