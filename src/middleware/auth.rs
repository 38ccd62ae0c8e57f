use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::AppState;
use crate::auth::{AuthError, SessionClaims, TokenCodec};
use crate::error::ApiError;
use crate::middleware::tenant::ResolvedTenant;
use crate::types::{Role, TenantId, UserId};

/// Authenticated principal extracted from a verified session token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
}

impl From<SessionClaims> for AuthUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.principal_id,
            email: claims.email,
            role: claims.role,
            tenant_id: claims.tenant_id,
        }
    }
}

/// Gate for tenant-scoped routes: tenant token, tenant role, matching tenant
pub async fn tenant_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = verify_bearer(request.headers(), &state.tenant_tokens)?;
    let resolved = request.extensions().get::<ResolvedTenant>().map(|t| t.0.id);

    match claims.role {
        Role::SuperAdmin => {
            warn!(user_id = claims.principal_id, "Super admin token presented on a tenant route");
            return Err(AuthError::ForbiddenRole.into());
        }
        Role::Admin | Role::User => match (claims.tenant_id, resolved) {
            (None, _) => {
                return Err(AuthError::TokenMalformed("tenant token without tenant_id".to_string()).into());
            }
            (Some(claimed), Some(resolved)) if claimed != resolved => {
                warn!(
                    user_id = claims.principal_id,
                    claimed, resolved, "Token tenant does not match request tenant"
                );
                return Err(AuthError::TenantMismatch.into());
            }
            _ => {}
        },
    }

    debug!(user_id = claims.principal_id, role = %claims.role, "Tenant session verified");
    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Gate for super-admin routes: super-admin token and role
pub async fn super_admin_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = verify_bearer(request.headers(), &state.super_tokens)?;

    if claims.role != Role::SuperAdmin {
        warn!(user_id = claims.principal_id, role = %claims.role, "Non super admin on super admin route");
        return Err(AuthError::ForbiddenRole.into());
    }

    debug!(user_id = claims.principal_id, "Super admin session verified");
    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Roles admitted by [`require_role`]
#[derive(Clone, Debug)]
pub struct RoleSet(Arc<[Role]>);

impl RoleSet {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().collect())
    }

    pub fn allows(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

/// Restrict a gated route group to a set of roles. Must run after a gate.
pub async fn require_role(
    State(allowed): State<RoleSet>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuthorization)?;

    if !allowed.allows(user.role) {
        warn!(user_id = user.user_id, role = %user.role, "Role not permitted for route");
        return Err(AuthError::ForbiddenRole.into());
    }

    Ok(next.run(request).await)
}

fn verify_bearer(headers: &HeaderMap, codec: &TokenCodec) -> Result<SessionClaims, AuthError> {
    let token = extract_bearer(headers)?;
    codec.parse(token)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?
        .to_str()
        .map_err(|_| AuthError::TokenMalformed("authorization header is not ASCII".to_string()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AuthError::TokenMalformed("authorization header must use Bearer".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::TokenMalformed("authorization header must use Bearer".to_string()));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingAuthorization);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(extract_bearer(&headers("bearer  abc")).unwrap(), "abc");
        assert!(matches!(extract_bearer(&HeaderMap::new()), Err(AuthError::MissingAuthorization)));
        assert!(matches!(extract_bearer(&headers("Bearer ")), Err(AuthError::MissingAuthorization)));
        assert!(matches!(extract_bearer(&headers("Basic abc")), Err(AuthError::TokenMalformed(_))));
        assert!(matches!(extract_bearer(&headers("abc")), Err(AuthError::TokenMalformed(_))));
    }

    #[test]
    fn role_set_membership() {
        let admins = RoleSet::new([Role::Admin]);
        assert!(admins.allows(Role::Admin));
        assert!(!admins.allows(Role::User));
        assert!(!admins.allows(Role::SuperAdmin));
    }
}
