use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

use crate::auth::AuthError;
use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::tenant::ResolvedTenant;
use crate::types::{Role, TenantId, UserId};

/// Per-request auth context for handlers behind a gate: the verified
/// principal plus the resolved tenant, if the route class has one.
#[derive(Clone, Debug, Serialize)]
pub struct RequestContext {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
}

impl RequestContext {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthorization)?;
        let tenant = parts.extensions.get::<ResolvedTenant>().map(|t| t.0.clone());

        Ok(Self {
            user_id: user.user_id,
            email: user.email,
            role: user.role,
            tenant_id: user.tenant_id,
            tenant,
        })
    }
}
