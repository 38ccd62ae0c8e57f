use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::user::InvalidPrincipal;
use crate::database::models::{NewTenant, NewUser, Tenant, UserAccount};
use crate::types::TenantId;

/// Errors surfaced by directory implementations
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored record violates the principal invariants
    #[error("Corrupt record {id}: {source}")]
    Corrupt {
        id: i32,
        #[source]
        source: InvalidPrincipal,
    },

    /// A referenced record (e.g. the owning tenant) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Tenant lookup capability consumed by the tenant resolver
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Find a tenant by its unique domain. `domain` is already normalized to lowercase.
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, RepositoryError>;

    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, RepositoryError>;
}

/// User lookup capability consumed by the authenticator
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by email within one scope: a tenant, or the tenantless
    /// super-admin scope when `tenant_id` is `None`.
    async fn find_by_email_and_tenant(
        &self,
        email: &str,
        tenant_id: Option<TenantId>,
    ) -> Result<Option<UserAccount>, RepositoryError>;

    /// Insert a user. Fails with `Conflict` when the email already exists in
    /// the same scope.
    async fn create_user(&self, user: NewUser) -> Result<UserAccount, RepositoryError>;

    /// Cheap connectivity probe for health checks
    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
