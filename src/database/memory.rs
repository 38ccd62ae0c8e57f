use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::database::models::{NewTenant, NewUser, Tenant, UserAccount};
use crate::database::repository::{RepositoryError, TenantRepository, UserRepository};
use crate::types::{TenantId, UserId};

#[derive(Default)]
struct DirectoryState {
    tenants: Vec<Tenant>,
    users: Vec<UserAccount>,
    next_tenant_id: TenantId,
    next_user_id: UserId,
}

/// In-process directory used by tests and the `--memory` development mode.
///
/// Enforces the same uniqueness rules as the PostgreSQL schema.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tenant_count(&self) -> usize {
        self.state.read().await.tenants.len()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

#[async_trait]
impl TenantRepository for MemoryDirectory {
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.tenants.iter().find(|t| t.domain == domain).cloned())
    }

    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, RepositoryError> {
        let mut state = self.state.write().await;

        if state
            .tenants
            .iter()
            .any(|t| t.domain == tenant.domain || t.code == tenant.code)
        {
            return Err(RepositoryError::Conflict("tenant already exists".to_string()));
        }

        state.next_tenant_id += 1;
        let now = Utc::now();
        let created = Tenant {
            id: state.next_tenant_id,
            domain: tenant.domain,
            code: tenant.code,
            name: tenant.name,
            created_at: now,
            updated_at: now,
        };
        state.tenants.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl UserRepository for MemoryDirectory {
    async fn find_by_email_and_tenant(
        &self,
        email: &str,
        tenant_id: Option<TenantId>,
    ) -> Result<Option<UserAccount>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.email == email && u.tenant_id() == tenant_id)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserAccount, RepositoryError> {
        let mut state = self.state.write().await;

        let tenant_id = user.principal.tenant_id();
        if let Some(tenant_id) = tenant_id {
            if !state.tenants.iter().any(|t| t.id == tenant_id) {
                return Err(RepositoryError::NotFound(format!("tenant {}", tenant_id)));
            }
        }
        if state
            .users
            .iter()
            .any(|u| u.email == user.email && u.tenant_id() == tenant_id)
        {
            return Err(RepositoryError::Conflict("user already exists".to_string()));
        }

        state.next_user_id += 1;
        let now = Utc::now();
        let created = UserAccount {
            id: state.next_user_id,
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            principal: user.principal,
            created_at: now,
            updated_at: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Principal;

    fn new_user(email: &str, principal: Principal) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Test".to_string(),
            password_hash: "$2b$04$placeholder".to_string(),
            principal,
        }
    }

    #[tokio::test]
    async fn same_email_may_exist_in_each_scope() {
        let dir = MemoryDirectory::new();
        let demo = dir.create_tenant(NewTenant::new("demo", "DEMO", "Demo")).await.unwrap();
        let acme = dir.create_tenant(NewTenant::new("acme", "ACME", "Acme")).await.unwrap();

        dir.create_user(new_user("a@x.com", Principal::tenant_user(demo.id))).await.unwrap();
        dir.create_user(new_user("a@x.com", Principal::tenant_user(acme.id))).await.unwrap();
        dir.create_user(new_user("a@x.com", Principal::SuperAdmin)).await.unwrap();

        let err = dir
            .create_user(new_user("a@x.com", Principal::tenant_user(demo.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(dir.user_count().await, 3);
    }

    #[tokio::test]
    async fn lookup_is_scoped_to_tenant() {
        let dir = MemoryDirectory::new();
        let demo = dir.create_tenant(NewTenant::new("demo", "DEMO", "Demo")).await.unwrap();
        dir.create_user(new_user("a@x.com", Principal::tenant_user(demo.id))).await.unwrap();

        assert!(dir.find_by_email_and_tenant("a@x.com", Some(demo.id)).await.unwrap().is_some());
        assert!(dir.find_by_email_and_tenant("a@x.com", None).await.unwrap().is_none());
        assert!(dir.find_by_email_and_tenant("a@x.com", Some(demo.id + 1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tenant_domain_and_code_are_unique() {
        let dir = MemoryDirectory::new();
        dir.create_tenant(NewTenant::new("demo", "DEMO", "Demo")).await.unwrap();
        assert!(dir.create_tenant(NewTenant::new("demo", "OTHER", "x")).await.is_err());
        assert!(dir.create_tenant(NewTenant::new("other", "DEMO", "x")).await.is_err());
        assert_eq!(dir.tenant_count().await, 1);
    }
}
