use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use crate::types::{Role, TenantId, TenantRole, UserId};

/// Who a user account acts as.
///
/// A tenant-owned principal always carries exactly one tenant; a super-admin
/// never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    TenantUser { tenant_id: TenantId, role: TenantRole },
    SuperAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPrincipal {
    #[error("role '{0}' is not recognized")]
    UnknownRole(String),
    #[error("super_admin must not belong to a tenant (tenant {0})")]
    SuperAdminWithTenant(TenantId),
    #[error("role '{0}' requires an owning tenant")]
    MissingTenant(Role),
}

impl Principal {
    pub fn tenant_user(tenant_id: TenantId) -> Self {
        Principal::TenantUser {
            tenant_id,
            role: TenantRole::User,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::TenantUser { role, .. } => (*role).into(),
            Principal::SuperAdmin => Role::SuperAdmin,
        }
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        match self {
            Principal::TenantUser { tenant_id, .. } => Some(*tenant_id),
            Principal::SuperAdmin => None,
        }
    }

    /// Rebuild a principal from its stored role tag and nullable tenant column
    pub fn from_parts(role: Role, tenant_id: Option<TenantId>) -> Result<Self, InvalidPrincipal> {
        match (role, tenant_id) {
            (Role::SuperAdmin, None) => Ok(Principal::SuperAdmin),
            (Role::SuperAdmin, Some(tenant_id)) => Err(InvalidPrincipal::SuperAdminWithTenant(tenant_id)),
            (Role::User, Some(tenant_id)) => Ok(Principal::TenantUser {
                tenant_id,
                role: TenantRole::User,
            }),
            (Role::Admin, Some(tenant_id)) => Ok(Principal::TenantUser {
                tenant_id,
                role: TenantRole::Admin,
            }),
            (role @ (Role::User | Role::Admin), None) => Err(InvalidPrincipal::MissingTenant(role)),
        }
    }
}

/// A stored user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub principal: Principal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn role(&self) -> Role {
        self.principal.role()
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.principal.tenant_id()
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role(),
            tenant_id: self.tenant_id(),
            created_at: self.created_at,
        }
    }
}

/// Client-facing projection of a user account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
    pub created_at: DateTime<Utc>,
}

/// Raw `users` row as stored in PostgreSQL
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub tenant_id: Option<TenantId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = InvalidPrincipal;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| InvalidPrincipal::UnknownRole(e.0))?;
        let principal = Principal::from_parts(role, row.tenant_id)?;

        Ok(UserAccount {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            principal,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Input for creating a user account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub principal: Principal,
}
