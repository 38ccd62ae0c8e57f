use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::TenantId;

/// An isolated customer organization. `domain` and `code` are globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: TenantId,
    pub domain: String,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a tenant with a directory
#[derive(Debug, Clone, Deserialize)]
pub struct NewTenant {
    pub domain: String,
    pub code: String,
    pub name: String,
}

impl NewTenant {
    pub fn new(domain: impl Into<String>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: domain.into().to_ascii_lowercase(),
            code: code.into(),
            name: name.into(),
        }
    }
}
