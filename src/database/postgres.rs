use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseManager;
use crate::database::models::{NewTenant, NewUser, Tenant, UserAccount, UserRow};
use crate::database::repository::{RepositoryError, TenantRepository, UserRepository};
use crate::types::TenantId;

/// Tenant and user directory backed by PostgreSQL
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translate unique-constraint violations into `Conflict`
fn map_write_error(err: sqlx::Error, what: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::Conflict(format!("{} already exists", what))
        }
        _ => RepositoryError::Sqlx(err),
    }
}

fn into_account(row: UserRow) -> Result<UserAccount, RepositoryError> {
    let id = row.id;
    UserAccount::try_from(row).map_err(|source| RepositoryError::Corrupt { id, source })
}

#[async_trait]
impl TenantRepository for PgDirectory {
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, RepositoryError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "SELECT id, domain, code, name, created_at, updated_at FROM tenants WHERE domain = $1",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, RepositoryError> {
        sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (domain, code, name)
            VALUES ($1, $2, $3)
            RETURNING id, domain, code, name, created_at, updated_at
            "#,
        )
        .bind(&tenant.domain)
        .bind(&tenant.code)
        .bind(&tenant.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "tenant"))
    }
}

#[async_trait]
impl UserRepository for PgDirectory {
    async fn find_by_email_and_tenant(
        &self,
        email: &str,
        tenant_id: Option<TenantId>,
    ) -> Result<Option<UserAccount>, RepositoryError> {
        // `IS NOT DISTINCT FROM` matches NULL to NULL, i.e. the super-admin scope
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, role, tenant_id, created_at, updated_at
            FROM users
            WHERE email = $1
            AND tenant_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(email)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_account).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<UserAccount, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, name, password_hash, role, tenant_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, password_hash, role, tenant_id, created_at, updated_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.principal.role().as_str())
        .bind(user.principal.tenant_id())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "user"))?;

        into_account(row)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        DatabaseManager::health_check(&self.pool)
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))
    }
}
