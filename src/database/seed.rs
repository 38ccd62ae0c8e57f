use anyhow::{Context, Result};
use tracing::info;

use crate::auth::PasswordHasher;
use crate::database::models::{NewTenant, NewUser, Principal};
use crate::database::{TenantRepository, UserRepository};
use crate::types::TenantRole;

/// Demo tenants: (domain, code, name)
pub const DEMO_TENANTS: &[(&str, &str, &str)] = &[
    ("demo", "DEMO001", "Demo Company"),
    ("techstart", "TECH002", "Tech Startup"),
];

/// Password of every seeded tenant account
pub const DEMO_TENANT_PASSWORD: &str = "password";

pub const DEMO_SUPER_ADMIN_EMAIL: &str = "admin@saas.com";
pub const DEMO_SUPER_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub tenants: usize,
    pub users: usize,
}

/// Insert demo tenants, one admin and one user per tenant
/// (`admin@<domain>.com`, `user@<domain>.com`) and the demo super-admin.
/// Records that already exist are left alone.
pub async fn seed_demo_data<D>(directory: &D, hasher: PasswordHasher) -> Result<SeedSummary>
where
    D: TenantRepository + UserRepository,
{
    let mut summary = SeedSummary::default();
    let tenant_digest = hasher
        .hash_blocking(DEMO_TENANT_PASSWORD.to_string())
        .await
        .context("hashing demo password")?;

    for (domain, code, name) in DEMO_TENANTS {
        let tenant = match directory.find_by_domain(domain).await? {
            Some(existing) => existing,
            None => {
                summary.tenants += 1;
                directory
                    .create_tenant(NewTenant::new(*domain, *code, *name))
                    .await
                    .with_context(|| format!("creating tenant '{}'", domain))?
            }
        };

        for (local, role) in [("admin", TenantRole::Admin), ("user", TenantRole::User)] {
            let email = format!("{}@{}.com", local, tenant.domain);
            if directory
                .find_by_email_and_tenant(&email, Some(tenant.id))
                .await?
                .is_some()
            {
                continue;
            }

            directory
                .create_user(NewUser {
                    name: format!("{} {}", tenant.name, local),
                    email,
                    password_hash: tenant_digest.clone(),
                    principal: Principal::TenantUser { tenant_id: tenant.id, role },
                })
                .await?;
            summary.users += 1;
        }
    }

    if directory
        .find_by_email_and_tenant(DEMO_SUPER_ADMIN_EMAIL, None)
        .await?
        .is_none()
    {
        let digest = hasher
            .hash_blocking(DEMO_SUPER_ADMIN_PASSWORD.to_string())
            .await
            .context("hashing super admin password")?;
        directory
            .create_user(NewUser {
                email: DEMO_SUPER_ADMIN_EMAIL.to_string(),
                name: "Super Admin".to_string(),
                password_hash: digest,
                principal: Principal::SuperAdmin,
            })
            .await?;
        summary.users += 1;
    }

    info!(
        tenants = summary.tenants,
        users = summary.users,
        "Demo data seeded"
    );
    Ok(summary)
}
