use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::error::AuthError;
use crate::auth::password::{CredentialError, PasswordHasher};
use crate::auth::token::{IssuedToken, PrincipalClaims, TokenCodec};
use crate::database::models::{NewUser, Principal, UserAccount, UserView};
use crate::database::{RepositoryError, UserRepository};
use crate::notify::{NotificationQueue, WelcomeNotification};
use crate::types::TenantId;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserView,
}

impl AuthResponse {
    fn new(issued: IssuedToken, account: &UserAccount) -> Self {
        Self {
            expires_in: issued.expires_in(),
            token: issued.token,
            user: account.view(),
        }
    }
}

/// Which population a login is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginScope {
    Tenant(TenantId),
    SuperAdmin,
}

/// Credential lookup, verification and token issuance for every principal class
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tenant_tokens: Arc<TokenCodec>,
    super_tokens: Arc<TokenCodec>,
    notifications: NotificationQueue,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        tenant_tokens: Arc<TokenCodec>,
        super_tokens: Arc<TokenCodec>,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            users,
            hasher,
            tenant_tokens,
            super_tokens,
            notifications,
        }
    }

    /// Authenticate `email`/`password` within `scope` and mint a session token
    /// for the matching audience.
    ///
    /// An unknown email and a wrong password both yield `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str, scope: LoginScope) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(email);
        let lookup_tenant = match scope {
            LoginScope::Tenant(tenant_id) => Some(tenant_id),
            LoginScope::SuperAdmin => None,
        };

        let account = self
            .users
            .find_by_email_and_tenant(&email, lookup_tenant)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // The lookup is already scoped; this guards against a directory that
        // returns a principal from somewhere else.
        match (scope, account.principal) {
            (LoginScope::SuperAdmin, Principal::SuperAdmin) => {}
            (LoginScope::SuperAdmin, Principal::TenantUser { .. }) => return Err(AuthError::ForbiddenRole),
            (LoginScope::Tenant(expected), Principal::TenantUser { tenant_id, .. }) if tenant_id == expected => {}
            (LoginScope::Tenant(_), _) => return Err(AuthError::TenantMismatch),
        }

        self.check_password(&account, password).await?;

        let codec = match scope {
            LoginScope::Tenant(_) => &self.tenant_tokens,
            LoginScope::SuperAdmin => &self.super_tokens,
        };
        let issued = codec.issue(&principal_claims(&account))?;

        info!(
            user_id = account.id,
            role = %account.role(),
            tenant_id = ?account.tenant_id(),
            "Login succeeded"
        );
        Ok(AuthResponse::new(issued, &account))
    }

    /// Create a regular user in `tenant_id` and sign them in.
    ///
    /// The welcome notification is queued after the token is minted and is
    /// never awaited.
    pub async fn register(&self, request: RegisterRequest, tenant_id: TenantId) -> Result<AuthResponse, AuthError> {
        let account = self
            .create_account(request, Principal::tenant_user(tenant_id))
            .await?;

        let issued = self.tenant_tokens.issue(&principal_claims(&account))?;

        self.notifications.enqueue(WelcomeNotification {
            email: account.email.clone(),
            name: account.name.clone(),
        });

        info!(user_id = account.id, tenant_id, "Registered user");
        Ok(AuthResponse::new(issued, &account))
    }

    /// Provision a super-admin in the tenantless scope. Operator-only; no token
    /// is issued and no notification is sent.
    pub async fn provision_super_admin(&self, request: RegisterRequest) -> Result<UserAccount, AuthError> {
        let account = self.create_account(request, Principal::SuperAdmin).await?;
        info!(user_id = account.id, "Provisioned super admin");
        Ok(account)
    }

    async fn create_account(&self, request: RegisterRequest, principal: Principal) -> Result<UserAccount, AuthError> {
        let email = normalize_email(&request.email);
        validate_registration(&email, &request.password, &request.name)?;

        if self
            .users
            .find_by_email_and_tenant(&email, principal.tenant_id())
            .await?
            .is_some()
        {
            return Err(AuthError::PrincipalAlreadyExists);
        }

        let password_hash = self
            .hasher
            .hash_blocking(request.password)
            .await
            .map_err(|e| AuthError::HashingError(e.to_string()))?;

        self.users
            .create_user(NewUser {
                email,
                name: request.name.trim().to_string(),
                password_hash,
                principal,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                RepositoryError::Conflict(_) => AuthError::PrincipalAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    async fn check_password(&self, account: &UserAccount, password: &str) -> Result<(), AuthError> {
        match self
            .hasher
            .verify_blocking(account.password_hash.clone(), password.to_string())
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(CredentialError::Verification(e)) | Err(CredentialError::Hashing(e)) => {
                warn!(user_id = account.id, "Stored password digest is unusable: {}", e);
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

fn principal_claims(account: &UserAccount) -> PrincipalClaims {
    PrincipalClaims {
        principal_id: account.id,
        email: account.email.clone(),
        role: account.role(),
        tenant_id: account.tenant_id(),
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Basic shape checks for registration input
pub fn validate_registration(email: &str, password: &str, name: &str) -> Result<(), AuthError> {
    validate_email_format(email)?;

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if name.trim().is_empty() {
        return Err(AuthError::InvalidInput("Name is required".to_string()));
    }

    Ok(())
}

fn validate_email_format(email: &str) -> Result<(), AuthError> {
    let invalid = || AuthError::InvalidInput("Invalid email format".to_string());

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(())
}
