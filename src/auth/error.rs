use thiserror::Error;

use crate::database::RepositoryError;

/// Failure taxonomy of tenant resolution, authentication and access gating.
///
/// Several variants must look identical to clients. The `ApiError`
/// conversion decides what each one may reveal.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("principal does not belong to the requested tenant")]
    TenantMismatch,

    #[error("principal role is not allowed here")]
    ForbiddenRole,

    #[error("a principal with this email already exists in this scope")]
    PrincipalAlreadyExists,

    #[error("no tenant matches '{0}'")]
    TenantNotFound(String),

    #[error("request carries no tenant hint")]
    TenantHintMissing,

    #[error("tenant context required")]
    TenantRequired,

    #[error("missing authorization header")]
    MissingAuthorization,

    #[error("malformed token: {0}")]
    TokenMalformed(String),

    #[error("token signature does not match")]
    TokenSignatureInvalid,

    #[error("token expired")]
    TokenExpired,

    #[error("password hashing failed: {0}")]
    HashingError(String),

    #[error("token issuance failed: {0}")]
    TokenIssuanceError(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Stable label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::TenantMismatch => "tenant_mismatch",
            AuthError::ForbiddenRole => "forbidden_role",
            AuthError::PrincipalAlreadyExists => "principal_already_exists",
            AuthError::TenantNotFound(_) => "tenant_not_found",
            AuthError::TenantHintMissing => "tenant_hint_missing",
            AuthError::TenantRequired => "tenant_required",
            AuthError::MissingAuthorization => "missing_authorization",
            AuthError::TokenMalformed(_) => "token_malformed",
            AuthError::TokenSignatureInvalid => "token_signature_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::HashingError(_) => "hashing_error",
            AuthError::TokenIssuanceError(_) => "token_issuance_error",
            AuthError::InvalidInput(_) => "invalid_input",
            AuthError::Repository(_) => "repository",
        }
    }

    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AuthError::TokenMalformed(_) | AuthError::TokenSignatureInvalid | AuthError::TokenExpired
        )
    }
}
