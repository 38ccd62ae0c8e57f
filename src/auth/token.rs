//! Signed, expiring session tokens (HS256 JWT).
//!
//! A codec is bound to one audience and its secret. Tenant tokens and
//! super-admin tokens are signed with different secrets, so a token minted for
//! one audience fails signature verification on the other codec.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;
use crate::config::SecurityConfig;
use crate::types::{Role, TenantId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Tenant,
    SuperAdmin,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Tenant => "tenant",
            Audience::SuperAdmin => "super_admin",
        }
    }
}

/// Identity carried by a token, without its validity window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalClaims {
    pub principal_id: UserId,
    pub email: String,
    pub role: Role,
    pub tenant_id: Option<TenantId>,
}

/// Full claim set as it travels on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "user_id")]
    pub principal_id: UserId,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl SessionClaims {
    pub fn principal(&self) -> PrincipalClaims {
        PrincipalClaims {
            principal_id: self.principal_id,
            email: self.email.clone(),
            role: self.role,
            tenant_id: self.tenant_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

impl IssuedToken {
    /// Seconds of validity at issuance
    pub fn expires_in(&self) -> i64 {
        self.claims.expires_at - self.claims.issued_at
    }
}

pub struct TokenCodec {
    audience: Audience,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    leeway_secs: u64,
}

impl TokenCodec {
    pub fn new(audience: Audience, secret: &str, ttl: Duration, leeway_secs: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::TokenIssuanceError(format!(
                "{} signing secret is empty",
                audience.as_str()
            )));
        }

        Ok(Self {
            audience,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            leeway_secs,
        })
    }

    /// Build the codec for `audience` from the security settings
    pub fn from_config(audience: Audience, security: &SecurityConfig) -> Result<Self, AuthError> {
        let secret = match audience {
            Audience::Tenant => &security.jwt_secret,
            Audience::SuperAdmin => &security.super_jwt_secret,
        };
        let ttl = i64::try_from(security.jwt_expiry_hours)
            .ok()
            .filter(|hours| *hours > 0)
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                AuthError::TokenIssuanceError(format!(
                    "token lifetime of {} hours is out of range",
                    security.jwt_expiry_hours
                ))
            })?;
        Self::new(audience, secret, ttl, security.clock_skew_secs)
    }

    pub fn audience(&self) -> Audience {
        self.audience
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, principal: &PrincipalClaims) -> Result<IssuedToken, AuthError> {
        self.issue_at(principal, Utc::now().timestamp())
    }

    /// Issue a token as if the clock read `now` (unix seconds)
    pub fn issue_at(&self, principal: &PrincipalClaims, now: i64) -> Result<IssuedToken, AuthError> {
        let claims = SessionClaims {
            principal_id: principal.principal_id,
            email: principal.email.clone(),
            role: principal.role,
            tenant_id: principal.tenant_id,
            issued_at: now,
            expires_at: now + self.ttl.num_seconds(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenIssuanceError(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry, then return the claims.
    ///
    /// The signature is checked before any claim is looked at; claims are only
    /// returned when every check passes.
    pub fn parse(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::TokenSignatureInvalid,
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenMalformed(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codec(audience: Audience, secret: &str) -> TokenCodec {
        TokenCodec::new(audience, secret, Duration::hours(24), 0).unwrap()
    }

    fn tenant_principal() -> PrincipalClaims {
        PrincipalClaims {
            principal_id: 42,
            email: "a@demo.com".into(),
            role: Role::User,
            tenant_id: Some(7),
        }
    }

    #[test]
    fn round_trip_preserves_claims() {
        let codec = codec(Audience::Tenant, "tenant-secret");
        let issued = codec.issue(&tenant_principal()).unwrap();
        let parsed = codec.parse(&issued.token).unwrap();

        assert_eq!(parsed.principal(), tenant_principal());
        assert_eq!(parsed, issued.claims);
        assert_eq!(issued.expires_in(), 24 * 3600);
    }

    #[test]
    fn super_admin_claims_omit_tenant() {
        let codec = codec(Audience::SuperAdmin, "super-secret");
        let principal = PrincipalClaims {
            principal_id: 1,
            email: "admin@saas.com".into(),
            role: Role::SuperAdmin,
            tenant_id: None,
        };
        let issued = codec.issue(&principal).unwrap();
        assert_eq!(codec.parse(&issued.token).unwrap().principal(), principal);
    }

    #[test]
    fn audiences_do_not_accept_each_other() {
        let tenant = codec(Audience::Tenant, "tenant-secret");
        let sup = codec(Audience::SuperAdmin, "super-secret");

        let tenant_token = tenant.issue(&tenant_principal()).unwrap().token;
        assert!(matches!(sup.parse(&tenant_token), Err(AuthError::TokenSignatureInvalid)));

        let mut principal = tenant_principal();
        principal.role = Role::SuperAdmin;
        principal.tenant_id = None;
        let super_token = sup.issue(&principal).unwrap().token;
        assert!(matches!(tenant.parse(&super_token), Err(AuthError::TokenSignatureInvalid)));
    }

    #[test]
    fn from_config_refuses_unrepresentable_lifetime() {
        let mut security = crate::config::AppConfig::for_tests().security;
        for hours in [0, u64::MAX, i64::MAX as u64] {
            security.jwt_expiry_hours = hours;
            assert!(
                matches!(
                    TokenCodec::from_config(Audience::Tenant, &security),
                    Err(AuthError::TokenIssuanceError(_))
                ),
                "{} hours accepted",
                hours
            );
        }

        security.jwt_expiry_hours = 2;
        let codec = TokenCodec::from_config(Audience::Tenant, &security).unwrap();
        assert_eq!(codec.ttl(), Duration::hours(2));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec(Audience::Tenant, "tenant-secret");
        let long_ago = Utc::now().timestamp() - 48 * 3600;
        let issued = codec.issue_at(&tenant_principal(), long_ago).unwrap();

        assert!(matches!(codec.parse(&issued.token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn leeway_tolerates_small_skew() {
        let strict = codec(Audience::Tenant, "tenant-secret");
        let lenient = TokenCodec::new(Audience::Tenant, "tenant-secret", Duration::hours(1), 120).unwrap();

        // Expired 30 seconds ago
        let issued_at = Utc::now().timestamp() - 3600 - 30;
        let token = lenient.issue_at(&tenant_principal(), issued_at).unwrap().token;

        assert!(lenient.parse(&token).is_ok());
        assert!(matches!(strict.parse(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn expired_token_with_foreign_signature_fails_on_signature() {
        let other = codec(Audience::Tenant, "other-secret");
        let ours = codec(Audience::Tenant, "tenant-secret");
        let long_ago = Utc::now().timestamp() - 48 * 3600;
        let token = other.issue_at(&tenant_principal(), long_ago).unwrap().token;

        assert!(matches!(ours.parse(&token), Err(AuthError::TokenSignatureInvalid)));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec(Audience::Tenant, "tenant-secret");
        let token = codec.issue(&tenant_principal()).unwrap().token;

        // Swap in a payload claiming a different tenant, keep the old signature
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = json!({
            "user_id": 42,
            "email": "a@demo.com",
            "role": "admin",
            "tenant_id": 8,
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + 3600,
        });
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &forged_claims,
            &EncodingKey::from_secret(b"attacker"),
        )
        .unwrap();
        let forged_payload = forged.split('.').nth(1).unwrap();
        let spliced = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert!(matches!(codec.parse(&spliced), Err(AuthError::TokenSignatureInvalid)));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec(Audience::Tenant, "tenant-secret");
        assert!(matches!(codec.parse("not-a-token"), Err(AuthError::TokenMalformed(_))));
        assert!(matches!(codec.parse(""), Err(AuthError::TokenMalformed(_))));
    }

    #[test]
    fn unknown_role_is_malformed() {
        let secret = "tenant-secret";
        let codec = codec(Audience::Tenant, secret);
        let claims = json!({
            "user_id": 1,
            "email": "x@demo.com",
            "role": "owner",
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + 3600,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(codec.parse(&token), Err(AuthError::TokenMalformed(_))));
    }

    #[test]
    fn wire_format_uses_jwt_claim_names() {
        let codec = codec(Audience::Tenant, "tenant-secret");
        let issued = codec.issue(&tenant_principal()).unwrap();
        let value = serde_json::to_value(&issued.claims).unwrap();

        assert_eq!(value["user_id"], 42);
        assert_eq!(value["role"], "user");
        assert_eq!(value["tenant_id"], 7);
        assert!(value.get("iat").is_some());
        assert!(value.get("exp").is_some());
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(TokenCodec::new(Audience::Tenant, "", Duration::hours(1), 0).is_err());
    }
}
