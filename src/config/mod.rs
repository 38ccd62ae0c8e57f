use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub tenant: TenantConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. `None` means no database is configured.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Signs tokens for tenant-scoped principals
    pub jwt_secret: String,
    /// Signs tokens for super-admins. Must differ from `jwt_secret`.
    pub super_jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub clock_skew_secs: u64,
    pub bcrypt_cost: u32,
}

// Keep secrets out of debug output and logs
impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("super_jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("clock_skew_secs", &self.clock_skew_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    pub hint_source: TenantHintSource,
    pub missing_hint: MissingHintPolicy,
    /// Paths under this prefix never go through tenant resolution
    pub super_admin_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub queue_capacity: usize,
}

/// Where the tenant hint is read from. A deployment picks exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenantHintSource {
    /// Explicit request header carrying the tenant domain
    Header { name: String },
    /// Leftmost label of the Host header. With `base_domain` set, the host must
    /// be exactly `<hint>.<base_domain>`.
    Subdomain { base_domain: Option<String> },
}

pub const DEFAULT_TENANT_HEADER: &str = "x-tenant-id";

impl Default for TenantHintSource {
    fn default() -> Self {
        TenantHintSource::Header {
            name: DEFAULT_TENANT_HEADER.to_string(),
        }
    }
}

impl FromStr for TenantHintSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind.trim(), Some(arg.trim())),
            None => (s.trim(), None),
        };

        match (kind, arg) {
            ("header", None) => Ok(TenantHintSource::default()),
            ("header", Some(name)) if !name.is_empty() => Ok(TenantHintSource::Header {
                name: name.to_ascii_lowercase(),
            }),
            ("subdomain", None) => Ok(TenantHintSource::Subdomain { base_domain: None }),
            ("subdomain", Some(base)) if !base.is_empty() => Ok(TenantHintSource::Subdomain {
                base_domain: Some(base.trim_matches('.').to_ascii_lowercase()),
            }),
            _ => Err(ConfigError::invalid(
                "TENANT_HINT_SOURCE",
                s,
                "expected 'header[:name]' or 'subdomain[:base.domain]'",
            )),
        }
    }
}

/// What to do when a request carries no tenant hint. Applied uniformly by
/// every tenant-resolving code path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingHintPolicy {
    Reject,
    Fallback(String),
}

impl FromStr for MissingHintPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once(':') {
            None if s.trim() == "reject" => Ok(MissingHintPolicy::Reject),
            Some(("fallback", domain)) if !domain.trim().is_empty() => {
                Ok(MissingHintPolicy::Fallback(domain.trim().to_ascii_lowercase()))
            }
            _ => Err(ConfigError::invalid(
                "TENANT_MISSING_HINT",
                s,
                "expected 'reject' or 'fallback:<domain>'",
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("JWT_SECRET and SUPER_JWT_SECRET must be different")]
    IdenticalSecrets,

    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: &'static str) -> Self {
        ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason,
        }
    }
}

/// Upper bound on token lifetime: one year
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

// Security knobs fail loudly on a typo like the tenant policy keys do
fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, value, "expected a non-negative integer"))
}

impl AppConfig {
    /// Build the configuration from `APP_ENV` presets plus specific overrides,
    /// then validate it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // API overrides
        if let Some(v) = env::var("SAAS_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.api.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SUPER_JWT_SECRET") {
            self.security.super_jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_number("SECURITY_JWT_EXPIRY_HOURS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_CLOCK_SKEW_SECS") {
            self.security.clock_skew_secs = parse_number("SECURITY_CLOCK_SKEW_SECS", &v)?;
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = parse_number("SECURITY_BCRYPT_COST", &v)?;
        }

        // Tenant resolution overrides. These select policy, so a typo must fail
        // loudly instead of silently keeping the preset.
        if let Ok(v) = env::var("TENANT_HINT_SOURCE") {
            self.tenant.hint_source = v.parse()?;
        }
        if let Ok(v) = env::var("TENANT_MISSING_HINT") {
            self.tenant.missing_hint = v.parse()?;
        }
        if let Ok(v) = env::var("TENANT_SUPER_ADMIN_PREFIX") {
            self.tenant.super_admin_prefix = v;
        }

        // Notification overrides
        if let Ok(v) = env::var("NOTIFY_QUEUE_CAPACITY") {
            self.notify.queue_capacity = v.parse().unwrap_or(self.notify.queue_capacity);
        }

        Ok(self)
    }

    /// Check the invariants the auth core relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let security = &self.security;
        if security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if security.super_jwt_secret.is_empty() {
            return Err(ConfigError::Missing("SUPER_JWT_SECRET"));
        }
        if security.jwt_secret == security.super_jwt_secret {
            return Err(ConfigError::IdenticalSecrets);
        }
        if !(4..=31).contains(&security.bcrypt_cost) {
            return Err(ConfigError::invalid(
                "SECURITY_BCRYPT_COST",
                &security.bcrypt_cost.to_string(),
                "must be between 4 and 31",
            ));
        }
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&security.jwt_expiry_hours) {
            return Err(ConfigError::invalid(
                "SECURITY_JWT_EXPIRY_HOURS",
                &security.jwt_expiry_hours.to_string(),
                "must be between 1 and 8760 hours",
            ));
        }
        let prefix = self.tenant.super_admin_prefix.trim_end_matches('/');
        if !prefix.starts_with('/') || prefix.len() < 2 {
            return Err(ConfigError::invalid(
                "TENANT_SUPER_ADMIN_PREFIX",
                &self.tenant.super_admin_prefix,
                "must be an absolute path below '/'",
            ));
        }
        if self.notify.queue_capacity == 0 {
            return Err(ConfigError::invalid("NOTIFY_QUEUE_CAPACITY", "0", "must be positive"));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "dev-jwt-secret-change-me".to_string(),
                super_jwt_secret: "dev-super-jwt-secret-change-me".to_string(),
                jwt_expiry_hours: 24,
                clock_skew_secs: 5,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            tenant: TenantConfig {
                hint_source: TenantHintSource::default(),
                missing_hint: MissingHintPolicy::Fallback("demo".to_string()),
                super_admin_prefix: "/api/super".to_string(),
            },
            notify: NotifyConfig { queue_capacity: 256 },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            // Secrets have no defaults outside development
            security: SecurityConfig {
                jwt_secret: String::new(),
                super_jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                clock_skew_secs: 5,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            tenant: TenantConfig {
                hint_source: TenantHintSource::default(),
                missing_hint: MissingHintPolicy::Reject,
                super_admin_prefix: "/api/super".to_string(),
            },
            notify: NotifyConfig { queue_capacity: 1024 },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                port: 8080,
                enable_request_logging: false,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                super_jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                clock_skew_secs: 5,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            tenant: TenantConfig {
                hint_source: TenantHintSource::default(),
                missing_hint: MissingHintPolicy::Reject,
                super_admin_prefix: "/api/super".to_string(),
            },
            notify: NotifyConfig { queue_capacity: 1024 },
        }
    }

    /// Development preset with fast hashing, for tests
    pub fn for_tests() -> Self {
        let mut config = Self::development();
        config.security.jwt_secret = "test-tenant-secret".to_string();
        config.security.super_jwt_secret = "test-super-secret".to_string();
        config.security.bcrypt_cost = 4;
        config.security.clock_skew_secs = 0;
        config.tenant.missing_hint = MissingHintPolicy::Reject;
        config
    }
}
