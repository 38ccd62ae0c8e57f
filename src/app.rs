//! Application state and HTTP routing.
//!
//! Route classes:
//! - public: `/health`, tenant login/registration (tenant resolution only)
//!   and `/api/super-auth/login` (no tenant)
//! - tenant-gated: everything else under `/api/v1`
//! - super-gated: everything under the super-admin prefix (`/api/super`)

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::auth::{Audience, AuthError, Authenticator, PasswordHasher, TenantResolver, TokenCodec};
use crate::config::AppConfig;
use crate::database::{TenantRepository, UserRepository};
use crate::handlers::{protected, public};
use crate::middleware::{require_role, require_tenant, resolve_tenant, super_admin_auth, tenant_auth, RoleSet};
use crate::notify::{NotificationQueue, Notifier};
use crate::types::Role;

/// Shared, immutable per-process state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: Arc<TenantResolver>,
    pub authenticator: Arc<Authenticator>,
    pub tenant_tokens: Arc<TokenCodec>,
    pub super_tokens: Arc<TokenCodec>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Wire the auth core over `directory`. Spawns the notification worker,
    /// so it must run inside a tokio runtime.
    pub fn build<D>(
        config: AppConfig,
        directory: D,
        notifier: Arc<dyn Notifier>,
    ) -> Result<(Self, JoinHandle<()>), AuthError>
    where
        D: TenantRepository + UserRepository + 'static,
    {
        let directory = Arc::new(directory);
        let tenants: Arc<dyn TenantRepository> = directory.clone();
        let users: Arc<dyn UserRepository> = directory;

        let tenant_tokens = Arc::new(TokenCodec::from_config(Audience::Tenant, &config.security)?);
        let super_tokens = Arc::new(TokenCodec::from_config(Audience::SuperAdmin, &config.security)?);

        let (notifications, worker) = NotificationQueue::spawn(notifier, config.notify.queue_capacity);

        let authenticator = Authenticator::new(
            users.clone(),
            PasswordHasher::new(config.security.bcrypt_cost),
            tenant_tokens.clone(),
            super_tokens.clone(),
            notifications,
        );

        let state = Self {
            resolver: Arc::new(TenantResolver::new(tenants, &config.tenant)),
            authenticator: Arc::new(authenticator),
            tenant_tokens,
            super_tokens,
            users,
            config: Arc::new(config),
        };

        Ok((state, worker))
    }
}

/// The service router with no downstream routes mounted
pub fn router(state: AppState) -> Router {
    router_with(state, Router::new(), Router::new())
}

/// Build the service router, mounting `tenant_api` under `/api/v1` behind the
/// tenant gate and `super_api` under the super-admin prefix behind the
/// super-admin gate.
pub fn router_with(state: AppState, tenant_api: Router<AppState>, super_api: Router<AppState>) -> Router {
    let admin_only = Router::new()
        .route("/me", get(protected::whoami))
        .route_layer(middleware::from_fn_with_state(RoleSet::new([Role::Admin]), require_role));

    // Layers run bottom-up: token check first, then tenant presence
    let tenant_gated = Router::new()
        .route("/auth/me", get(protected::whoami))
        .nest("/admin", admin_only)
        .merge(tenant_api)
        .route_layer(middleware::from_fn(require_tenant))
        .route_layer(middleware::from_fn_with_state(state.clone(), tenant_auth));

    let v1 = Router::new()
        .route("/auth/login", post(public::tenant_login))
        .route("/auth/register", post(public::tenant_register))
        .merge(tenant_gated)
        .route_layer(middleware::from_fn_with_state(state.clone(), resolve_tenant));

    let super_gated = Router::new()
        .route("/me", get(protected::whoami))
        .merge(super_api)
        .route_layer(middleware::from_fn_with_state(state.clone(), super_admin_auth));

    let super_prefix = state.config.tenant.super_admin_prefix.trim_end_matches('/').to_string();
    let cors = cors_layer(&state.config.api.cors_origins);

    let router = Router::new()
        .route("/health", get(public::health))
        .route("/api/super-auth/login", post(public::super_login))
        .nest("/api/v1", v1)
        .nest(&super_prefix, super_gated)
        .layer(cors);

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(allowed)
}
