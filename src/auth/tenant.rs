use axum::http::{header, HeaderMap};
use std::sync::Arc;
use tracing::debug;

use crate::auth::error::AuthError;
use crate::config::{MissingHintPolicy, TenantConfig, TenantHintSource};
use crate::database::models::Tenant;
use crate::database::TenantRepository;

/// Maps a request's tenant hint to a tenant record.
///
/// One resolver instance carries the deployment's hint source and
/// missing-hint policy, so every tenant-scoped path applies the same rules.
pub struct TenantResolver {
    tenants: Arc<dyn TenantRepository>,
    source: TenantHintSource,
    missing: MissingHintPolicy,
    super_admin_prefix: String,
}

impl TenantResolver {
    pub fn new(tenants: Arc<dyn TenantRepository>, config: &TenantConfig) -> Self {
        Self {
            tenants,
            source: config.hint_source.clone(),
            missing: config.missing_hint.clone(),
            super_admin_prefix: config.super_admin_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn source(&self) -> &TenantHintSource {
        &self.source
    }

    /// Super-admin paths have no tenant context and skip resolution entirely
    pub fn is_exempt(&self, path: &str) -> bool {
        match path.strip_prefix(&self.super_admin_prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Derive the tenant hint from the configured source, normalized to lowercase
    pub fn hint_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        match &self.source {
            TenantHintSource::Header { name } => headers
                .get(name.as_str())
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_ascii_lowercase())
                .filter(|v| !v.is_empty()),
            TenantHintSource::Subdomain { base_domain } => headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .and_then(|host| subdomain_of(host, base_domain.as_deref())),
        }
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> Result<Tenant, AuthError> {
        let hint = self.hint_from_headers(headers);
        self.resolve_hint(hint.as_deref()).await
    }

    /// Look up the tenant for `hint`, applying the missing-hint policy when absent
    pub async fn resolve_hint(&self, hint: Option<&str>) -> Result<Tenant, AuthError> {
        let domain = match (hint, &self.missing) {
            (Some(hint), _) => hint.to_string(),
            (None, MissingHintPolicy::Reject) => return Err(AuthError::TenantHintMissing),
            (None, MissingHintPolicy::Fallback(domain)) => {
                debug!("No tenant hint on request, using fallback tenant '{}'", domain);
                domain.clone()
            }
        };

        match self.tenants.find_by_domain(&domain).await? {
            Some(tenant) => {
                debug!("Resolved tenant '{}' (id {})", tenant.domain, tenant.id);
                Ok(tenant)
            }
            None => Err(AuthError::TenantNotFound(domain)),
        }
    }
}

/// Extract the tenant label from a Host header value.
///
/// Without a base domain the leftmost label of a host with at least three
/// labels is used. With one, the host must be exactly `<label>.<base_domain>`.
/// IP literals and bare hosts yield `None`.
pub fn subdomain_of(host: &str, base_domain: Option<&str>) -> Option<String> {
    let host = host.trim();
    if host.is_empty() || host.contains(['@', '/', '?', '#']) {
        return None;
    }

    let parsed = url::Url::parse(&format!("http://{}", host)).ok()?;
    let domain = match parsed.host()? {
        url::Host::Domain(domain) => domain.trim_end_matches('.').to_ascii_lowercase(),
        url::Host::Ipv4(_) | url::Host::Ipv6(_) => return None,
    };

    let label = match base_domain {
        Some(base) => domain.strip_suffix(base)?.strip_suffix('.')?.to_string(),
        None => {
            let labels: Vec<&str> = domain.split('.').collect();
            if labels.len() < 3 {
                return None;
            }
            labels[0].to_string()
        }
    };

    if label.is_empty() || label.contains('.') {
        None
    } else {
        Some(label)
    }
}
