pub mod auth;
pub mod context;
pub mod response;
pub mod tenant;

pub use auth::{require_role, super_admin_auth, tenant_auth, AuthUser, RoleSet};
pub use context::RequestContext;
pub use response::{ApiResponse, ApiResult};
pub use tenant::{require_tenant, resolve_tenant, ResolvedTenant};
