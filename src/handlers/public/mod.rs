// handlers/public/mod.rs - endpoints reachable without a session token
pub mod auth;
pub mod health;

pub use auth::{super_login, tenant_login, tenant_register};
pub use health::health;
