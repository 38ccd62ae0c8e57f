// handlers/protected/mod.rs - endpoints behind a tenant or super-admin gate
pub mod whoami;

pub use whoami::whoami;
