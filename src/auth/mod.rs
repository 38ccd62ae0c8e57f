pub mod error;
pub mod password;
pub mod service;
pub mod tenant;
pub mod token;

pub use error::AuthError;
pub use password::{CredentialError, PasswordHasher};
pub use service::{AuthResponse, Authenticator, LoginRequest, LoginScope, RegisterRequest};
pub use tenant::TenantResolver;
pub use token::{Audience, IssuedToken, PrincipalClaims, SessionClaims, TokenCodec};
