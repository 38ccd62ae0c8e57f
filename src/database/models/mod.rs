pub mod tenant;
pub mod user;

pub use tenant::{NewTenant, Tenant};
pub use user::{NewUser, Principal, UserAccount, UserRow, UserView};
