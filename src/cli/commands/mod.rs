pub mod password;
pub mod seed;
pub mod super_admin;
pub mod tenant;
pub mod token;
