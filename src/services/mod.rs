//! Application services sitting between the HTTP handlers and the stores.

mod admin;
mod auth;
mod password;

pub use admin::AdminService;
pub use auth::AuthService;
pub use password::{hash_password, verify_password};
