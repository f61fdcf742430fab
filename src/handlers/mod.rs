// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod admin;
mod auth;
mod error;
mod guard;
mod health;
mod metrics;
mod user;
mod views;

// Core handlers
pub use error::not_found;
pub use health::health_check;
pub use metrics::{metrics_handler, track_http_metrics};

// Login, signup and session handlers
pub use auth::{
    admin_login, admin_login_form, check_session, login, login_form, logout, signup, signup_form,
};

// Admin panel handlers
pub use admin::{
    add_user_form, block_user, create_user, dashboard, delete_user, edit_user_form, list_users,
    unblock_user, update_user,
};

// User area
pub use user::home;

// Session resolution and role guards
pub use guard::{
    load_session, redirect_authenticated, require_role, AdminOnly, CurrentSession, UserOnly,
};
