//! Minimal server-rendered HTML pages.
//!
//! Every piece of dynamic text goes through [`escape`] before it reaches the
//! markup.

use crate::domain::{Role, UserView};
use axum::response::Html;
use std::fmt::Write;

/// Escapes text for use in element content and double-quoted attributes.
pub(crate) fn escape(raw: &str) -> String {
    // ---
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    // ---
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    ))
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|e| format!("<p class=\"error\">{}</p>\n", escape(e)))
        .unwrap_or_default()
}

fn role_options(selected: Role) -> String {
    // ---
    [Role::User, Role::Admin]
        .iter()
        .map(|r| {
            let sel = if *r == selected { " selected" } else { "" };
            format!("<option value=\"{r}\"{sel}>{r}</option>")
        })
        .collect()
}

pub(crate) fn login_page(error: Option<&str>) -> Html<String> {
    // ---
    let body = format!(
        "<h1>Login</h1>\n{}\
         <form method=\"post\" action=\"/login\">\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Login</button>\n</form>\n\
         <p><a href=\"/signup\">Create an account</a></p>",
        error_banner(error)
    );
    layout("Login", &body)
}

pub(crate) fn signup_page(error: Option<&str>) -> Html<String> {
    // ---
    let body = format!(
        "<h1>Sign up</h1>\n{}\
         <form method=\"post\" action=\"/signup\">\n\
         <label>Username <input type=\"text\" name=\"username\" required></label>\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Sign up</button>\n</form>\n\
         <p><a href=\"/login\">Back to login</a></p>",
        error_banner(error)
    );
    layout("Sign up", &body)
}

pub(crate) fn admin_login_page(error: Option<&str>) -> Html<String> {
    // ---
    let body = format!(
        "<h1>Admin login</h1>\n{}\
         <form method=\"post\" action=\"/admin/login\">\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <button type=\"submit\">Login</button>\n</form>",
        error_banner(error)
    );
    layout("Admin login", &body)
}

pub(crate) fn dashboard_page(operator_email: &str) -> Html<String> {
    // ---
    let body = format!(
        "<h1>Admin dashboard</h1>\n<p>Signed in as {}</p>\n\
         <ul>\n<li><a href=\"/admin/users\">Manage users</a></li>\n\
         <li><a href=\"/admin/users/add\">Add user</a></li>\n</ul>\n\
         <p><a href=\"/logout\">Logout</a></p>",
        escape(operator_email)
    );
    layout("Admin dashboard", &body)
}

pub(crate) fn users_page(users: &[UserView], search: Option<&str>) -> Html<String> {
    // ---
    let mut rows = String::new();
    for user in users {
        let id = user.id;
        let (toggle, label) = if user.is_blocked {
            ("unblock", "Unblock")
        } else {
            ("block", "Block")
        };
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>\
             <a href=\"/admin/users/{id}/edit\">Edit</a> \
             <form method=\"post\" action=\"/admin/users/{id}/{toggle}\">\
             <button>{label}</button></form> \
             <form method=\"post\" action=\"/admin/users/{id}/delete\">\
             <button>Delete</button></form>\
             </td></tr>\n",
            escape(&user.username),
            escape(&user.email),
            user.role,
            if user.is_blocked { "blocked" } else { "active" },
        );
    }

    let body = format!(
        "<h1>Users</h1>\n\
         <form method=\"get\" action=\"/admin/users\">\n\
         <input type=\"text\" name=\"search\" value=\"{}\">\n\
         <button type=\"submit\">Search</button>\n</form>\n\
         <p><a href=\"/admin/users/add\">Add user</a> | \
         <a href=\"/admin/dashboard\">Dashboard</a></p>\n\
         <table>\n<tr><th>Username</th><th>Email</th><th>Role</th><th>Status</th><th></th></tr>\n\
         {rows}</table>",
        escape(search.unwrap_or_default())
    );
    layout("Users", &body)
}

pub(crate) fn add_user_page(error: Option<&str>) -> Html<String> {
    // ---
    let body = format!(
        "<h1>Add user</h1>\n{}\
         <form method=\"post\" action=\"/admin/users\">\n\
         <label>Username <input type=\"text\" name=\"username\" required></label>\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <label>Role <select name=\"role\">{}</select></label>\n\
         <button type=\"submit\">Create</button>\n</form>\n\
         <p><a href=\"/admin/users\">Back</a></p>",
        error_banner(error),
        role_options(Role::User)
    );
    layout("Add user", &body)
}

pub(crate) fn edit_user_page(user: &UserView, error: Option<&str>) -> Html<String> {
    // ---
    let body = format!(
        "<h1>Edit user</h1>\n{}\
         <form method=\"post\" action=\"/admin/users/{}\">\n\
         <label>Username <input type=\"text\" name=\"username\" value=\"{}\" required></label>\n\
         <label>Email <input type=\"email\" name=\"email\" value=\"{}\" required></label>\n\
         <label>Role <select name=\"role\">{}</select></label>\n\
         <button type=\"submit\">Save</button>\n</form>\n\
         <p><a href=\"/admin/users\">Back</a></p>",
        error_banner(error),
        user.id,
        escape(&user.username),
        escape(&user.email),
        role_options(user.role)
    );
    layout("Edit user", &body)
}

pub(crate) fn home_page(email: &str) -> Html<String> {
    // ---
    let body = format!(
        "<h1>Welcome</h1>\n<p>Signed in as {}</p>\n<p><a href=\"/logout\">Logout</a></p>",
        escape(email)
    );
    layout("Home", &body)
}

pub(crate) fn error_page(message: &str) -> Html<String> {
    let body = format!("<h1>{}</h1>\n<p><a href=\"/\">Home</a></p>", escape(message));
    layout(message, &body)
}
