use reqwest::{header, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;

mod common;
use common::{location, raw_set_cookie, session_cookie, TestServer, ADMIN_EMAIL};

#[tokio::test]
async fn health_endpoint_works() {
    // ---
    let server = TestServer::new().await;

    for path in ["/health", "/health?mode=full"] {
        let res = server.get(path, None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }
}

#[tokio::test]
async fn root_and_login_render_the_login_form() {
    // ---
    let server = TestServer::new().await;

    for path in ["/", "/login", "/signup", "/admin/login"] {
        let res = server.get(path, None).await;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        let body = res.text().await.unwrap();
        assert!(body.contains("<form"), "{path}");
    }
}

#[tokio::test]
async fn fresh_signup_then_login_reaches_home() {
    // ---
    let server = TestServer::new().await;

    let res = server.signup("alice", "alice@x.com", "pw1").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res).as_deref(), Some("/login"));

    let cookie = server.login_user("alice@x.com", "pw1").await;
    let res = server.get("/user/home", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("alice@x.com"));
}

#[tokio::test]
async fn session_cookie_attributes() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw1").await;

    let res = server
        .post_form("/login", &[("email", "alice@x.com"), ("password", "pw1")], None)
        .await;
    let raw = raw_set_cookie(&res).unwrap();
    assert!(raw.starts_with("portal_session="));
    assert!(raw.contains("HttpOnly"));
    assert!(raw.contains("SameSite=Lax"));
    assert!(raw.contains("Path=/"));
    assert!(raw.contains("Max-Age=86400"));
}

#[tokio::test]
async fn duplicate_signup_email_is_rejected_and_first_account_kept() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "first").await;

    let res = server.signup("alice2", "alice@x.com", "second").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Email already in use"));

    server.login_user("alice@x.com", "first").await;
    let res = server
        .post_form("/login", &[("email", "alice@x.com"), ("password", "second")], None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Invalid credentials"));
}

#[tokio::test]
async fn duplicate_signup_username_is_rejected() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;

    let res = server.signup("alice", "other@x.com", "pw").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Username already in use"));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_rerender_login() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;

    for (email, password) in [("alice@x.com", "bad"), ("nobody@x.com", "pw")] {
        let res = server
            .post_form("/login", &[("email", email), ("password", password)], None)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(session_cookie(&res).is_none());
        assert!(res.text().await.unwrap().contains("Invalid credentials"));
    }
}

#[tokio::test]
async fn blocked_user_cannot_login_until_unblocked() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    let id = server.user_id("alice@x.com").await;
    let admin = server.login_admin().await;

    let res = server
        .post_form(&format!("/admin/users/{id}/block"), &[], Some(&admin))
        .await;
    assert_eq!(location(&res).as_deref(), Some("/admin/users"));

    let res = server
        .post_form("/login", &[("email", "alice@x.com"), ("password", "pw")], None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_cookie(&res).is_none());
    assert!(res
        .text()
        .await
        .unwrap()
        .contains("You are blocked from entering this site"));

    server
        .post_form(&format!("/admin/users/{id}/unblock"), &[], Some(&admin))
        .await;
    server.login_user("alice@x.com", "pw").await;
}

#[tokio::test]
async fn user_list_never_exposes_password_hashes() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    let hash = server
        .repository
        .get_user_by_email("alice@x.com")
        .await
        .unwrap()
        .unwrap()
        .password_hash;
    let admin = server.login_admin().await;

    let body = server.get("/admin/users", Some(&admin)).await.text().await.unwrap();
    assert!(body.contains("alice@x.com"));
    assert!(!body.contains(&hash));
    assert!(!body.contains("$2"));
}

#[tokio::test]
async fn deleting_missing_id_redirects_like_existing() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    let id = server.user_id("alice@x.com").await;
    let admin = server.login_admin().await;

    let existing = server
        .post_form(&format!("/admin/users/{id}/delete"), &[], Some(&admin))
        .await;
    let missing = server
        .post_form(&format!("/admin/users/{id}/delete"), &[], Some(&admin))
        .await;
    let garbage = server.post_form("/admin/users/42/delete", &[], Some(&admin)).await;

    for res in [&existing, &missing, &garbage] {
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(res).as_deref(), Some("/admin/users"));
    }
    assert!(server.repository.get_user_by_email("alice@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn admin_search_matches_username_or_email() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    server.signup("Alina", "bob@x.com", "pw").await;
    server.signup("carol", "carol@x.com", "pw").await;
    let admin = server.login_admin().await;

    let body = server
        .get("/admin/users?search=ali", Some(&admin))
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("alice@x.com"));
    assert!(body.contains("bob@x.com"));
    assert!(!body.contains("carol@x.com"));

    let body = server
        .get("/admin/users?search=", Some(&admin))
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("carol@x.com"));
}

#[tokio::test]
async fn admin_login_with_non_operator_email_fails() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;

    for (email, password) in [("alice@x.com", "pw"), ("alice@x.com", "operator-pass")] {
        let res = server
            .post_form("/admin/login", &[("email", email), ("password", password)], None)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(session_cookie(&res).is_none());
        assert!(res.text().await.unwrap().contains("Invalid admin credentials"));
    }

    let res = server
        .post_form("/admin/login", &[("email", ADMIN_EMAIL), ("password", "nope")], None)
        .await;
    assert!(res.text().await.unwrap().contains("Invalid admin credentials"));
}

#[tokio::test]
async fn editing_nonexistent_user_is_404_view() {
    // ---
    let server = TestServer::new().await;
    let admin = server.login_admin().await;

    let res = server.get("/admin/users/42/edit", Some(&admin)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(location(&res).is_none());
    assert!(res.text().await.unwrap().contains("User not found"));

    let res = server
        .post_form(
            "/admin/users/42",
            &[("username", "x"), ("email", "x@x.com"), ("role", "user")],
            Some(&admin),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_to_another_users_email_is_server_error() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    server.signup("bob", "bob@x.com", "pw").await;
    let bob = server.user_id("bob@x.com").await;
    let admin = server.login_admin().await;

    let res = server
        .post_form(
            &format!("/admin/users/{bob}"),
            &[("username", "bob"), ("email", "alice@x.com"), ("role", "user")],
            Some(&admin),
        )
        .await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.text().await.unwrap().contains("Something went wrong"));

    // both records are untouched
    assert_eq!(server.user_id("bob@x.com").await, bob);
    server.login_user("alice@x.com", "pw").await;
}

#[tokio::test]
async fn update_of_unknown_id_with_taken_email_is_404_view() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    let admin = server.login_admin().await;

    let ghost = uuid::Uuid::new_v4();
    let res = server
        .post_form(
            &format!("/admin/users/{ghost}"),
            &[("username", "alice"), ("email", "alice@x.com"), ("role", "user")],
            Some(&admin),
        )
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.text().await.unwrap().contains("User not found"));
}

#[tokio::test]
async fn protected_admin_routes_redirect_without_admin_session() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    let user = server.login_user("alice@x.com", "pw").await;

    let gets = ["/admin/dashboard", "/admin/users", "/admin/users/add", "/admin/users/42/edit"];
    let posts = [
        "/admin/users",
        "/admin/users/42",
        "/admin/users/42/delete",
        "/admin/users/42/block",
        "/admin/users/42/unblock",
    ];

    for cookie in [None, Some(user.as_str())] {
        for path in gets {
            let res = server.get(path, cookie).await;
            assert_eq!(res.status(), StatusCode::SEE_OTHER, "GET {path}");
            assert_eq!(location(&res).as_deref(), Some("/admin/login"), "GET {path}");
        }
        for path in posts {
            let res = server.post_form(path, &[], cookie).await;
            assert_eq!(res.status(), StatusCode::SEE_OTHER, "POST {path}");
            assert_eq!(location(&res).as_deref(), Some("/admin/login"), "POST {path}");
        }
    }
}

#[tokio::test]
async fn user_home_redirects_admin_and_anonymous_to_login() {
    // ---
    let server = TestServer::new().await;
    let admin = server.login_admin().await;

    for cookie in [None, Some(admin.as_str())] {
        let res = server.get("/user/home", cookie).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res).as_deref(), Some("/login"));
    }
}

#[tokio::test]
async fn admin_crud_flow() {
    // ---
    let server = TestServer::new().await;
    let admin = server.login_admin().await;

    let res = server
        .post_form(
            "/admin/users",
            &[
                ("username", "dave"),
                ("email", "dave@x.com"),
                ("password", "pw"),
                ("role", "admin"),
            ],
            Some(&admin),
        )
        .await;
    assert_eq!(location(&res).as_deref(), Some("/admin/users"));
    let id = server.user_id("dave@x.com").await;

    let res = server.get(&format!("/admin/users/{id}/edit"), Some(&admin)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("dave@x.com"));

    let res = server
        .post_form(
            &format!("/admin/users/{id}"),
            &[("username", "david"), ("email", "david@x.com"), ("role", "user")],
            Some(&admin),
        )
        .await;
    assert_eq!(location(&res).as_deref(), Some("/admin/users"));

    let body = server.get("/admin/users", Some(&admin)).await.text().await.unwrap();
    assert!(body.contains("david@x.com"));
    assert!(!body.contains("dave@x.com"));

    // the admin-created account logs in with the password it was created with
    server.login_user("david@x.com", "pw").await;
}

#[tokio::test]
async fn admin_create_rerenders_form_on_errors() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    let admin = server.login_admin().await;

    let res = server
        .post_form(
            "/admin/users",
            &[("username", "x"), ("email", "alice@x.com"), ("password", "pw")],
            Some(&admin),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Email already in use"));

    let res = server
        .post_form(
            "/admin/users",
            &[("username", "y"), ("email", "y@x.com"), ("password", "pw"), ("role", "root")],
            Some(&admin),
        )
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Unknown role"));
}

#[tokio::test]
async fn every_response_carries_no_cache_headers() {
    // ---
    let server = TestServer::new().await;

    for path in ["/", "/login", "/admin/dashboard", "/check-session", "/missing", "/health"] {
        let res = server.get(path, None).await;
        let headers = res.headers();
        assert_eq!(
            headers[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate",
            "{path}"
        );
        assert_eq!(headers[header::PRAGMA], "no-cache", "{path}");
        assert_eq!(headers[header::EXPIRES], "0", "{path}");
    }
}

#[tokio::test]
async fn already_authenticated_redirect_only_on_matching_login_page() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    let user = server.login_user("alice@x.com", "pw").await;
    let admin = server.login_admin().await;

    let res = server.get("/login", Some(&user)).await;
    assert_eq!(location(&res).as_deref(), Some("/user/home"));
    let res = server.get("/admin/login", Some(&user)).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.get("/admin/login", Some(&admin)).await;
    assert_eq!(location(&res).as_deref(), Some("/admin/dashboard"));
    let res = server.get("/login", Some(&admin)).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_redirects_by_role_and_clears_cookie() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    let user = server.login_user("alice@x.com", "pw").await;
    let admin = server.login_admin().await;

    let res = server.get("/logout", Some(&admin)).await;
    assert_eq!(location(&res).as_deref(), Some("/admin/login"));
    assert!(raw_set_cookie(&res).unwrap().contains("Max-Age=0"));
    let res = server.get("/admin/dashboard", Some(&admin)).await;
    assert_eq!(location(&res).as_deref(), Some("/admin/login"));

    let res = server.get("/logout", Some(&user)).await;
    assert_eq!(location(&res).as_deref(), Some("/login"));
    let res = server.get("/user/home", Some(&user)).await;
    assert_eq!(location(&res).as_deref(), Some("/login"));

    let res = server.get("/logout", None).await;
    assert_eq!(location(&res).as_deref(), Some("/login"));
    assert!(raw_set_cookie(&res).unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn check_session_reports_role() {
    // ---
    let server = TestServer::new().await;
    server.signup("alice", "alice@x.com", "pw").await;
    let user = server.login_user("alice@x.com", "pw").await;
    let admin = server.login_admin().await;

    let body: Value = server.get("/check-session", None).await.json().await.unwrap();
    assert_eq!(body, json!({"isAuthenticated": false, "role": null}));

    let body: Value = server.get("/check-session", Some(&user)).await.json().await.unwrap();
    assert_eq!(body, json!({"isAuthenticated": true, "role": "user"}));

    let body: Value = server.get("/check-session", Some(&admin)).await.json().await.unwrap();
    assert_eq!(body, json!({"isAuthenticated": true, "role": "admin"}));

    let bogus = "portal_session=not-a-real-token";
    let body: Value = server.get("/check-session", Some(bogus)).await.json().await.unwrap();
    assert_eq!(body["isAuthenticated"], false);
}

#[tokio::test]
async fn expired_session_is_treated_as_absent() {
    // ---
    let server = TestServer::with_session_ttl(Duration::from_secs(1)).await;
    server.signup("alice", "alice@x.com", "pw").await;
    let cookie = server.login_user("alice@x.com", "pw").await;

    assert_eq!(server.get("/user/home", Some(&cookie)).await.status(), StatusCode::OK);

    sleep(Duration::from_millis(1200)).await;
    let res = server.get("/user/home", Some(&cookie)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res).as_deref(), Some("/login"));
}

#[tokio::test]
async fn unknown_route_renders_page_not_found() {
    // ---
    let server = TestServer::new().await;
    let res = server.get("/definitely/not/here", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.text().await.unwrap().contains("Page not found"));
}
