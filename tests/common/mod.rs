// Test helpers are intentionally partially used
#![allow(dead_code)]

use reqwest::{header, redirect, Client, Response};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;
use user_portal::domain::{MetricsPtr, RepositoryPtr};
use user_portal::{
    build_router, create_memory_repository, create_memory_session_store, create_noop_metrics,
    AdminConfig, AppState, SessionConfig,
};

pub const ADMIN_EMAIL: &str = "ops@example.com";
pub const ADMIN_PASSWORD: &str = "operator-pass";

/// Lowest cost bcrypt accepts; keeps the suite fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
    /// Same store the server uses, for arranging and inspecting records.
    pub repository: RepositoryPtr,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        Self::build(create_noop_metrics().unwrap(), SessionConfig::default()).await
    }

    pub async fn with_session_ttl(ttl: Duration) -> Self {
        // ---
        let session = SessionConfig {
            ttl,
            cookie_secure: false,
        };
        Self::build(create_noop_metrics().unwrap(), session).await
    }

    pub async fn with_metrics(metrics: MetricsPtr) -> Self {
        Self::build(metrics, SessionConfig::default()).await
    }

    async fn build(metrics: MetricsPtr, session: SessionConfig) -> Self {
        // ---
        // Enable debug logging only when requested
        if std::env::var("TEST_DEBUG").is_ok() {
            std::env::set_var("RUST_LOG", "user_portal=debug,tower_http=debug");
            user_portal::init_tracing();
        }

        let repository = create_memory_repository();
        let admin = AdminConfig {
            email: ADMIN_EMAIL.to_string(),
            password_hash: bcrypt::hash(ADMIN_PASSWORD, TEST_BCRYPT_COST).unwrap(),
        };
        let state = AppState::new(
            repository.clone(),
            create_memory_session_store(),
            metrics,
            admin,
            session,
            TEST_BCRYPT_COST,
        );

        let app = build_router(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        // Redirects are asserted on, never followed.
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            addr,
            client,
            repository,
        }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        // ---
        let mut req = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.send().await.expect("Failed to send request")
    }

    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response {
        // ---
        let mut req = self.client.post(self.url(path)).form(form);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.send().await.expect("Failed to send request")
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> Response {
        self.post_form(
            "/signup",
            &[("username", username), ("email", email), ("password", password)],
            None,
        )
        .await
    }

    /// Logs in through the user form and returns the cookie pair to send back.
    pub async fn login_user(&self, email: &str, password: &str) -> String {
        // ---
        let res = self
            .post_form("/login", &[("email", email), ("password", password)], None)
            .await;
        assert_eq!(location(&res).as_deref(), Some("/user/home"), "user login failed");
        session_cookie(&res).expect("login should set the session cookie")
    }

    pub async fn login_admin(&self) -> String {
        // ---
        let res = self
            .post_form(
                "/admin/login",
                &[("email", ADMIN_EMAIL), ("password", ADMIN_PASSWORD)],
                None,
            )
            .await;
        assert_eq!(location(&res).as_deref(), Some("/admin/dashboard"), "admin login failed");
        session_cookie(&res).expect("admin login should set the session cookie")
    }

    /// Looks up a stored user's id by email.
    pub async fn user_id(&self, email: &str) -> String {
        self.repository
            .get_user_by_email(email)
            .await
            .unwrap()
            .expect("user should exist")
            .id
            .to_string()
    }
}

/// The `Location` header of a redirect, if any.
pub fn location(res: &Response) -> Option<String> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The `name=value` part of the session `Set-Cookie` header.
pub fn session_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("portal_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// The raw session `Set-Cookie` header including attributes.
pub fn raw_set_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
