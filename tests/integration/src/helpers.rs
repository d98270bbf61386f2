//! Test helpers for integration tests
//!
//! Provides the test server, a browser-like client and response assertions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use portal_common::AppConfig;
use portal_core::User;
use portal_service::{MemoryMailer, UserService};
use portal_web::{create_app, create_memory_app_state, AppState};
use reqwest::{header, redirect, Client, Response, StatusCode};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{Role, TEST_PASSWORD};

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    /// State shared with the running server, for seeding and inspection
    pub state: AppState,
    /// Outbox of every mail the server sent
    pub mailer: MemoryMailer,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server over in-memory stores
    pub async fn start() -> Result<Self> {
        Self::start_with_config(AppConfig::for_testing()).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let mailer = MemoryMailer::new();
        let state = create_memory_app_state(config, Arc::new(mailer.clone()))?;
        let app = create_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            mailer,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A fresh client with its own cookie jar
    pub fn browser(&self) -> Result<Browser> {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Browser {
            base_url: self.base_url(),
            client,
        })
    }

    /// Seed an account whose password is [`TEST_PASSWORD`]
    pub async fn create_user(&self, username: &str, role: Role) -> Result<User> {
        let user = UserService::new(self.state.service_context())
            .create_user(&role.new_user(username), Some(TEST_PASSWORD))
            .await?;
        Ok(user)
    }

    /// Seed an account and return a browser logged in as it
    pub async fn logged_in(&self, username: &str, role: Role) -> Result<(User, Browser)> {
        let user = self.create_user(username, role).await?;
        let browser = self.browser()?;
        let response = browser.login(username, TEST_PASSWORD).await?;
        assert_redirect(&response, "/profile/")?;
        Ok((user, browser))
    }
}

/// Browser-like client: keeps cookies and never follows redirects
pub struct Browser {
    base_url: String,
    client: Client,
}

impl Browser {
    fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Submit a urlencoded form
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Result<Response> {
        Ok(self.client.post(self.url(path)).form(fields).send().await?)
    }

    /// Submit the login form
    pub async fn login(&self, username: &str, password: &str) -> Result<Response> {
        self.post_form("/login/", &[("username", username), ("password", password)])
            .await
    }

    pub async fn logout(&self) -> Result<Response> {
        self.post_form("/logout/", &[]).await
    }
}

/// `Location` header of a redirect
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Assert a `302 Found` to `expected`
pub fn assert_redirect(response: &Response, expected: &str) -> Result<()> {
    if response.status() != StatusCode::FOUND {
        anyhow::bail!("Expected 302 to {expected}, got {}", response.status());
    }
    let actual = location(response).context("redirect without Location header")?;
    if actual != expected {
        anyhow::bail!("Expected redirect to {expected}, got {actual}");
    }
    Ok(())
}

/// Assert response status and return the body
pub async fn assert_body(response: Response, expected_status: StatusCode) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected_status {
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(body)
}

/// Path of the first portal link in a mail body
pub fn link_path(body: &str, base_url: &str) -> Option<String> {
    let start = body.find(base_url)?;
    let link = body[start..].split_whitespace().next()?;
    Some(link[base_url.len()..].to_string())
}
