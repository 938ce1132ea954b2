//! Test helpers for integration tests
//!
//! Builds the real router over in-memory repositories and sends requests to
//! it with a chosen peer address.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use ipban_api::{create_app, AppState};
use ipban_common::{
    AppConfig, AppSettings, CorsConfig, DatabaseConfig, Environment, IpBanConfig, JwtConfig,
    JwtService, RateLimitConfig, ServerConfig,
};
use ipban_core::value_objects::{UserClass, UserId};
use ipban_service::{IpBanSettings, ServiceContext, ServiceContextBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tower::ServiceExt;

use crate::fixtures::{seeded_users, InMemoryBanRepository, InMemoryUserRepository};

const TEST_JWT_SECRET: &str = "integration-test-secret-key-32-bytes!";

/// Configuration used by every test app
pub fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "ipban-test".to_string(),
            env: Environment::Development,
        },
        api: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 0,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry: 900,
        },
        rate_limit: RateLimitConfig {
            requests_per_second: 100,
            burst: 100,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        ipban: IpBanConfig {
            message: "$IP banned until $DATE by $ADMIN: $REASON$CONTACT".to_string(),
            contact_link: None,
            cache_ttl_secs: 600,
        },
    }
}

/// Application under test
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub bans: Arc<InMemoryBanRepository>,
    jwt: Arc<JwtService>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let bans = Arc::new(InMemoryBanRepository::new(seeded_users()));
        let jwt = Arc::new(JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry,
        ));

        let service_context = ServiceContextBuilder::new()
            .ban_repo(bans.clone())
            .user_repo(Arc::new(InMemoryUserRepository::new(seeded_users())))
            .settings(IpBanSettings::from(&config.ipban))
            .jwt_service(jwt.clone())
            .build()
            .expect("test service context");

        let state = AppState::new(service_context, config);
        let router = create_app(state.clone());

        Self {
            router,
            state,
            bans,
            jwt,
        }
    }

    pub fn context(&self) -> &ServiceContext {
        self.state.service_context()
    }

    /// Access token for `user_id` with `class`
    pub fn token(&self, user_id: i64, class: UserClass) -> String {
        self.jwt
            .issue_token(UserId::new(user_id), class)
            .expect("issue test token")
    }

    /// Token for the seeded admin
    pub fn admin_token(&self) -> String {
        self.token(crate::fixtures::ADMIN_ID, UserClass::Admin)
    }

    /// Send a request from `peer`
    pub async fn send(&self, request: TestRequest) -> Result<TestResponse> {
        let mut builder = Request::builder()
            .method(request.method)
            .uri(&request.path);
        if let Some(token) = &request.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let body = match &request.body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.clone())
            }
            None => Body::empty(),
        };

        let mut http_request = builder.body(body).context("build request")?;
        if let Some(peer) = request.peer {
            http_request.extensions_mut().insert(ConnectInfo(peer));
        }

        let response = self.router.clone().oneshot(http_request).await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;

        Ok(TestResponse {
            status,
            content_type,
            body: bytes.to_vec(),
        })
    }

    pub async fn get(&self, path: &str, peer: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(TestRequest::new(Method::GET, path).peer(peer).auth(token))
            .await
    }

    pub async fn post<T: Serialize>(
        &self,
        path: &str,
        peer: &str,
        token: Option<&str>,
        body: &T,
    ) -> Result<TestResponse> {
        self.send(
            TestRequest::new(Method::POST, path)
                .peer(peer)
                .auth(token)
                .json(body)?,
        )
        .await
    }

    pub async fn delete(&self, path: &str, peer: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(TestRequest::new(Method::DELETE, path).peer(peer).auth(token))
            .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Request description for [`TestApp::send`]
#[derive(Debug)]
pub struct TestRequest {
    method: Method,
    path: String,
    peer: Option<SocketAddr>,
    token: Option<String>,
    body: Option<String>,
}

impl TestRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            peer: None,
            token: None,
            body: None,
        }
    }

    /// Peer address as the socket would report it; accepts `ip` or `ip:port`
    pub fn peer(mut self, peer: &str) -> Self {
        self.peer = Some(peer_addr(peer));
        self
    }

    pub fn auth(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }
}

fn peer_addr(peer: &str) -> SocketAddr {
    peer.parse().unwrap_or_else(|_| {
        let ip = peer.parse().expect("peer must be an IP address");
        SocketAddr::new(ip, 40000)
    })
}

/// Buffered response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .with_context(|| format!("response body is not the expected JSON: {}", self.text()))
    }

    /// Assert the status and decode the JSON body
    pub fn expect_json<T: DeserializeOwned>(&self, expected: StatusCode) -> Result<T> {
        anyhow::ensure!(
            self.status == expected,
            "expected {expected}, got {}: {}",
            self.status,
            self.text()
        );
        self.json()
    }
}
