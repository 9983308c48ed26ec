//! # Server Module
//!
//! Application state, router assembly and the HTTP server loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{
    jwt::JwtService, middleware::AuthMiddleware, password::CredentialVerifier, policy::AccessPolicy,
    validator::TokenValidator,
};
use crate::config::{AuthConfig, Config, ServerConfig};
use crate::database::{InMemoryUserStore, UserStore};
use crate::error::{self, ApiError};
use crate::routes;
use crate::services::AuthService;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub users: Arc<dyn UserStore>,
    pub validator: Arc<TokenValidator>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    pub fn new(
        auth: &AuthConfig,
        verifier: CredentialVerifier,
        users: Arc<dyn UserStore>,
        policy: AccessPolicy,
    ) -> Self {
        let codec = Arc::new(JwtService::new(auth));

        Self {
            auth_service: AuthService::new(codec.clone(), verifier, users.clone()),
            users,
            validator: Arc::new(TokenValidator::new(codec)),
            policy: Arc::new(policy),
        }
    }

    /// Production wiring: default argon2 cost, in-memory accounts, default route rules.
    pub fn from_config(config: &Config) -> Result<Self> {
        let verifier = CredentialVerifier::new(config.password_hash_concurrency)
            .context("Failed to initialize password hashing")?;

        Ok(Self::new(
            &config.auth,
            verifier,
            Arc::new(InMemoryUserStore::new()),
            AccessPolicy::default_rules(),
        ))
    }
}

/// Routes plus the authentication chain: the authenticator binds an identity,
/// then the access policy decides whether the route may run without one.
/// Error bodies from any of them get the request path attached last.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/ping", get(routes::health::ping))
        .merge(routes::auth::create_auth_routes())
        .merge(routes::users::create_user_routes())
        .fallback(|| async { ApiError::NotFound("Resource not found".to_string()) })
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(error::attach_request_path))
                .layer(middleware::from_fn_with_state(
                    app_state.validator.clone(),
                    AuthMiddleware::authenticate,
                ))
                .layer(middleware::from_fn_with_state(app_state.policy.clone(), AccessPolicy::enforce)),
        )
        .with_state(app_state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}

/// Build the application from configuration and serve until Ctrl+C / SIGTERM.
pub async fn start(config: Config) -> Result<()> {
    let app_state = AppState::from_config(&config)?;

    let app = build_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.server)),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr} - port may already be in use"))?;

    tracing::info!("🚀 Server listening on http://{}", addr);
    tracing::info!("🏥 Health check available at http://{}/ping", addr);
    tracing::info!("🔐 Login at http://{}/api/auth/login", addr);
    tracing::info!("⏱️  Token lifetime: {} ms", config.auth.token_lifetime_millis);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated with an error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
