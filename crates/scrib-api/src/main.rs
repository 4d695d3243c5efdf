//! scrib API server.
//!
//! Axum HTTP server exposing authenticated note/card CRUD, full-text
//! search, account management, and the text-generation passthrough.

mod auth;
mod handlers;

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use governor::{Quota, RateLimiter};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrib_core::GenerationBackend;
use scrib_db::Database;
use scrib_inference::GeminiBackend;

use auth::JwtKeys;
use handlers::{
    cards::{
        create_card, delete_card, get_card, list_cards, list_pending_cards, update_card,
        update_card_status,
    },
    generate::generate,
    notes::{create_note, delete_note, get_note, list_notes, update_note},
    profile::{get_profile, update_profile},
    search::search,
    users::{login, register, reset_password},
};

/// Global rate limiter type (direct quota, no keyed bucketing for a
/// personal server).
type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    db: Database,
    /// HS256 keys for issuing and validating tokens.
    jwt: JwtKeys,
    /// Lifetime of issued tokens.
    token_ttl: chrono::Duration,
    /// Generation backend (None if no API key is configured).
    inference: Option<Arc<dyn GenerationBackend>>,
    /// Global rate limiter (None if rate limiting is disabled).
    rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

/// Parse allowed origins from comma-separated environment variable.
///
/// `ALLOWED_ORIGINS` enforces strict origin whitelisting for CORS;
/// unset or empty falls back to the local development frontend.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str =
        std::env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string());

    if origins_str.trim().is_empty() {
        return vec![HeaderValue::from_static("http://localhost:5173")];
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "scrib_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "scrib_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/scrib".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    let secret = std::env::var("SECRET_KEY")
        .map_err(|_| anyhow::anyhow!("SECRET_KEY must be set to sign tokens"))?;
    let token_ttl_hours: i64 = std::env::var("TOKEN_TTL_HOURS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(auth::DEFAULT_TOKEN_TTL_HOURS);

    // Rate limiting configuration (generous for a personal server)
    let rate_limit_requests: u32 = std::env::var("RATE_LIMIT_REQUESTS")
        .unwrap_or_else(|_| "100".to_string())
        .parse()
        .unwrap_or(100);
    let rate_limit_period_secs: u64 = std::env::var("RATE_LIMIT_PERIOD_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);
    let rate_limit_enabled: bool = std::env::var("RATE_LIMIT_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Generation backend is optional; the passthrough endpoint reports
    // 400 when no API key is configured.
    let inference: Option<Arc<dyn GenerationBackend>> = match GeminiBackend::from_env() {
        Ok(backend) => {
            info!("Generation backend initialized: {}", backend.model_name());
            Some(Arc::new(backend))
        }
        Err(e) => {
            tracing::warn!("Generation backend disabled: {}", e);
            None
        }
    };

    // Create rate limiter if enabled
    let rate_limiter = if rate_limit_enabled {
        let quota = Quota::with_period(std::time::Duration::from_secs(rate_limit_period_secs))
            .expect("Rate limit period must be non-zero")
            .allow_burst(NonZeroU32::new(rate_limit_requests).expect("Rate limit must be non-zero"));
        Some(Arc::new(RateLimiter::direct(quota)))
    } else {
        None
    };
    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        rate_limit_requests,
        rate_limit_period_secs
    );

    let state = AppState {
        db,
        jwt: JwtKeys::from_secret(secret.as_bytes()),
        token_ttl: chrono::Duration::hours(token_ttl_hours),
        inference,
        rate_limiter,
    };

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Accounts
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/reset-password", post(reset_password))
        .route("/api/v1/profile", get(get_profile).put(update_profile))
        // Notes CRUD
        .route("/api/v1/notes", get(list_notes).post(create_note))
        .route(
            "/api/v1/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        // Cards CRUD
        .route("/api/v1/cards", get(list_cards).post(create_card))
        .route("/api/v1/cards/pending", get(list_pending_cards))
        .route(
            "/api/v1/cards/:id",
            get(get_card).put(update_card).delete(delete_card),
        )
        .route("/api/v1/cards/:id/status", put(update_card_status))
        // Search
        .route("/api/v1/search", get(search))
        // Generation passthrough
        .route("/api/v1/generate", post(generate))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn rate_limit_middleware(
    axum::extract::State(state): axum::extract::State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // If rate limiting is disabled, pass through
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limit_exceeded",
                    "error_description": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Internal(scrib_core::Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Upstream(String),
}

impl From<scrib_core::Error> for ApiError {
    fn from(err: scrib_core::Error) -> Self {
        match &err {
            scrib_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            scrib_core::Error::NoteNotFound(id) => {
                ApiError::NotFound(format!("Note {} not found", id))
            }
            scrib_core::Error::CardNotFound(id) => {
                ApiError::NotFound(format!("Card {} not found", id))
            }
            scrib_core::Error::UserNotFound(who) => {
                ApiError::NotFound(format!("User {} not found", who))
            }
            scrib_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            scrib_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            scrib_core::Error::Inference(msg) => ApiError::Upstream(msg.clone()),
            scrib_core::Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    let friendly_msg = if msg.contains("users_email_key") || msg.contains("email") {
                        "An account with this email already exists".to_string()
                    } else {
                        msg
                    };
                    return ApiError::Conflict(friendly_msg);
                }
                ApiError::Internal(err)
            }
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_note_not_found_maps_to_404() {
        let err: ApiError = scrib_core::Error::NoteNotFound(Uuid::nil()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        let err: ApiError = scrib_core::Error::InvalidInput("bad".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_inference_maps_to_upstream() {
        let err: ApiError = scrib_core::Error::Inference("model down".to_string()).into();
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[test]
    fn test_parse_allowed_origins_default() {
        std::env::remove_var("ALLOWED_ORIGINS");
        let origins = parse_allowed_origins();
        assert_eq!(origins, vec![HeaderValue::from_static("http://localhost:5173")]);
    }
}
