//! Serve command - runs the userinfo HTTP server.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Json as ExtractJson, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{SignalKind, signal};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};

use userinfo::{
    User, UserInfoService,
    flags::{EnvFlags, FlagProvider, StaticFlags},
    identity::{AuthError, RequestContext},
    service::{
        handler::handle_request,
        protocol::{UserInfoRequest, UserInfoResponse},
    },
    storage::InMemory,
};

use crate::backend::{SNAPSHOT_FILE, backend_label, create_storage, data_dir};
use crate::cli::ServeArgs;
use crate::session::SessionStore;

const SESSION_COOKIE: &str = "userinfo_session";

/// Shared application state
#[derive(Clone)]
struct AppState {
    service: UserInfoService,
    sessions: SessionStore,
}

/// Login request body
#[derive(Deserialize)]
struct LoginRequest {
    email: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

/// Run the userinfo server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let storage = create_storage(args).await?;
    let flags = build_flags(&args.flags);
    let service = UserInfoService::new(storage.clone(), flags);

    let app = router(AppState {
        service,
        sessions: SessionStore::new(),
    });

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, backend = backend_label(storage.as_ref()), "Server listening");

    println!("userinfo server listening on http://{local_addr}");
    println!();
    println!("Available endpoints:");
    println!("  GET  /health        - Health check");
    println!("  POST /login         - Start a session for an email address");
    println!("  POST /logout        - End the current session");
    println!("  POST /rpc/userinfo  - User information RPC (requires session)");
    println!();
    println!("Press Ctrl+C to shutdown");

    let snapshot_path = data_dir(args).join(SNAPSHOT_FILE);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to set up SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("failed to set up SIGINT handler");

            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }

            // Only the in-memory backend needs an explicit save
            if let Some(in_memory) = storage.as_any().downcast_ref::<InMemory>() {
                match in_memory.save_to_file(&snapshot_path).await {
                    Ok(()) => {
                        tracing::info!(path = %snapshot_path.display(), "Data saved");
                        println!("\nData saved successfully");
                    }
                    Err(e) => {
                        tracing::error!(error = ?e, "Failed to save data");
                        eprintln!("Failed to save data: {e:?}");
                    }
                }
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}

/// Command-line flags, falling back to `USERINFO_*` environment variables.
fn build_flags(overrides: &[(String, String)]) -> Arc<dyn FlagProvider> {
    let flags: StaticFlags = overrides.iter().cloned().collect();
    Arc::new(flags.with_fallback(Arc::new(EnvFlags::default())))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health_endpoint))
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/rpc/userinfo", post(handle_rpc))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

// ============================================================================
// Error mapping
// ============================================================================

/// An error response. Only the status is exposed; details go to the log.
#[derive(Debug)]
struct ApiError(StatusCode);

impl From<userinfo::Error> for ApiError {
    fn from(e: userinfo::Error) -> Self {
        let status = if e.is_authentication_error() {
            StatusCode::UNAUTHORIZED
        } else if e.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            tracing::error!(error = %e, module = e.module(), "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        ApiError(status)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.canonical_reason().unwrap_or("Error");
        (self.0, message).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for GET /health
async fn handle_health_endpoint(State(state): State<AppState>) -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy",
        backend: backend_label(state.service.storage().as_ref()),
    })
}

/// Handler for POST /login - development identity provider
///
/// Resolves or creates the user for `email` and starts a session for them.
async fn handle_login(
    State(state): State<AppState>,
    cookies: Cookies,
    ExtractJson(login): ExtractJson<LoginRequest>,
) -> Result<axum::Json<User>, ApiError> {
    let email = login.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError(StatusCode::BAD_REQUEST));
    }

    let user = state.service.storage().get_user_from_email(email).await?;
    let token = state.sessions.create_session(user.user_id.clone()).await;
    tracing::info!(user_id = %user.user_id, "User logged in");

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);

    Ok(axum::Json(user))
}

/// Handler for POST /logout - destroy the session
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> StatusCode {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.destroy_session(cookie.value()).await;
        let mut removal = Cookie::from(SESSION_COOKIE);
        removal.set_path("/");
        cookies.remove(removal);
    }
    StatusCode::NO_CONTENT
}

/// Handler for POST /rpc/userinfo
async fn handle_rpc(
    State(state): State<AppState>,
    cookies: Cookies,
    ExtractJson(request): ExtractJson<UserInfoRequest>,
) -> Result<axum::Json<UserInfoResponse>, ApiError> {
    let token = cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());
    let ctx = resolve_session(&state, token.as_deref()).await?;
    tracing::debug!(request_id = %ctx.request_id, method = request.method(), "RPC request");

    let response = handle_request(&state.service, &ctx, request).await?;
    Ok(axum::Json(response))
}

/// Build the identity for this request from its session token.
///
/// The user record is loaded fresh so the context reflects earlier writes.
/// An unknown token, or one whose user no longer exists, is an expired session.
async fn resolve_session(state: &AppState, token: Option<&str>) -> userinfo::Result<RequestContext> {
    let token = token.ok_or(AuthError::NotAuthenticated)?;
    let expired = || AuthError::SessionExpired {
        session: token.to_string(),
    };

    let user_id = state.sessions.get_user_id(token).await.ok_or_else(expired)?;
    match state.service.storage().get_user(&user_id).await {
        Ok(user) => Ok(RequestContext::for_user(user)),
        Err(e) if e.is_not_found() => Err(expired().into()),
        Err(e) => Err(e),
    }
}
