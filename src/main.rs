use axum::{
    middleware::from_fn,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use onlytrack_api::database::manager::DatabaseManager;
use onlytrack_api::database::models::Role;
use onlytrack_api::handlers::{admin as admin_handlers, protected, public};
use onlytrack_api::middleware::{admin, auth, authorize};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = onlytrack_api::config::config();
    tracing::info!("Starting OnlyTrack API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("ONLYTRACK_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("OnlyTrack API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth + demo token routes
        .merge(public_auth_routes())
        .merge(demo_routes())
        // Authenticated tenant API
        .merge(protected_routes())
        // Admin plane
        .merge(admin_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn public_auth_routes() -> Router {
    use public::auth;

    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/verify-email", post(auth::verify_email))
}

fn demo_routes() -> Router {
    use public::demo;

    Router::new()
        .route("/demo/validate", post(demo::validate))
        .route("/demo/exchange", post(demo::exchange))
}

fn protected_routes() -> Router {
    use protected::{access, team};

    // Owner-only management surface; the role guard composes on top of the
    // authentication gate.
    let owner_only = Router::new()
        .route("/api/team", get(team::list).post(team::create))
        .route("/api/team/invitations", get(team::invitations))
        .route("/api/team/:id", delete(team::remove))
        .route("/api/access", get(access::list).post(access::create))
        .route("/api/access/:id", delete(access::revoke))
        .layer(from_fn(|request, next| {
            authorize::require_role(&[Role::Owner], request, next)
        }));

    Router::new()
        .route("/api/auth/whoami", get(protected::auth::whoami))
        .route("/api/auth/logout", post(protected::auth::logout))
        .merge(owner_only)
        .layer(from_fn(auth::authenticate))
}

fn admin_routes() -> Router {
    let guarded = Router::new()
        .route("/admin/logout", post(admin_handlers::logout))
        .route("/admin/sessions/sweep", post(admin_handlers::sweep_sessions))
        .layer(from_fn(admin::require_admin));

    // whoami manages its own cookie so it can clear it when the account
    // was deactivated after token issuance.
    Router::new()
        .route("/admin/login", post(admin_handlers::login))
        .route("/admin/whoami", get(admin_handlers::whoami))
        .merge(guarded)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "OnlyTrack API",
            "version": version,
            "description": "Multi-tenant agency management backend (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/signup, /auth/login, /auth/verify-email (public)",
                "demo": "/demo/validate, /demo/exchange (public - share links)",
                "auth": "/api/auth/* (protected)",
                "team": "/api/team[/:id] (protected, owner)",
                "access": "/api/access[/:id] (protected, owner)",
                "admin": "/admin/* (admin plane)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
