use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::Json;
use axum::routing::{get, post, put};
use axum::Router;
use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mandi_core::{auth, db, handlers, AppState};

/// Health check endpoint.
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mandi-core",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Database health check endpoint.
async fn db_health_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| {
            tracing::error!("Database health check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        })?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "database": "connected"
    })))
}

/// Creates the main application router.
///
/// Public routes cover login, the storefront catalog and the pre-login
/// store lookup; everything else requires a bearer token.
fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        // Catalog management
        .route("/products", get(handlers::products::list_all))
        .route("/products/replace", post(handlers::products::replace))
        .route("/products/import", post(handlers::products::import_csv))
        .route("/products/:id/toggle", post(handlers::products::toggle))
        .route("/products/:id/rate", put(handlers::products::update_rate))
        // Customer management
        .route("/customers", get(handlers::customers::list))
        .route("/customers", put(handlers::customers::replace))
        .route("/customers/import", post(handlers::customers::import_csv))
        // Orders and delivery workflow
        .route("/orders", get(handlers::orders::list_all))
        .route("/orders", post(handlers::orders::place))
        .route("/orders/store/:store_number", get(handlers::orders::by_store))
        .route("/orders/:id/status", put(handlers::orders::update_status))
        .route("/orders/:id/items", put(handlers::orders::edit_items))
        .route("/orders/:id/document", get(handlers::orders::document))
        // Payments ledger
        .route("/payments", get(handlers::payments::list))
        .route("/payments", post(handlers::payments::add))
        .route("/payments/store/:store_number", get(handlers::payments::by_store))
        // Statements
        .route(
            "/statements/customer/:store_number",
            get(handlers::statements::customer_statement),
        )
        .route("/statements/company", get(handlers::statements::company_statement))
        .route("/statements/me", get(handlers::statements::my_statement))
        // Sub-user management
        .route("/subusers", get(handlers::sub_users::list))
        .route("/subusers", post(handlers::sub_users::create))
        .route("/subusers/:email/toggle", post(handlers::sub_users::toggle))
        .route("/subusers/:email/password", put(handlers::sub_users::change_password))
        // Settings
        .route("/settings", get(handlers::settings::get))
        .route("/settings/webhook", put(handlers::settings::set_webhook))
        .route(
            "/settings/admin-password",
            put(handlers::settings::change_admin_password),
        )
        .route_layer(middleware::from_fn(auth::require_auth));

    Router::new()
        // Public routes
        .route("/health", get(health_check))
        .route("/health/db", get(db_health_check))
        .route("/auth/admin/login", post(handlers::auth::admin_login))
        .route("/auth/subuser/login", post(handlers::auth::sub_user_login))
        .route("/auth/customer/login", post(handlers::auth::customer_login))
        .route("/products/active", get(handlers::products::list_active))
        .route("/customers/:store_number", get(handlers::customers::profile))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Ensures the admin credential row exists, creating it from
/// `ADMIN_EMAIL`/`ADMIN_PASSWORD` on first start.
async fn ensure_admin(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@mandi.local".to_string());
    let password = std::env::var("ADMIN_PASSWORD")
        .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD must be set on first start"))?;
    let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;

    sqlx::query("INSERT INTO admins (email, password_hash) VALUES ($1, $2)")
        .bind(&email)
        .bind(password_hash)
        .execute(pool)
        .await?;

    info!("admin account {} bootstrapped", email);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(LevelFilter::INFO.into());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    info!("Starting Mandi Core Server...");

    // Initialize database connection pool
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let db_pool = db::create_pool(&database_url).await?;

    ensure_admin(&db_pool).await?;

    // Create application state
    let app_state = AppState { db: db_pool };

    // Create router
    let app = create_router(app_state);

    // Get server configuration
    let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .map_err(|_| anyhow::anyhow!("Invalid SERVER_PORT"))?;

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}:{}: {}", host, port, e))?;

    info!("Server listening on {}:{}", host, port);

    // Start the server
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
