use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coachlog_backend::{config::Config, db::connection::create_pool, docs, handlers, middleware};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coachlog_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        jwt_secret = %mask_secret(&config.jwt_secret),
        jwt_expiration_hours = config.jwt_expiration_hours,
        app_base_url = %config.app_base_url,
        time_zone = %config.time_zone,
        sms_configured = config.sms_configured(),
        emergency_numbers = config.emergency_numbers.len(),
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Build public routes (no auth)
    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/invitations/verify",
            get(handlers::invitations::verify_invitation),
        )
        .route(
            "/api/invitations/accept",
            post(handlers::invitations::accept_invitation),
        )
        .route("/api/sos/verify", get(handlers::sos::verify_sos_token))
        .route("/api/sos/trigger", post(handlers::sos::trigger_sos))
        .route("/api/docs/openapi.json", get(docs::openapi_json));

    // Build worker-protected routes (auth required)
    let user_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/shifts/clock-in", post(handlers::shifts::clock_in))
        .route("/api/shifts/clock-out", post(handlers::shifts::clock_out))
        .route("/api/shifts/status", get(handlers::shifts::shift_status))
        .route("/api/shifts/me", get(handlers::shifts::list_my_shifts))
        .route("/api/shifts/export", get(handlers::shifts::export_my_shifts))
        .route(
            "/api/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/api/clients/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/api/clients/{id}/safety-link",
            post(handlers::safety_links::generate_safety_link)
                .delete(handlers::safety_links::revoke_safety_link),
        )
        .route(
            "/api/clients/{id}/alerts",
            get(handlers::safety_links::list_emergency_alerts),
        )
        .route("/api/entries", post(handlers::entries::create_entry))
        .route("/api/entries/me", get(handlers::entries::list_my_entries))
        .route("/api/reports/billing", get(handlers::reports::billing_report))
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            middleware::auth,
        ));

    // Build admin-protected routes (auth + admin role)
    let admin_routes = Router::new()
        .route(
            "/api/admin/invitations",
            get(handlers::invitations::list_invitations)
                .post(handlers::invitations::create_invitation),
        )
        .route(
            "/api/admin/invitations/{id}",
            delete(handlers::invitations::delete_invitation),
        )
        .route("/api/admin/users", get(handlers::admin::list_users))
        .route_layer(axum_middleware::from_fn_with_state(
            (pool.clone(), config.clone()),
            middleware::auth_admin,
        ));

    // Compose app with shared layers (CORS/Trace) and shared state
    let app = Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state((pool, config));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
