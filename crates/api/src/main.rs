use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitafit_api::config::ServerConfig;
use vitafit_api::router::build_app_router;
use vitafit_api::state::AppState;
use vitafit_db::{MemorySessionStore, PgSessionStore, SessionStore};
use vitafit_pipeline::assistant::HttpAssistant;
use vitafit_pipeline::detector::HttpDishDetector;
use vitafit_pipeline::report::PdfRenderer;
use vitafit_pipeline::ModelContext;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitafit_api=debug,vitafit_pipeline=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Session store ---
    let store: Arc<dyn SessionStore> = match &config.database_url {
        Some(url) => {
            let pool = vitafit_db::create_pool(url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            vitafit_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            vitafit_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgSessionStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; sessions are kept in memory and lost on restart");
            Arc::new(MemorySessionStore::new())
        }
    };

    // --- Models ---
    let models = Arc::new(ModelContext::load(
        &config.exercise_models_path,
        &config.diet_models_path,
    ));
    tracing::info!(
        exercise = models.exercise_loaded(),
        diet = models.diet_loaded(),
        "Model context ready"
    );

    // --- App state ---
    let mut state = AppState::new(config.clone(), store, models, Arc::new(PdfRenderer::new()));
    match &config.dish_detector_url {
        Some(url) => {
            tracing::info!(%url, "Dish detector configured");
            state = state.with_detector(Arc::new(HttpDishDetector::new(
                url.clone(),
                config.detection_confidence,
            )));
        }
        None => tracing::warn!("DISH_DETECTOR_URL not set; /classify_dish is unavailable"),
    }
    match &config.assistant_url {
        Some(url) => {
            tracing::info!(%url, "Chat assistant configured");
            state = state.with_assistant(Arc::new(HttpAssistant::new(url.clone())));
        }
        None => tracing::warn!("ASSISTANT_URL not set; /ai endpoints are unavailable"),
    }

    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
