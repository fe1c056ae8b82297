use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use veil_match::config::{LoggingSettings, Settings};
use veil_match::core::{AnonIdGenerator, Matcher, ProfileLimits};
use veil_match::routes::{self, AppState};
use veil_match::services::{
    CacheManager, InactivitySweeper, MatchPolicy, MatchService, PairingStore, PostgresStore,
};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!(path = req.path(), error = %err, "JSON payload error");
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&LoggingSettings::default());
            error!(error = %e, "Failed to load configuration");
            return Err(std::io::Error::other(format!("Configuration error: {}", e)));
        }
    };

    init_tracing(&settings.logging);
    info!("Starting Veil pairing service...");

    let store: Arc<dyn PairingStore> = match PostgresStore::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "Failed to connect to PostgreSQL");
            return Err(std::io::Error::other(format!("PostgreSQL connection error: {}", e)));
        }
    };

    info!("PostgreSQL store initialized");

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl).await {
        Ok(c) => {
            info!(l1_cache_size, cache_ttl, "Cache manager initialized");
            Some(Arc::new(c))
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Redis, match cooldowns disabled");
            None
        }
    };

    let limits = ProfileLimits {
        min_age: settings.matching.min_age,
        max_age: settings.matching.max_age,
        ..ProfileLimits::default()
    };

    let service = MatchService::new(
        store,
        Matcher::new(settings.matching.shortlist_size),
        AnonIdGenerator::new(
            settings.matching.anon_id_prefix.clone(),
            settings.matching.anon_id_length,
        ),
        MatchPolicy {
            recency_window: settings.recency_window(),
            free_gender_views: settings.visibility.free_gender_views,
            profile_limits: limits,
            owner_ids: settings.access.owner_set(),
        },
    );

    info!(
        shortlist_size = settings.matching.shortlist_size,
        recency_days = settings.matching.recency_days,
        "Match service initialized"
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweeper = InactivitySweeper::new(
        service.clone(),
        std::time::Duration::from_secs(settings.matching.sweep_interval_secs),
        settings.inactivity_limit(),
    );
    let sweeper_task = tokio::spawn(sweeper.run(shutdown_rx));

    let app_state = AppState {
        service,
        cache,
        cooldown_secs: settings.matching.cooldown_secs,
        inactivity_limit: settings.inactivity_limit(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!(%host, port, "Starting HTTP server");

    let result = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper_task.await {
        error!(error = %e, "Inactivity sweeper task failed");
    }

    result
}
