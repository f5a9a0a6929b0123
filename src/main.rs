use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use relief_radar::config::{LoggingSettings, Settings};
use relief_radar::routes::{self, AppState};
use relief_radar::services::{
    BandoRegionClient, CachedRegionCatalog, InMemoryPostRepository, InMemoryProfileStore,
    PostgresProfileStore, ProfileStore, RegionCatalog,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
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
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path payload errors
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(settings: &LoggingSettings) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.format.clone());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

async fn build_profile_store(settings: &Settings) -> std::io::Result<Arc<dyn ProfileStore>> {
    let Some(url) = settings.database.url.as_deref() else {
        warn!("No database configured, preferences are kept in memory");
        return Ok(Arc::new(InMemoryProfileStore::new()));
    };

    let max_conn = settings.database.max_connections.unwrap_or(10);
    let min_conn = settings.database.min_connections.unwrap_or(1);

    match PostgresProfileStore::new(url, max_conn, min_conn).await {
        Ok(store) => {
            if let Err(e) = store.health_check().await {
                warn!("PostgreSQL health check failed: {}", e);
            }
            info!("PostgreSQL profile store initialized (max: {} connections)", max_conn);
            Ok(Arc::new(store))
        }
        Err(e) => {
            error!("Failed to connect to PostgreSQL: {}", e);
            Err(std::io::Error::new(std::io::ErrorKind::Other, e))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();
    init_logging(&settings.as_ref().map(|s| s.logging.clone()).unwrap_or_default());

    info!("Starting Relief Radar...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!("Configuration loaded successfully");

    // Region lookup client behind a TTL cache
    let timeout = Duration::from_secs(settings.region_api.timeout_secs.unwrap_or(30));
    let client = BandoRegionClient::new(
        settings.region_api.provinces_url.clone(),
        settings.region_api.wards_url.clone(),
        timeout,
    )
    .map_err(|e| {
        error!("Failed to create region client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(3600);
    let cache_size = settings.cache.max_entries.unwrap_or(256);
    let catalog: Arc<dyn RegionCatalog> =
        Arc::new(CachedRegionCatalog::new(Arc::new(client), cache_size, cache_ttl));

    info!("Region catalog initialized (cache: {} entries, TTL: {}s)", cache_size, cache_ttl);

    let posts = InMemoryPostRepository::from_json_file(&settings.posts.seed_path)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to load posts from {} ({}), starting empty", settings.posts.seed_path, e);
            InMemoryPostRepository::default()
        });

    let profiles = build_profile_store(&settings).await?;

    let app_state = AppState {
        catalog,
        posts: Arc::new(posts),
        profiles,
        default_radius_km: settings.preferences.default_radius_km,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
