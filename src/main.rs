use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use landcover::core::maps::ClassificationParams;
use landcover::{
    AppConfig, Classifier, Credentials, EarthEngineClient, ImageryService, MapSession,
    TokenProvider, TrainingParams,
};
use std::sync::Arc;

fn build_client(config: &AppConfig) -> anyhow::Result<EarthEngineClient> {
    let credentials = Credentials::discover(&config.credentials_file)?;
    let project = config.project_for(&credentials);
    let http = reqwest::blocking::Client::builder()
        .build()
        .context("Failed to create HTTP client")?;

    let client = EarthEngineClient::new(
        &config.api_url,
        &project,
        http.clone(),
        TokenProvider::new(credentials, http),
    );
    client.authenticate()?;
    Ok(client)
}

/// Authenticate against Earth Engine. Failures are logged and leave the
/// service unset so the UI can report them.
fn connect(config: &AppConfig) -> Option<EarthEngineClient> {
    log::info!("Initializing Google Earth Engine");
    match build_client(config) {
        Ok(client) => {
            log::info!("Earth Engine initialized for project {}", client.project());
            Some(client)
        }
        Err(e) => {
            log::error!("Earth Engine initialization failed: {:#}", e);
            None
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = AppConfig::from_env()?;

    // Remote setup uses the blocking client, so it runs before the async
    // runtime starts
    let client = connect(&config);
    let classifier = client.as_ref().and_then(|client| {
        Classifier::ensure_trained(None, client, &TrainingParams::for_project(client.project()))
    });
    let service = client.map(|client| Arc::new(client) as Arc<dyn ImageryService>);

    let session = Arc::new(MapSession::new(
        service,
        classifier,
        ClassificationParams::default(),
    ));
    if !session.is_ready() {
        log::warn!("Starting without a trained classifier; map requests will be refused");
    }

    let bind_address = config.bind_address();
    log::info!("Server listening on http://{}", bind_address);
    log::info!("   GET  /             - Form page");
    log::info!("   POST /api/maps     - Classified maps as JSON");
    log::info!("   GET  /api/regions  - Region catalog");
    log::info!("   GET  /api/health   - Classifier status");

    let data = web::Data::new(session.clone());
    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::default())
                .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
                .app_data(data.clone())
                .configure(landcover::web::configure)
        })
        .workers(config.workers)
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("Server error")
    })?;

    // Dropped here, outside the runtime, since it owns blocking HTTP clients
    drop(session);
    Ok(())
}
