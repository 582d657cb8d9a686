use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use finance_ledger_api::data::sqlite::SqliteRepository;
use finance_ledger_api::infrastructure::config::AppConfig;
use finance_ledger_api::infrastructure::logging::init_logging;
use finance_ledger_api::infrastructure::security::TokenService;
use finance_ledger_api::presentation::handlers::AppState;
use finance_ledger_api::presentation::middleware::{JwtAuthMiddleware, RequestTracing};
use finance_ledger_api::presentation::routes;
use tracing::info;

fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allow_any_header()
        .max_age(3600)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    init_logging(&config.log_level);
    info!("Logging initialized successfully");

    let repository = SqliteRepository::connect(&config.database_url)
        .await
        .context("Failed to open database")?;

    let state = web::Data::new(AppState::with_sqlite(
        repository,
        TokenService::new(&config.jwt_secret),
    ));
    let auth_service = state.auth_service.clone();
    info!("Application state initialized");

    let server = HttpServer::new(move || {
        tracing::trace!("Creating new application instance");
        App::new()
            .app_data(state.clone())
            .configure(routes::configure)
            .wrap(JwtAuthMiddleware::new(auth_service.clone()))
            .wrap(cors())
            .wrap(RequestTracing)
    })
    .bind(&config.bind_address)
    .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    info!(address = %config.bind_address, "Starting HTTP server");
    server.run().await?;
    Ok(())
}
