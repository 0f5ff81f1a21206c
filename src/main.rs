use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerly::config::Config;
use ledgerly::middleware::TenantContext;
use ledgerly::modules::discounts::controllers::discount_controller;
use ledgerly::modules::discounts::repositories::MySqlDiscountRepository;
use ledgerly::modules::discounts::services::{DiscountResolver, DiscountService};
use ledgerly::modules::settings::controllers::default_setting_controller;
use ledgerly::modules::settings::repositories::MySqlDefaultSettingRepository;
use ledgerly::modules::settings::services::DefaultSettingService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerly=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting Ledgerly Accounting Platform");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    // Wire repositories and services
    let discount_repo = Arc::new(MySqlDiscountRepository::new(db_pool.clone()));
    let default_setting_repo = Arc::new(MySqlDefaultSettingRepository::new(db_pool.clone()));

    let discount_service = Arc::new(DiscountService::new(discount_repo.clone()));
    let discount_resolver = Arc::new(DiscountResolver::new(
        discount_repo.clone(),
        default_setting_repo.clone(),
    ));
    let default_setting_service = Arc::new(DefaultSettingService::new(
        default_setting_repo,
        discount_repo,
    ));

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let workers = config.server.workers;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(TenantContext)
            .wrap(Cors::permissive())
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(discount_service.clone()))
            .app_data(web::Data::new(discount_resolver.clone()))
            .app_data(web::Data::new(default_setting_service.clone()))
            .configure(discount_controller::configure)
            .configure(default_setting_controller::configure)
            .route("/health", web::get().to(health_check))
            .route("/", web::get().to(index))
    })
    .workers(workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "ledgerly"
    }))
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": "Ledgerly Accounting Platform",
        "version": "0.1.0",
        "status": "running"
    }))
}
