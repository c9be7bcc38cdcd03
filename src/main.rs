use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pawlser::api;
use pawlser::config::Config;
use pawlser::db::create_pool;
use pawlser::services::{LocalStorage, StorageBackend};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().expect("Failed to load configuration");

    log::info!(
        "Starting server on {}:{}",
        config.server.host,
        config.server.port
    );
    let pool = create_pool(&config)
        .await
        .expect("Failed to create database pool");

    log::info!("Database connection established");

    tokio::fs::create_dir_all(&config.storage.root).await?;
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        config.storage.root.clone(),
        config.storage.base_url.clone(),
    ));
    let storage = web::Data::from(storage);
    log::info!("Storing uploads under {}", config.storage.root.display());

    let openapi = api::ApiDoc::openapi();

    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(pool.clone()))
            .app_data(storage.clone())
            .app_data(api::multipart_config(&config))
            .route(
                "/api/docs",
                web::get().to(|| async {
                    actix_web::HttpResponse::PermanentRedirect()
                        .append_header(("Location", "/api/docs/"))
                        .finish()
                }),
            )
            .service(
                SwaggerUi::new("/api/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(api::configure)
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
