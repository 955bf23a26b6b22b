pub mod application;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

use std::error::Error;
use std::net::TcpListener;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::cart_service::CartService;
use config::AppConfig;
use domain::ports::StoreRepository;
use infrastructure::store_repo::DieselStoreRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    for version in applied {
        log::info!("applied migration {}", version);
    }
    Ok(())
}

/// Build and return an actix-web `Server` backed by PostgreSQL, bound to the
/// configured host and port.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(pool: DbPool, config: AppConfig) -> std::io::Result<actix_web::dev::Server> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))?;
    serve(CartService::new(DieselStoreRepository::new(pool)), config, listener)
}

/// Serve the storefront API for any store implementation on `listener`.
pub fn serve<R: StoreRepository>(
    service: CartService<R>,
    config: AppConfig,
    listener: TcpListener,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    let config = web::Data::new(config);
    let openapi = openapi::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(config.clone())
            .wrap(Logger::default())
            .configure(handlers::configure::<R>)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .listen(listener)?
    .run())
}
