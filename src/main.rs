use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use log::{info, warn};

use taskvault::config::Config;
use taskvault::routes;
use taskvault::store::{MemoryStore, PgStore};
use taskvault::{AppError, Services};

async fn build_services(config: &Config) -> Result<Services, AppError> {
    match &config.database_url {
        Some(url) => {
            let store = Arc::new(PgStore::connect(url, config.database_timeout).await?);
            info!("using postgres store");
            Services::new(&config.auth, store.clone(), store)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            Services::new(&config.auth, store.clone(), store)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(fatal)?;
    let services = build_services(&config).await.map_err(fatal)?;

    info!("Starting TaskVault server at {}", config.server_url());
    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(services.auth_middleware())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(|cfg| services.configure(cfg))
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

fn fatal(error: AppError) -> std::io::Error {
    log::error!("startup failed: {}", error);
    std::io::Error::new(std::io::ErrorKind::Other, error.to_string())
}
