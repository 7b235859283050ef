use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;

use seinfeld_quotes::api::init_routes;
use seinfeld_quotes::config::Config;
use seinfeld_quotes::db::setup_database;
use seinfeld_quotes::state::AppState;
use seinfeld_quotes::store::QuoteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    seinfeld_quotes::init_tracing();

    let config = Config::from_env()?;
    if config.api_token.is_none() {
        tracing::warn!("API_TOKEN not set, create/update/delete endpoints are disabled");
    }

    let pool = setup_database(
        &config.database_url,
        config.db_max_connections,
        config.db_acquire_timeout,
    )
    .await?;
    let state = web::Data::new(AppState::new(QuoteStore::new(pool.clone()), &config));

    tracing::info!(addr = %config.bind_addr, "backend running");
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();
        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(init_routes)
    })
    .bind(&config.bind_addr)?
    .run()
    .await?;

    pool.close().await;
    tracing::info!("server shut down");
    Ok(())
}
