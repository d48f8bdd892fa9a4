#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};

mod error;
mod routes;

use error::AppError;
use logger::init_tracing;
use xrmon::database::{LibsqlStore, Store};
use xrmon::pool;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    init_tracing();

    let addr: SocketAddr = std::env::var("XRMON_API_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()?;
    let db_path =
        std::env::var("XRMON_DB_PATH").unwrap_or_else(|_| "xroad_monitoring.db".into());

    // The agent owns the schema and runs migrations; this server only reads.
    let pool = pool::open(&db_path).await?;
    let store: Arc<dyn Store> = Arc::new(LibsqlStore::new_from_pool(pool));

    run_server(addr, store).await
}

async fn run_server(addr: SocketAddr, store: Arc<dyn Store>) -> Result<(), AppError> {
    let store = web::Data::from(store);

    HttpServer::new(move || App::new().app_data(store.clone()).configure(routes::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}
