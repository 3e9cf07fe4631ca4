use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use rocket::fairing::AdHoc;
use tracing_subscriber::EnvFilter;

use devevent::db::{ConnectionManager, MongoConnector};
use devevent::services::BookingService;
use devevent::store::{MongoBookingStore, MongoEventStore};
use devevent::{AppState, Config};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devevent=info,rocket=info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;
    tracing::info!(database = %config.database_name, "starting devevent");

    // Connects lazily on first use; closed when Rocket shuts down.
    let manager = Arc::new(ConnectionManager::new(MongoConnector::new(&config)));
    let events = Arc::new(MongoEventStore::new(Arc::clone(&manager)));
    let bookings = Arc::new(MongoBookingStore::new(Arc::clone(&manager)));

    let state = AppState {
        events: events.clone(),
        bookings: BookingService::new(events, bookings),
    };

    let closer = Arc::clone(&manager);
    devevent::build(state)
        .attach(AdHoc::on_shutdown("Close document store", |_| {
            Box::pin(async move { closer.close().await })
        }))
        .launch()
        .await
        .map_err(|err| anyhow::anyhow!("running server: {err}"))?;
    Ok(())
}
