use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use devevent::db::{ConnectionManager, MongoConnector};
use devevent::models::event::Event;
use devevent::store::{EventStore, MongoEventStore};
use devevent::Config;

fn event(title: &str, image: &str, slug: &str, location: &str, date: &str, time: &str) -> Event {
    Event {
        id: None,
        title: title.to_string(),
        image: image.to_string(),
        slug: slug.to_string(),
        location: location.to_string(),
        date: date.to_string(),
        time: time.to_string(),
    }
}

fn sample_events() -> Vec<Event> {
    vec![
        event(
            "React Summit 2026",
            "/images/event1.png",
            "react-summit-2026",
            "Amsterdam, Netherlands",
            "2026-11-13",
            "09:00 AM",
        ),
        event(
            "RustConf Hack Night",
            "/images/event2.png",
            "rustconf-hack-night",
            "Seattle, WA, USA",
            "2026-11-20",
            "06:00 PM",
        ),
        event(
            "Cloud Native Meetup",
            "/images/event3.png",
            "cloud-native-meetup",
            "Berlin, Germany",
            "2026-12-02",
            "07:00 PM",
        ),
        event(
            "Open Source Hackathon",
            "/images/event4.png",
            "open-source-hackathon",
            "Online",
            "2027-01-16",
            "10:00 AM",
        ),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let manager = Arc::new(ConnectionManager::new(MongoConnector::new(&config)));
    let events = MongoEventStore::new(Arc::clone(&manager));

    let removed = events.clear().await.context("clearing events")?;
    tracing::info!(removed, "cleared existing events");

    let samples = sample_events();
    let titles: Vec<String> = samples.iter().map(|e| e.title.clone()).collect();
    let ids = events.insert_many(samples).await.context("inserting events")?;
    for (id, title) in ids.iter().zip(&titles) {
        tracing::info!(%id, %title, "seeded event");
    }

    manager.close().await;
    tracing::info!(count = ids.len(), "seeding complete");
    Ok(())
}
