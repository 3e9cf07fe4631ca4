//! Document store connection management.
//!
//! [`ConnectionManager`] owns the one connection a process keeps to MongoDB.
//! It is created by the entry point, handed to the stores, and closed on
//! shutdown. The first caller starts the connect attempt; callers arriving
//! while it is in flight await the same attempt.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::ConnectError;
use crate::models::booking::Booking;

pub const EVENTS: &str = "events";
pub const BOOKINGS: &str = "bookings";

/// Opens and closes the underlying connection.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Handle: Clone + Send + Sync + 'static;

    async fn connect(&self) -> Result<Self::Handle, ConnectError>;

    async fn disconnect(&self, _handle: Self::Handle) {}
}

type PendingConnect<H> = Shared<BoxFuture<'static, Result<H, ConnectError>>>;

struct Slot<H> {
    handle: Option<H>,
    pending: Option<PendingConnect<H>>,
}

pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    slot: Mutex<Slot<C::Handle>>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        ConnectionManager {
            connector: Arc::new(connector),
            slot: Mutex::new(Slot {
                handle: None,
                pending: None,
            }),
        }
    }

    /// Return the live handle, connecting first if needed.
    ///
    /// A failed attempt is reported to every caller awaiting it and then
    /// forgotten, so the next call starts over.
    pub async fn get(&self) -> Result<C::Handle, ConnectError> {
        let attempt = {
            let mut slot = self.slot.lock().await;
            if let Some(handle) = &slot.handle {
                return Ok(handle.clone());
            }
            // An attempt that already finished but is not settled yet.
            match slot.pending.as_ref().and_then(|pending| pending.peek().cloned()) {
                Some(Ok(handle)) => {
                    slot.pending = None;
                    slot.handle = Some(handle.clone());
                    return Ok(handle);
                }
                Some(Err(_)) => slot.pending = None,
                None => {}
            }
            match &slot.pending {
                Some(pending) => pending.clone(),
                None => {
                    tracing::info!("connecting to document store");
                    let connector = Arc::clone(&self.connector);
                    let pending = async move { connector.connect().await }.boxed().shared();
                    slot.pending = Some(pending.clone());
                    pending
                }
            }
        };

        let outcome = attempt.clone().await;

        let mut slot = self.slot.lock().await;
        // Whoever gets here first settles the slot; a newer attempt is left alone.
        if slot
            .pending
            .as_ref()
            .is_some_and(|pending| pending.ptr_eq(&attempt))
        {
            slot.pending = None;
            match &outcome {
                Ok(handle) => {
                    tracing::info!("document store connection established");
                    slot.handle = Some(handle.clone());
                }
                Err(err) => tracing::warn!(error = %err, "document store connection failed"),
            }
        }
        outcome
    }

    pub async fn is_connected(&self) -> bool {
        self.slot.lock().await.handle.is_some()
    }

    /// Drop the cached connection. An attempt still in flight is awaited
    /// and its connection shut down too. The next `get` reconnects.
    pub async fn close(&self) {
        let (handle, pending) = {
            let mut slot = self.slot.lock().await;
            (slot.handle.take(), slot.pending.take())
        };
        if let Some(pending) = pending {
            if let Ok(orphan) = pending.await {
                tracing::info!("closing connection opened during shutdown");
                self.connector.disconnect(orphan).await;
            }
        }
        if let Some(handle) = handle {
            tracing::info!("closing document store connection");
            self.connector.disconnect(handle).await;
        }
    }
}

/// A connected client and the database the service works in.
#[derive(Clone)]
pub struct MongoHandle {
    client: Client,
    database: Database,
}

impl MongoHandle {
    pub fn database(&self) -> &Database {
        &self.database
    }
}

/// Connects to MongoDB and prepares the collections.
pub struct MongoConnector {
    uri: String,
    database_name: String,
}

impl MongoConnector {
    pub fn new(config: &Config) -> Self {
        MongoConnector {
            uri: config.mongodb_uri.clone(),
            database_name: config.database_name.clone(),
        }
    }
}

#[async_trait]
impl Connector for MongoConnector {
    type Handle = MongoHandle;

    async fn connect(&self) -> Result<MongoHandle, ConnectError> {
        let mut client_options = ClientOptions::parse(&self.uri).await?;
        client_options.app_name = Some("devevent".to_string());

        let client = Client::with_options(client_options)?;
        let database = client.database(&self.database_name);

        // The driver connects lazily; ping so an unreachable server fails here.
        database.run_command(doc! { "ping": 1 }, None).await?;
        ensure_indexes(&database).await?;
        Ok(MongoHandle { client, database })
    }

    async fn disconnect(&self, handle: MongoHandle) {
        handle.client.shutdown().await;
    }
}

/// `bookings` indexes: one on the event reference and a non-unique
/// compound one on (event reference, email).
pub fn booking_indexes() -> Vec<IndexModel> {
    vec![
        IndexModel::builder()
            .keys(doc! { "eventId": 1 })
            .options(IndexOptions::builder().name("eventId_1".to_string()).build())
            .build(),
        IndexModel::builder()
            .keys(doc! { "eventId": 1, "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("eventId_1_email_1".to_string())
                    .unique(false)
                    .build(),
            )
            .build(),
    ]
}

pub async fn ensure_indexes(db: &Database) -> mongodb::error::Result<()> {
    let bookings = db.collection::<Booking>(BOOKINGS);
    bookings.create_indexes(booking_indexes(), None).await?;
    Ok(())
}
