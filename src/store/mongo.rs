use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::{FindOneOptions, FindOptions};
use mongodb::{Collection, Database};

use super::{BookingStore, EventStore};
use crate::db::{ConnectionManager, MongoConnector, BOOKINGS, EVENTS};
use crate::error::Result;
use crate::models::{booking::Booking, event::Event};

type Manager = Arc<ConnectionManager<MongoConnector>>;

async fn database(manager: &Manager) -> Result<Database> {
    Ok(manager.get().await?.database().clone())
}

pub struct MongoEventStore {
    manager: Manager,
}

impl MongoEventStore {
    pub fn new(manager: Manager) -> Self {
        MongoEventStore { manager }
    }

    async fn collection(&self) -> Result<Collection<Event>> {
        Ok(database(&self.manager).await?.collection(EVENTS))
    }
}

#[async_trait]
impl EventStore for MongoEventStore {
    async fn list(&self) -> Result<Vec<Event>> {
        let collection = self.collection().await?;
        let cursor = collection.find(doc! {}, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        let collection = self.collection().await?;
        Ok(collection.find_one(doc! { "slug": slug }, None).await?)
    }

    async fn exists(&self, id: &ObjectId) -> Result<bool> {
        let collection = database(&self.manager)
            .await?
            .collection::<Document>(EVENTS);
        let options = FindOneOptions::builder()
            .projection(doc! { "_id": 1 })
            .build();
        let found = collection.find_one(doc! { "_id": *id }, options).await?;
        Ok(found.is_some())
    }

    async fn insert_many(&self, events: Vec<Event>) -> Result<Vec<ObjectId>> {
        if events.is_empty() {
            return Ok(Vec::new());
        }
        let collection = self.collection().await?;
        let result = collection.insert_many(events, None).await?;

        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(index, _)| *index);
        Ok(ids
            .into_iter()
            .filter_map(|(_, id)| id.as_object_id())
            .collect())
    }

    async fn clear(&self) -> Result<u64> {
        let collection = self.collection().await?;
        Ok(collection.delete_many(doc! {}, None).await?.deleted_count)
    }
}

pub struct MongoBookingStore {
    manager: Manager,
}

impl MongoBookingStore {
    pub fn new(manager: Manager) -> Self {
        MongoBookingStore { manager }
    }

    async fn collection(&self) -> Result<Collection<Booking>> {
        Ok(database(&self.manager).await?.collection(BOOKINGS))
    }
}

#[async_trait]
impl BookingStore for MongoBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<ObjectId> {
        let collection = self.collection().await?;
        let id = booking.id.unwrap_or_else(ObjectId::new);
        let document = Booking {
            id: Some(id),
            ..booking.clone()
        };
        collection.insert_one(&document, None).await?;
        Ok(id)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<Booking>> {
        let collection = self.collection().await?;
        Ok(collection.find_one(doc! { "_id": *id }, None).await?)
    }

    async fn set_event(
        &self,
        id: &ObjectId,
        event_id: &ObjectId,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let collection = self.collection().await?;
        let update = doc! {
            "$set": {
                "eventId": *event_id,
                "updatedAt": mongodb::bson::DateTime::from_chrono(updated_at),
            }
        };
        let result = collection.update_one(doc! { "_id": *id }, update, None).await?;
        Ok(result.matched_count > 0)
    }

    async fn list_for_event(&self, event_id: &ObjectId, email: Option<&str>) -> Result<Vec<Booking>> {
        let collection = self.collection().await?;
        let mut filter = doc! { "eventId": *event_id };
        if let Some(email) = email {
            filter.insert("email", email);
        }
        let options = FindOptions::builder().sort(doc! { "createdAt": 1 }).build();
        let cursor = collection.find(filter, options).await?;
        Ok(cursor.try_collect().await?)
    }
}
