use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{BookingStore, EventStore};
use crate::error::Result;
use crate::models::{booking::Booking, event::Event};

/// In-process event and booking store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    events: RwLock<Vec<Event>>,
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn booking_count(&self) -> usize {
        self.bookings.read().await.len()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Event>> {
        Ok(self.events.read().await.clone())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>> {
        let events = self.events.read().await;
        Ok(events.iter().find(|e| e.slug == slug).cloned())
    }

    async fn exists(&self, id: &ObjectId) -> Result<bool> {
        let events = self.events.read().await;
        Ok(events.iter().any(|e| e.id.as_ref() == Some(id)))
    }

    async fn insert_many(&self, new_events: Vec<Event>) -> Result<Vec<ObjectId>> {
        let mut events = self.events.write().await;
        let mut ids = Vec::with_capacity(new_events.len());
        for mut event in new_events {
            let id = *event.id.get_or_insert_with(ObjectId::new);
            ids.push(id);
            events.push(event);
        }
        Ok(ids)
    }

    async fn clear(&self) -> Result<u64> {
        let mut events = self.events.write().await;
        let removed = events.len() as u64;
        events.clear();
        Ok(removed)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<ObjectId> {
        let id = booking.id.unwrap_or_else(ObjectId::new);
        self.bookings.write().await.push(Booking {
            id: Some(id),
            ..booking.clone()
        });
        Ok(id)
    }

    async fn find(&self, id: &ObjectId) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().find(|b| b.id.as_ref() == Some(id)).cloned())
    }

    async fn set_event(
        &self,
        id: &ObjectId,
        event_id: &ObjectId,
        updated_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut bookings = self.bookings.write().await;
        match bookings.iter_mut().find(|b| b.id.as_ref() == Some(id)) {
            Some(booking) => {
                booking.event_id = *event_id;
                booking.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_for_event(&self, event_id: &ObjectId, email: Option<&str>) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut matching: Vec<Booking> = bookings
            .iter()
            .filter(|b| &b.event_id == event_id)
            .filter(|b| email.map_or(true, |email| b.email == email))
            .cloned()
            .collect();
        matching.sort_by_key(|b| b.created_at);
        Ok(matching)
    }
}
