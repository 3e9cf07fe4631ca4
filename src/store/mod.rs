//! Persistence seams for events and bookings.
//!
//! The MongoDB stores go through the shared [`ConnectionManager`](crate::db::ConnectionManager);
//! [`MemoryStore`] keeps everything in process.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::{MongoBookingStore, MongoEventStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::error::Result;
use crate::models::{booking::Booking, event::Event};

/// Read access to events, plus bulk writes used for seeding.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Event>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>>;

    /// Whether an event with this `_id` exists.
    async fn exists(&self, id: &ObjectId) -> Result<bool>;

    async fn insert_many(&self, events: Vec<Event>) -> Result<Vec<ObjectId>>;

    async fn clear(&self) -> Result<u64>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a new booking and return its id.
    async fn insert(&self, booking: &Booking) -> Result<ObjectId>;

    async fn find(&self, id: &ObjectId) -> Result<Option<Booking>>;

    /// Point a booking at another event. Returns false if no booking matched.
    async fn set_event(
        &self,
        id: &ObjectId,
        event_id: &ObjectId,
        updated_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Bookings for an event, optionally narrowed to one email, oldest first.
    async fn list_for_event(&self, event_id: &ObjectId, email: Option<&str>) -> Result<Vec<Booking>>;
}
