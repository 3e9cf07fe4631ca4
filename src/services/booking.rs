//! Booking write path.
//!
//! Every write runs the same steps in order: field validation, then the
//! event existence check when the event reference is new or changed, then
//! persistence. Any failure stops before the store is touched.

use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::error::{Error, Result};
use crate::models::booking::{Booking, ChangeEventPayload, CreateBookingPayload};
use crate::store::{BookingStore, EventStore};
use crate::utils::email;

#[derive(Clone)]
pub struct BookingService {
    events: Arc<dyn EventStore>,
    bookings: Arc<dyn BookingStore>,
}

impl BookingService {
    pub fn new(events: Arc<dyn EventStore>, bookings: Arc<dyn BookingStore>) -> Self {
        BookingService { events, bookings }
    }

    #[tracing::instrument(name = "Create booking", skip(self, payload))]
    pub async fn create(&self, payload: &CreateBookingPayload) -> Result<Booking> {
        let fields = payload.validate().map_err(|err| {
            tracing::info!(error = %err, "booking rejected");
            Error::from(err)
        })?;
        self.ensure_event_exists(&fields.event_id).await?;

        let mut booking = Booking::new(fields, Utc::now());
        let id = self.bookings.insert(&booking).await?;
        booking.id = Some(id);

        tracing::info!(booking_id = %id, event_id = %booking.event_id, "booking created");
        Ok(booking)
    }

    pub async fn find(&self, id: &ObjectId) -> Result<Booking> {
        self.bookings
            .find(id)
            .await?
            .ok_or(Error::BookingNotFound(*id))
    }

    /// Reassign a booking to another event. Pointing it at the event it
    /// already references changes nothing.
    #[tracing::instrument(name = "Change booking event", skip(self, payload))]
    pub async fn change_event(&self, id: &ObjectId, payload: &ChangeEventPayload) -> Result<Booking> {
        let event_id = payload.validate()?;
        let mut booking = self.find(id).await?;
        if booking.event_id == event_id {
            return Ok(booking);
        }

        self.ensure_event_exists(&event_id).await?;
        let now = Utc::now();
        if !self.bookings.set_event(id, &event_id, now).await? {
            return Err(Error::BookingNotFound(*id));
        }

        tracing::info!(booking_id = %id, from = %booking.event_id, to = %event_id, "booking moved");
        booking.event_id = event_id;
        booking.updated_at = now;
        Ok(booking)
    }

    pub async fn list_for_event(&self, event_id: &ObjectId, email: Option<&str>) -> Result<Vec<Booking>> {
        let email = email.map(email::normalize).filter(|e| !e.is_empty());
        self.bookings.list_for_event(event_id, email.as_deref()).await
    }

    async fn ensure_event_exists(&self, event_id: &ObjectId) -> Result<()> {
        if self.events.exists(event_id).await? {
            Ok(())
        } else {
            tracing::info!(event_id = %event_id, "booking references unknown event");
            Err(Error::EventNotFound(*event_id))
        }
    }
}
