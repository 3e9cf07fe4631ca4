use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::utils::email;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub event_id: ObjectId,
    pub email: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// An unsaved booking stamped with `now`.
    pub fn new(fields: BookingFields, now: DateTime<Utc>) -> Self {
        Booking {
            id: None,
            event_id: fields.event_id,
            email: fields.email,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Booking fields that passed validation: a parsed event reference and a
/// normalized email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFields {
    pub event_id: ObjectId,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingPayload {
    pub event_id: Option<String>,
    pub email: Option<String>,
}

impl CreateBookingPayload {
    /// Check required fields and formats, collecting every field problem.
    pub fn validate(&self) -> Result<BookingFields, ValidationError> {
        let mut errors = ValidationError::default();

        let event_id = parse_event_id(self.event_id.as_deref(), &mut errors);

        let email = self.email.as_deref().map(email::normalize).unwrap_or_default();
        if email.is_empty() {
            errors.push("email", "Email is required");
        } else if !email::is_valid(&email) {
            errors.push("email", "Please provide a valid email address");
        }

        match event_id {
            Some(event_id) if errors.is_empty() => Ok(BookingFields { event_id, email }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEventPayload {
    pub event_id: Option<String>,
}

impl ChangeEventPayload {
    pub fn validate(&self) -> Result<ObjectId, ValidationError> {
        let mut errors = ValidationError::default();
        parse_event_id(self.event_id.as_deref(), &mut errors).ok_or(errors)
    }
}

fn parse_event_id(raw: Option<&str>, errors: &mut ValidationError) -> Option<ObjectId> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        errors.push("eventId", "Event ID is required");
        return None;
    }
    match ObjectId::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push("eventId", format!("Event ID {raw} is not a valid identifier"));
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub id: Option<String>,
    pub event_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingView {
    fn from(booking: Booking) -> Self {
        BookingView {
            id: booking.id.map(|id| id.to_hex()),
            event_id: booking.event_id.to_hex(),
            email: booking.email,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}
