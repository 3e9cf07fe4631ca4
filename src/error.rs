//! Error types for the booking service.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, status::Custom, Responder};
use rocket::serde::json::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving events and bookings.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or unusable configuration, fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// The document store could not be reached
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// One or more booking fields failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The booking references an event that does not exist
    #[error("Event with ID {0} does not exist. Cannot create booking for non-existent event.")]
    EventNotFound(ObjectId),

    #[error("Booking with ID {0} does not exist")]
    BookingNotFound(ObjectId),

    /// A path segment that should be an ObjectId is not one
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl Error {
    /// HTTP status for this error.
    pub fn status(&self) -> Status {
        match self {
            Error::Validation(_) => Status::UnprocessableEntity,
            Error::InvalidId(_) => Status::BadRequest,
            Error::EventNotFound(_) | Error::BookingNotFound(_) => Status::NotFound,
            Error::Connect(_) => Status::ServiceUnavailable,
            Error::Config(_) | Error::Database(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let body = match &self {
            Error::Validation(validation) => json!({
                "error": validation.to_string(),
                "fields": validation.errors(),
            }),
            Error::Database(_) => {
                tracing::error!(error = %self, path = %request.uri(), "database failure");
                json!({"error": "Database error"})
            }
            Error::Connect(_) | Error::Config(_) => {
                tracing::error!(error = %self, path = %request.uri(), "document store unavailable");
                json!({"error": "Service temporarily unavailable"})
            }
            _ => json!({"error": self.to_string()}),
        };
        Custom(status, Json(body)).respond_to(request)
    }
}

/// Failure to establish the document store connection.
///
/// Cloneable so that one failed attempt can be handed to every caller that
/// was waiting on it.
#[derive(Debug, Clone)]
pub struct ConnectError(Arc<dyn StdError + Send + Sync>);

impl ConnectError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        ConnectError(Arc::from(source.into()))
    }
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to connect to the document store: {}", self.0)
    }
}

impl StdError for ConnectError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.0.as_ref())
    }
}

impl From<mongodb::error::Error> for ConnectError {
    fn from(err: mongodb::error::Error) -> Self {
        ConnectError::new(err)
    }
}

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field failures found for one booking.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Booking validation failed")?;
        for (i, err) in self.errors.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{sep}{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl StdError for ValidationError {}
