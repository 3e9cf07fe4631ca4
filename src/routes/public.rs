use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, patch, post, routes, Catcher, Request, Route, State};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::models::booking::{BookingView, ChangeEventPayload, CreateBookingPayload};
use crate::models::event::EventView;
use crate::services::BookingService;
use crate::store::EventStore;

/// Shared request state, owned by the Rocket instance.
pub struct AppState {
    pub events: Arc<dyn EventStore>,
    pub bookings: BookingService,
}

fn parse_id(raw: &str) -> Result<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| Error::InvalidId(raw.to_string()))
}

#[get("/events")]
pub async fn get_events(state: &State<AppState>) -> Result<Json<Vec<EventView>>> {
    let events = state.events.list().await?;
    Ok(Json(events.into_iter().map(EventView::from).collect()))
}

#[get("/events/<slug>")]
pub async fn get_event(state: &State<AppState>, slug: &str) -> Result<Option<Json<EventView>>> {
    let event = state.events.find_by_slug(slug).await?;
    Ok(event.map(|e| Json(e.into())))
}

#[get("/events/<id>/bookings?<email>")]
pub async fn get_event_bookings(
    state: &State<AppState>,
    id: &str,
    email: Option<&str>,
) -> Result<Json<Vec<BookingView>>> {
    let event_id = parse_id(id)?;
    let bookings = state.bookings.list_for_event(&event_id, email).await?;
    Ok(Json(bookings.into_iter().map(BookingView::from).collect()))
}

#[post("/bookings", data = "<payload>")]
pub async fn create_booking(
    state: &State<AppState>,
    payload: Json<CreateBookingPayload>,
) -> Result<Created<Json<BookingView>>> {
    let booking = state.bookings.create(&payload).await?;
    let location = booking
        .id
        .map(|id| format!("/api/bookings/{}", id.to_hex()))
        .unwrap_or_else(|| "/api/bookings".to_string());
    Ok(Created::new(location).body(Json(booking.into())))
}

#[get("/bookings/<id>")]
pub async fn get_booking(state: &State<AppState>, id: &str) -> Result<Json<BookingView>> {
    let booking = state.bookings.find(&parse_id(id)?).await?;
    Ok(Json(booking.into()))
}

#[patch("/bookings/<id>", data = "<payload>")]
pub async fn change_booking_event(
    state: &State<AppState>,
    id: &str,
    payload: Json<ChangeEventPayload>,
) -> Result<Json<BookingView>> {
    let booking = state.bookings.change_event(&parse_id(id)?, &payload).await?;
    Ok(Json(booking.into()))
}

#[catch(default)]
fn default_catcher(status: rocket::http::Status, _request: &Request<'_>) -> Json<Value> {
    Json(json!({"error": status.reason_lossy()}))
}

pub fn routes() -> Vec<Route> {
    routes![
        get_events,
        get_event,
        get_event_bookings,
        create_booking,
        get_booking,
        change_booking_event
    ]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}
