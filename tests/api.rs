use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};

use devevent::models::event::Event;
use devevent::services::BookingService;
use devevent::store::{EventStore, MemoryStore};
use devevent::AppState;

async fn client_with_event() -> (Client, Arc<MemoryStore>, ObjectId) {
    let store = Arc::new(MemoryStore::new());
    let ids = store
        .insert_many(vec![Event {
            id: None,
            title: "React Summit 2026".to_string(),
            image: "/images/event1.png".to_string(),
            slug: "react-summit-2026".to_string(),
            location: "Amsterdam, Netherlands".to_string(),
            date: "2026-11-13".to_string(),
            time: "09:00 AM".to_string(),
        }])
        .await
        .unwrap();

    let state = AppState {
        events: store.clone(),
        bookings: BookingService::new(store.clone(), store.clone()),
    };
    let client = Client::tracked(devevent::build(state)).await.unwrap();
    (client, store, ids[0])
}

#[rocket::async_test]
async fn lists_and_finds_events() {
    let (client, _, e1) = client_with_event().await;

    let response = client.get("/api/events").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], e1.to_hex());

    let response = client.get("/api/events/react-summit-2026").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["title"], "React Summit 2026");

    let response = client.get("/api/events/no-such-event").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn booking_end_to_end() {
    let (client, store, e1) = client_with_event().await;

    let response = client
        .post("/api/bookings")
        .header(ContentType::JSON)
        .body(json!({"eventId": e1.to_hex(), "email": "User@Example.com"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["email"], "user@example.com");
    assert_eq!(body["eventId"], e1.to_hex());
    assert!(!body["createdAt"].is_null());
    assert_eq!(store.booking_count().await, 1);

    let id = body["id"].as_str().unwrap().to_string();
    let response = client.get(format!("/api/bookings/{id}")).dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .get(format!("/api/events/{}/bookings?email=USER@example.com", e1.to_hex()))
        .dispatch()
        .await;
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[rocket::async_test]
async fn unknown_event_is_404_and_names_the_id() {
    let (client, store, _) = client_with_event().await;
    let missing = ObjectId::new();

    let response = client
        .post("/api/bookings")
        .header(ContentType::JSON)
        .body(json!({"eventId": missing.to_hex(), "email": "user@example.com"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains(&missing.to_hex()));
    assert_eq!(store.booking_count().await, 0);
}

#[rocket::async_test]
async fn invalid_fields_are_422_with_field_errors() {
    let (client, store, e1) = client_with_event().await;

    let response = client
        .post("/api/bookings")
        .header(ContentType::JSON)
        .body(json!({"eventId": e1.to_hex(), "email": "not-an-email"}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["fields"][0]["field"], "email");

    let response = client
        .post("/api/bookings")
        .header(ContentType::JSON)
        .body("{}")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["fields"].as_array().unwrap().len(), 2);

    assert_eq!(store.booking_count().await, 0);
}

#[rocket::async_test]
async fn malformed_booking_id_is_400() {
    let (client, _, _) = client_with_event().await;

    let response = client.get("/api/bookings/E1").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client
        .get(format!("/api/bookings/{}", ObjectId::new().to_hex()))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn booking_can_move_to_another_existing_event() {
    let (client, store, e1) = client_with_event().await;
    let e2 = store
        .insert_many(vec![Event {
            id: None,
            title: "Open Source Hackathon".to_string(),
            image: "/images/event4.png".to_string(),
            slug: "open-source-hackathon".to_string(),
            location: "Online".to_string(),
            date: "2027-01-16".to_string(),
            time: "10:00 AM".to_string(),
        }])
        .await
        .unwrap()[0];

    let response = client
        .post("/api/bookings")
        .header(ContentType::JSON)
        .body(json!({"eventId": e1.to_hex(), "email": "dev@example.org"}).to_string())
        .dispatch()
        .await;
    let body: Value = response.into_json().await.unwrap();
    let id = body["id"].as_str().unwrap().to_string();

    let response = client
        .patch(format!("/api/bookings/{id}"))
        .header(ContentType::JSON)
        .body(json!({"eventId": ObjectId::new().to_hex()}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);

    let response = client
        .patch(format!("/api/bookings/{id}"))
        .header(ContentType::JSON)
        .body(json!({"eventId": e2.to_hex()}).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["eventId"], e2.to_hex());
}
