use serde::{Deserialize, Serialize};
use mongodb::bson::oid::ObjectId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub image: String,
    pub slug: String,
    pub location: String,
    pub date: String,
    pub time: String,
}

/// JSON shape of an event card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventView {
    pub id: Option<String>,
    pub title: String,
    pub image: String,
    pub slug: String,
    pub location: String,
    pub date: String,
    pub time: String,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        EventView {
            id: event.id.map(|id| id.to_hex()),
            title: event.title,
            image: event.image,
            slug: event.slug,
            location: event.location,
            date: event.date,
            time: event.time,
        }
    }
}
