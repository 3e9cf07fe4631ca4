//! DevEvent: event listing and booking service backed by MongoDB.

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Build, Request, Response, Rocket};

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
pub use routes::public::AppState;

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Methods", "POST, GET, PATCH, OPTIONS"));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

/// Assemble the HTTP API around already-constructed stores.
pub fn build(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .attach(Cors)
        .mount("/api", routes::public::routes())
        .register("/", routes::public::catchers())
}
