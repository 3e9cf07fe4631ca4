use std::env;

use crate::error::{Error, Result};

const DEFAULT_DATABASE: &str = "devevent";

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub database_name: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongodb_uri = lookup("MONGODB_URI")
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "MONGODB_URI must be set (e.g. in .env) to reach the document store".to_string(),
                )
            })?;

        let database_name = lookup("MONGODB_DB")
            .filter(|name| !name.trim().is_empty())
            .or_else(|| database_from_uri(&mongodb_uri))
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        Ok(Config {
            mongodb_uri,
            database_name,
        })
    }
}

/// Database name from the path segment of a connection string, if any.
fn database_from_uri(uri: &str) -> Option<String> {
    let without_scheme = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let (_, path) = without_scheme.split_once('/')?;
    let name = path.split('?').next().unwrap_or_default();
    (!name.is_empty()).then(|| name.to_string())
}
