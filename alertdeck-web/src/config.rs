use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub port: u16,
    pub database_url: String,
    pub cors_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        // Use absolute path for database to avoid issues with working directory
        let project_root = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
        let db_path = format!("{}/data/alertdeck.db", project_root);

        Self {
            port: 3000,
            database_url: format!("sqlite://{}", db_path),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl WebConfig {
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(port) = env::var("ALERTDECK_PORT") {
            config.port = port.parse()?;
        }

        // Try ALERTDECK_DATABASE_URL first, then DATABASE_URL
        if let Ok(db_url) = env::var("ALERTDECK_DATABASE_URL") {
            config.database_url = db_url;
        } else if let Ok(db_url) = env::var("DATABASE_URL") {
            config.database_url = db_url;
        }

        if let Ok(origins) = env::var("ALERTDECK_CORS_ORIGINS") {
            config.cors_origins = origins.split(',').map(|s| s.trim().to_string()).collect();
        }

        Ok(config)
    }
}
