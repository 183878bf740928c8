use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::storage::PREFERENCE_KEY;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Site
    pub site_dir: PathBuf,
    pub switch_class: String,

    // Preference cookie
    pub preference_cookie: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: match std::env::var("PORT") {
                Ok(port) => port
                    .parse()
                    .with_context(|| format!("PORT is not a valid port: {}", port))?,
                Err(_) => 8080,
            },

            site_dir: std::env::var("SITE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public")),
            switch_class: std::env::var("SWITCH_CLASS")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "dropdown-item".to_string()),

            preference_cookie: std::env::var("PREFERENCE_COOKIE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| PREFERENCE_KEY.to_string()),
        })
    }

    /// Config serving `site_dir` with every other setting at its default.
    pub fn for_site(site_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: 8080,
            site_dir: site_dir.into(),
            switch_class: "dropdown-item".to_string(),
            preference_cookie: PREFERENCE_KEY.to_string(),
        }
    }
}
