use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};

use crate::cache::FRESHNESS_WINDOW;
use crate::scraping::{proms_html::TIMEZONE, DocumentLocation};

const DEFAULT_BIND: &str = "127.0.0.1:1895";
const DEFAULT_STATIC_DIR: &str = "./static";

/// Server configuration, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Read the listing from this file instead of fetching it.
    pub local_file: Option<PathBuf>,
    pub static_dir: PathBuf,
    pub year: Option<i32>,
    pub cache_window: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let year = non_empty("PROMS_YEAR")
            .map(|value| value.trim().parse::<i32>())
            .transpose()
            .context("PROMS_YEAR must be a year")?;
        let cache_window = non_empty("PROMS_CACHE_SECS")
            .map(|value| value.trim().parse::<u64>().map(Duration::from_secs))
            .transpose()
            .context("PROMS_CACHE_SECS must be a number of seconds")?
            .unwrap_or(FRESHNESS_WINDOW);

        Ok(Self {
            bind_addr: non_empty("PROMS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            local_file: non_empty("LOCAL").map(PathBuf::from),
            static_dir: non_empty("PROMS_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            year,
            cache_window,
        })
    }

    pub fn document_location(&self) -> DocumentLocation {
        match &self.local_file {
            Some(path) => DocumentLocation::LocalFile(path.clone()),
            None => {
                let year = self
                    .year
                    .unwrap_or_else(|| Utc::now().with_timezone(&TIMEZONE).year());
                DocumentLocation::listing_for_year(year)
            }
        }
    }
}
