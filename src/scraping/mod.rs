pub mod base;
pub mod proms_html;

use std::path::PathBuf;
use std::time::Instant;

use crate::error::{Result, ScheduleError};
use crate::models::Event;

/// Produces one complete event collection per call, or fails the whole pass.
pub trait ScheduleSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<Event>>;
}

/// Where the listing document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLocation {
    Remote(String),
    LocalFile(PathBuf),
}

impl DocumentLocation {
    pub fn listing_for_year(year: i32) -> Self {
        DocumentLocation::Remote(format!(
            "{}/proms/events/by/date/{year}",
            proms_html::SITE_ORIGIN
        ))
    }

    fn read(&self) -> Result<Vec<u8>> {
        match self {
            DocumentLocation::Remote(url) => base::fetch_html(url),
            DocumentLocation::LocalFile(path) => {
                std::fs::read(path).map_err(|source| ScheduleError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        }
    }
}

pub struct PromsListing {
    location: DocumentLocation,
}

impl PromsListing {
    pub fn new(location: DocumentLocation) -> Self {
        Self { location }
    }
}

impl ScheduleSource for PromsListing {
    fn fetch(&self) -> Result<Vec<Event>> {
        let started = Instant::now();
        let raw = self.location.read()?;
        let html = String::from_utf8_lossy(&raw);
        let extraction = proms_html::parse_document(&html)?;
        tracing::info!(
            location = ?self.location,
            events = extraction.events.len(),
            skipped = extraction.skipped.len(),
            elapsed = ?started.elapsed(),
            "extracted proms listing"
        );
        Ok(extraction.events)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn listing_url_is_parameterised_by_year() {
        assert_eq!(
            DocumentLocation::listing_for_year(2024),
            DocumentLocation::Remote("https://www.bbc.co.uk/proms/events/by/date/2024".to_string())
        );
    }

    #[test]
    fn reads_local_override() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(proms_html::tests::SAMPLE_HTML.as_bytes())
            .expect("write fixture");

        let source = PromsListing::new(DocumentLocation::LocalFile(file.path().to_path_buf()));
        let events = source.fetch().expect("fetch local listing");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "opening-night");
    }

    #[test]
    fn missing_local_file_is_fatal() {
        let source = PromsListing::new(DocumentLocation::LocalFile(PathBuf::from(
            "/nonexistent/proms.html",
        )));
        assert!(matches!(source.fetch(), Err(ScheduleError::Io { .. })));
    }
}
