use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use scraper::{ElementRef, Selector};

use crate::error::{Result, ScheduleError};

/// Parses a selector that is fixed at compile time. A bad one is a bug in
/// this crate, so it panics immediately rather than matching nothing.
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("bad selector {css:?}: {err}"))
}

/// Selector queries over a parsed document tree. Missing matches come back
/// empty, never as errors.
pub trait Extract<'a> {
    fn find_first(&self, selector: &Selector) -> Option<ElementRef<'a>>;
    fn find_all(&self, selector: &Selector) -> Vec<ElementRef<'a>>;

    /// Visible text of the first match, tags stripped and outer whitespace
    /// trimmed. Empty when nothing matches.
    fn text_of(&self, selector: &Selector) -> String {
        self.find_first(selector)
            .map(inner_text)
            .unwrap_or_default()
    }

    fn attr_of(&self, selector: &Selector, attr: &str) -> Option<String> {
        self.find_first(selector)
            .and_then(|el| el.value().attr(attr))
            .map(str::to_string)
    }
}

impl<'a> Extract<'a> for ElementRef<'a> {
    fn find_first(&self, selector: &Selector) -> Option<ElementRef<'a>> {
        self.select(selector).next()
    }

    fn find_all(&self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.select(selector).collect()
    }
}

pub fn inner_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub fn fetch_html(url: &str) -> Result<Vec<u8>> {
    static CLIENT: Lazy<Client> = Lazy::new(|| {
        Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent("proms-calendar/0.1")
            .build()
            .expect("http client")
    });

    let response = CLIENT.get(url).send().map_err(|source| ScheduleError::Fetch {
        url: url.to_string(),
        source,
    })?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(ScheduleError::Status {
            url: url.to_string(),
            status,
        });
    }
    let body = response.bytes().map_err(|source| ScheduleError::Fetch {
        url: url.to_string(),
        source,
    })?;
    Ok(body.to_vec())
}
