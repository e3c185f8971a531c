use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Weekday};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use super::base::{self, Extract};
use crate::error::{Result, ScheduleError};
use crate::models::{self, Event, Performer, ProgrammeSegment};

pub const SITE_ORIGIN: &str = "https://www.bbc.co.uk";
pub const TIMEZONE: Tz = chrono_tz::Europe::London;

// Applied after the leading weekday name is stripped.
const DAY_FORMAT: &str = "%d %b %Y";
const START_FORMAT: &str = "%d %b %Y %H:%M";

static DAY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector("li[data-id-for-tests='event-summaries-date-section']"));
static DAY_HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| base::selector("h3"));
static EVENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector("li[data-id-for-tests='event-summary']"));
static NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-event-calendar__name"));
static TIME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-event-calendar__time"));
static LOCATION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-event-calendar__event-location"));
static DESCRIPTION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-event-calendar__event-description"));
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| base::selector("a"));
static SEGMENT_GROUP_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    base::selector(".ev-act-schedule__performance-composer-segments-list>li")
});
static INTERVAL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-act-schedule__performance-segment-interval"));
static COMPOSER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-act-schedule__performance-composers"));
static WORK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-act-schedule__performance-segment"));
static WORK_NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-act-schedule__performance-work-name"));
static DURATION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-act-schedule__performance-work-duration"));
static PERFORMER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    base::selector("div[data-id-for-tests='event-schedule-artists'] .ev-act-schedule__artist")
});
static PERFORMER_NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-act-schedule__artist-name"));
static PERFORMER_ROLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| base::selector(".ev-act-schedule__artist-role-container"));
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digits regex"));

/// Why one event summary was left out of an extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("malformed start {text:?} for {name:?}")]
    MalformedStart { name: String, text: String },
    #[error("start {text:?} for {name:?} does not exist in the observation zone")]
    NonexistentStart { name: String, text: String },
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub events: Vec<Event>,
    pub skipped: Vec<SkipReason>,
}

/// Builds every event in a listing document, in document order (day-major,
/// then event order within the day).
pub fn parse_document(html: &str) -> Result<Extraction> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let mut extraction = Extraction::default();

    for day_node in root.find_all(&DAY_SELECTOR) {
        let date_text = day_node.text_of(&DAY_HEADING_SELECTOR);
        parse_day(&date_text)?;

        for event_node in day_node.find_all(&EVENT_SELECTOR) {
            match parse_event(&event_node, &date_text) {
                Ok(event) => extraction.events.push(event),
                Err(reason) => {
                    tracing::warn!(%reason, "skipping event");
                    extraction.skipped.push(reason);
                }
            }
        }
    }

    Ok(extraction)
}

/// Parses a day heading such as `Mon 1 Jan 2024`.
pub fn parse_day(text: &str) -> Result<NaiveDate> {
    strip_weekday(text)
        .and_then(|rest| NaiveDate::parse_from_str(rest, DAY_FORMAT).ok())
        .ok_or_else(|| ScheduleError::DayHeading(text.to_string()))
}

/// Drops the leading weekday name. It must be a real weekday but is not
/// checked against the date that follows.
fn strip_weekday(text: &str) -> Option<&str> {
    let (weekday, rest) = text.trim().split_once(char::is_whitespace)?;
    weekday.parse::<Weekday>().ok()?;
    Some(rest.trim_start())
}

fn parse_event(node: &ElementRef<'_>, date_text: &str) -> Result<Event, SkipReason> {
    let name = node.text_of(&NAME_SELECTOR);
    let start_text = format!("{} {}", date_text, node.text_of(&TIME_SELECTOR));
    let start = parse_start(&name, &start_text)?;

    let (id, url) = node
        .attr_of(&LINK_SELECTOR, "href")
        .map(|href| link_identity(&href))
        .unwrap_or_default();

    let programme = parse_programme(node);
    let performers = parse_performers(node);
    let end = start + Duration::minutes(i64::from(models::running_minutes(&programme)));

    Ok(Event {
        id,
        start,
        end,
        name,
        location: node.text_of(&LOCATION_SELECTOR),
        description: node.text_of(&DESCRIPTION_SELECTOR),
        url,
        programme,
        performers,
    })
}

fn parse_start(name: &str, text: &str) -> Result<DateTime<Tz>, SkipReason> {
    let naive = strip_weekday(text)
        .and_then(|rest| NaiveDateTime::parse_from_str(rest, START_FORMAT).ok())
        .ok_or_else(|| SkipReason::MalformedStart {
            name: name.to_string(),
            text: text.to_string(),
        })?;
    match TIMEZONE.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(dt, _) => Ok(dt),
        LocalResult::None => Err(SkipReason::NonexistentStart {
            name: name.to_string(),
            text: text.to_string(),
        }),
    }
}

/// Identifier is the last path segment of the link; the URL is the site
/// origin joined to the raw link.
fn link_identity(href: &str) -> (String, String) {
    let id = href.rsplit('/').next().unwrap_or_default().to_string();
    (id, format!("{SITE_ORIGIN}{href}"))
}

fn parse_programme(node: &ElementRef<'_>) -> Vec<ProgrammeSegment> {
    let mut programme = Vec::new();
    for group in node.find_all(&SEGMENT_GROUP_SELECTOR) {
        if group.find_first(&INTERVAL_SELECTOR).is_some() {
            programme.push(ProgrammeSegment::Interval);
            continue;
        }
        let composer = group.text_of(&COMPOSER_SELECTOR);
        for work in group.find_all(&WORK_SELECTOR) {
            programme.push(ProgrammeSegment::Work {
                composer: composer.clone(),
                name: work.text_of(&WORK_NAME_SELECTOR),
                duration: parse_duration(&work.text_of(&DURATION_SELECTOR)),
            });
        }
    }
    programme
}

/// First run of digits in a label like `45 mins`; zero when there is none.
pub fn parse_duration(label: &str) -> u32 {
    DIGITS_RE
        .find(label)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn parse_performers(node: &ElementRef<'_>) -> Vec<Performer> {
    let mut performers: Vec<Performer> = node
        .find_all(&PERFORMER_SELECTOR)
        .into_iter()
        .map(|el| Performer {
            name: el.text_of(&PERFORMER_NAME_SELECTOR),
            role: el.text_of(&PERFORMER_ROLE_SELECTOR),
        })
        .collect();
    // stable: equal roles keep page order
    performers.sort_by(|a, b| a.role.cmp(&b.role));
    performers
}
