use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Alarm, Calendar, Component, EventLike};

use crate::cache::ScheduleCache;
use crate::error::Result;
use crate::models::Event;

pub const UID_DOMAIN: &str = "h5s.org";
pub const CONTENT_TYPE: &str = "text/calendar";

const TICKET_HOUR: u32 = 10;
const TICKET_MINUTE: u32 = 25;

/// When an alarm fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderTrigger {
    BeforeStart(Duration),
    At(DateTime<Utc>),
}

/// One calendar event, ready for serialization. Every alarm is an audio alarm.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEntry {
    pub uid: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: String,
    pub url: String,
    pub description: String,
    pub reminders: Vec<ReminderTrigger>,
}

impl CalendarEntry {
    pub fn for_event(event: &Event) -> Self {
        let mut reminders = vec![ReminderTrigger::BeforeStart(Duration::days(1))];
        if let Some(at) = ticket_reminder(&event.start) {
            reminders.push(ReminderTrigger::At(at));
        }

        Self {
            uid: format!("{}@{UID_DOMAIN}", event.id),
            summary: event.name.clone(),
            start: event.start.with_timezone(&Utc),
            end: event.end.with_timezone(&Utc),
            location: event.location.clone(),
            url: event.url.clone(),
            description: event.programme_text(),
            reminders,
        }
    }

    pub fn to_ics(&self) -> String {
        let mut event = icalendar::Event::new();
        event
            .uid(&self.uid)
            .summary(&self.summary)
            .starts(self.start)
            .ends(self.end)
            .location(&self.location)
            .description(&self.description)
            .add_property("URL", &self.url);

        for reminder in &self.reminders {
            let alarm = match reminder {
                ReminderTrigger::BeforeStart(lead) => Alarm::audio(-*lead),
                ReminderTrigger::At(at) => Alarm::audio(*at),
            };
            event.alarm(alarm);
        }

        let mut calendar = Calendar::new();
        calendar.push(event.done());
        calendar.to_string()
    }
}

/// 10:25 local time on the day of the concert, when day tickets go on sale.
pub fn ticket_reminder(start: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(TICKET_HOUR, TICKET_MINUTE, 0)?;
    start
        .timezone()
        .from_local_datetime(&start.date_naive().and_time(time))
        .earliest()
        .map(|at| at.with_timezone(&Utc))
}

/// Compact UTC form used by calendar files, e.g. `20240101T102500Z`.
pub fn ical_utc(at: &DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Resolves `id` through the cache and renders its calendar file. `None`
/// means no such event.
pub fn export(cache: &ScheduleCache, id: &str) -> Result<Option<String>> {
    Ok(cache
        .lookup(id)?
        .map(|event| CalendarEntry::for_event(&event).to_ics()))
}
