use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

/// Minutes allowed for a programme interval.
pub const INTERVAL_MINUTES: u32 = 20;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Event {
    pub id: String, // last path segment of the listing link
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub name: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub programme: Vec<ProgrammeSegment>,
    pub performers: Vec<Performer>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgrammeSegment {
    Work {
        composer: String,
        name: String,
        duration: u32,
    },
    Interval,
}

impl ProgrammeSegment {
    pub fn duration(&self) -> u32 {
        match self {
            ProgrammeSegment::Work { duration, .. } => *duration,
            ProgrammeSegment::Interval => INTERVAL_MINUTES,
        }
    }

    /// One running-order line, e.g. `Beethoven: Symphony No. 5 (35 mins)`.
    pub fn line(&self) -> String {
        match self {
            ProgrammeSegment::Work {
                composer,
                name,
                duration,
            } if *duration > 0 => format!("{composer}: {name} ({duration} mins)"),
            ProgrammeSegment::Work { composer, name, .. } => format!("{composer}: {name}"),
            ProgrammeSegment::Interval => "Interval".to_string(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Performer {
    pub name: String,
    pub role: String,
}

impl Performer {
    pub fn line(&self) -> String {
        if self.role.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.role)
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct Day {
    pub date: NaiveDate,
    pub events: Vec<Event>,
}

impl Event {
    /// Programme lines, a blank line, then performer lines.
    pub fn programme_text(&self) -> String {
        let mut lines: Vec<String> = self.programme.iter().map(ProgrammeSegment::line).collect();
        lines.push(String::new());
        lines.extend(self.performers.iter().map(Performer::line));
        lines.join("\n")
    }
}

/// Interval allowance plus every segment's duration, in minutes.
pub fn running_minutes(programme: &[ProgrammeSegment]) -> u32 {
    programme
        .iter()
        .fold(INTERVAL_MINUTES, |total, segment| {
            total.saturating_add(segment.duration())
        })
}
