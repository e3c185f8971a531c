use chrono::NaiveDate;

use crate::models::{Day, Event};

/// Venues shown on the public listing.
pub const LONDON_VENUES: [&str; 3] = [
    "Royal Albert Hall",
    "Battersea Arts Centre",
    "Printworks London",
];

/// Groups events into days by their local start date, keeping only events
/// at one of `venues` (exact, case-sensitive match).
///
/// Events are expected in chronological order and are never re-sorted. An
/// event whose date belongs to a day that was already closed is appended to
/// that day rather than opening a duplicate, and a warning is logged.
/// Days left with no listed events are omitted.
pub fn project_days(events: &[Event], venues: &[&str]) -> Vec<Day> {
    let mut days: Vec<Day> = Vec::new();

    for event in events {
        let date = event.start.date_naive();
        let same_day = days.last().map_or(false, |open| open.date == date);
        let index = if same_day {
            days.len() - 1
        } else if let Some(index) = position_of(&days, date) {
            tracing::warn!(id = %event.id, %date, "listing event out of date order");
            index
        } else {
            days.push(Day {
                date,
                events: Vec::new(),
            });
            days.len() - 1
        };

        if venues.contains(&event.location.as_str()) {
            days[index].events.push(event.clone());
        }
    }

    days.retain(|day| !day.events.is_empty());
    days
}

fn position_of(days: &[Day], date: NaiveDate) -> Option<usize> {
    days.iter().position(|day| day.date == date)
}
