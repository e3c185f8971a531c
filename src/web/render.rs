use chrono::Utc;
use reqwest::Url;

use crate::calendar::ical_utc;
use crate::models::{Day, Event};

const GOOGLE_CALENDAR: &str = "https://calendar.google.com/calendar/render";

pub fn listing_page(days: &[Day]) -> String {
    let mut page = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Proms in London</title>\n\
         <link rel=\"stylesheet\" href=\"/proms/static/proms.css\">\n\
         </head>\n<body>\n<h1>Proms in London</h1>\n",
    );

    if days.is_empty() {
        page.push_str("<p class=\"empty\">No concerts listed.</p>\n");
    }

    for day in days {
        page.push_str(&format!(
            "<section class=\"day\">\n<h2>{}</h2>\n<ul>\n",
            day.date.format("%A %-d %B %Y")
        ));
        for event in &day.events {
            page.push_str(&event_item(event));
        }
        page.push_str("</ul>\n</section>\n");
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn event_item(event: &Event) -> String {
    let mut item = format!(
        "<li class=\"prom\">\n<time datetime=\"{}\">{}&ndash;{}</time>\n\
         <a class=\"name\" href=\"{}\">{}</a>\n<span class=\"venue\">{}</span>\n\
         <a class=\"ics\" href=\"{}.ics\">Add to calendar</a>\n",
        event.start.to_rfc3339(),
        event.start.format("%H:%M"),
        event.end.format("%H:%M"),
        escape(&event.url),
        escape(&event.name),
        escape(&event.location),
        escape(&event.id),
    );
    if let Some(link) = google_calendar_link(event) {
        item.push_str(&format!(
            "<a class=\"google\" href=\"{}\">Google Calendar</a>\n",
            escape(&link)
        ));
    }
    if !event.description.is_empty() {
        item.push_str(&format!(
            "<p class=\"description\">{}</p>\n",
            escape(&event.description)
        ));
    }
    item.push_str(&format!(
        "<pre class=\"programme\">{}</pre>\n</li>\n",
        escape(&event.programme_text())
    ));
    item
}

fn google_calendar_link(event: &Event) -> Option<String> {
    let dates = format!(
        "{}/{}",
        ical_utc(&event.start.with_timezone(&Utc)),
        ical_utc(&event.end.with_timezone(&Utc))
    );
    Url::parse_with_params(
        GOOGLE_CALENDAR,
        [
            ("action", "TEMPLATE"),
            ("text", event.name.as_str()),
            ("dates", dates.as_str()),
            ("location", event.location.as_str()),
            ("details", event.url.as_str()),
        ],
    )
    .ok()
    .map(String::from)
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
