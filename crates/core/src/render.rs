//! Plain-text message bodies for event announcements and weekly summaries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::models::{Answer, Attendance, Event, User};

const UNKNOWN_USER: &str = "unknown";

/// Renders an announcement: header, then one line per answer in the given order.
pub fn render_event(event: &Event, answers: &[Answer], users: &[User], tz: &Tz) -> String {
    let start = event.start_time.with_timezone(tz);
    let end = event.end_time.with_timezone(tz);

    let mut lines = vec![
        format!("**{}**", event.name),
        format!(
            "{} – {}",
            start.format("%A %d.%m.%Y %H:%M"),
            end.format("%H:%M")
        ),
    ];
    if !event.description.is_empty() {
        lines.push(event.description.clone());
    }
    if !event.location.is_empty() {
        lines.push(format!("📍 {}", event.location));
    }

    if !answers.is_empty() {
        let names: HashMap<Uuid, &str> = users
            .iter()
            .map(|user| (user.id, user.display_name.as_str()))
            .collect();

        lines.push(String::new());
        for answer in answers {
            let name = names.get(&answer.user_id).copied().unwrap_or(UNKNOWN_USER);
            lines.push(answer_line(answer.yes_no, name, answer.updated_at, tz));
        }
    }

    lines.join("\n")
}

fn answer_line(yes_no: Attendance, name: &str, updated_at: DateTime<Utc>, tz: &Tz) -> String {
    format!(
        "{} {} ({})",
        yes_no.symbol(),
        name,
        updated_at.with_timezone(tz).format("%d.%m. %H:%M")
    )
}

/// Recovers `(display name, attendance)` pairs from a rendered announcement.
///
/// Only the block after the last blank line counts, and only when every line
/// in it is an answer line, so header text that happens to look like an
/// answer is never picked up.
pub fn parse_answer_lines(text: &str) -> Vec<(String, Attendance)> {
    let Some((_, block)) = text.rsplit_once("\n\n") else {
        return Vec::new();
    };
    block
        .lines()
        .map(parse_answer_line)
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default()
}

fn parse_answer_line(line: &str) -> Option<(String, Attendance)> {
    let (yes_no, rest) = Attendance::ALL.iter().find_map(|yes_no| {
        line.strip_prefix(yes_no.symbol())
            .and_then(|rest| rest.strip_prefix(' '))
            .map(|rest| (*yes_no, rest))
    })?;
    let (name, _) = rest.rsplit_once(" (")?;
    Some((name.to_string(), yes_no))
}

/// Per-event tally used in the weekly summary.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTally {
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub yes_names: Vec<String>,
}

pub fn render_summary(
    tallies: &[EventTally],
    eligible: usize,
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> String {
    let mut lines = vec![format!(
        "**Weekly summary** ({} – {})",
        window_start.with_timezone(tz).format("%d.%m."),
        now.with_timezone(tz).format("%d.%m.")
    )];

    if tallies.is_empty() {
        lines.push("No events this week.".to_string());
    }

    for tally in tallies {
        let mut line = format!(
            "{} ({}): {}/{}",
            tally.name,
            tally.start_time.with_timezone(tz).format("%A %d.%m. %H:%M"),
            tally.yes_names.len(),
            eligible
        );
        if !tally.yes_names.is_empty() {
            line.push_str(" – ");
            line.push_str(&tally.yes_names.join(", "));
        }
        lines.push(line);
    }

    lines.join("\n")
}
