//! Text commands understood in guild channels.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Timelike, Utc};

use crate::errors::{RollcallError, RollcallResult};
use crate::models::EventDraft;
use crate::timing::SchedulePolicy;

const AD_HOC_NAME: &str = "Training";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!event [name; YYYY-MM-DD HH:MM; HH:MM; description; location]`
    Event(String),
    /// `!check`
    Check,
    /// `!resetWeek`
    ResetWeek,
    Ping,
    Pong,
}

impl Command {
    pub fn parse(content: &str, prefix: &str) -> Option<Command> {
        let content = content.trim();
        match content {
            "ping" => return Some(Command::Ping),
            "pong" => return Some(Command::Pong),
            _ => {}
        }

        let body = content.strip_prefix(prefix)?;
        let (word, args) = body
            .split_once(char::is_whitespace)
            .map(|(word, args)| (word, args.trim()))
            .unwrap_or((body, ""));

        match word.to_lowercase().as_str() {
            "event" => Some(Command::Event(args.to_string())),
            "check" => Some(Command::Check),
            "resetweek" => Some(Command::ResetWeek),
            _ => None,
        }
    }

    /// Forcing commands are limited to guild administrators.
    pub fn requires_admin(&self) -> bool {
        matches!(self, Command::Event(_) | Command::Check | Command::ResetWeek)
    }
}

/// Builds an ad-hoc event from `!event` arguments.
///
/// Missing fields fall back to an event named "Training" starting one hour
/// from now and lasting one hour.
pub fn ad_hoc_draft(args: &str, now: DateTime<Utc>, policy: &SchedulePolicy) -> RollcallResult<EventDraft> {
    let mut fields = args.split(';').map(str::trim);
    let field = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_string);

    let name = field(fields.next()).unwrap_or_else(|| AD_HOC_NAME.to_string());

    let start_time = match field(fields.next()) {
        Some(raw) => {
            let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M").map_err(|e| {
                RollcallError::Validation(format!("start '{}' is not YYYY-MM-DD HH:MM: {}", raw, e))
            })?;
            policy
                .local_to_utc(naive.date(), naive.hour(), naive.minute())
                .ok_or_else(|| RollcallError::Validation(format!("start '{}' does not exist locally", raw)))?
        }
        None => truncate_to_minute(now + Duration::hours(1)),
    };

    let end_time = match field(fields.next()) {
        Some(raw) => {
            let time = NaiveTime::parse_from_str(&raw, "%H:%M").map_err(|e| {
                RollcallError::Validation(format!("end '{}' is not HH:MM: {}", raw, e))
            })?;
            let date = start_time.with_timezone(&policy.timezone).date_naive();
            policy
                .local_to_utc(date, time.hour(), time.minute())
                .ok_or_else(|| RollcallError::Validation(format!("end '{}' does not exist locally", raw)))?
        }
        None => start_time + Duration::hours(1),
    };

    if end_time <= start_time {
        return Err(RollcallError::Validation(
            "event must end after it starts".to_string(),
        ));
    }

    Ok(EventDraft {
        name,
        description: field(fields.next()).unwrap_or_default(),
        location: field(fields.next()).unwrap_or_default(),
        start_time,
        end_time,
    })
}

fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_second(0)
        .and_then(|at| at.with_nanosecond(0))
        .unwrap_or(at)
}
