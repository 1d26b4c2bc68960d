//! Calendar rules for recurring events and weekly rollover.
//!
//! All weekday and time-of-day comparisons happen in the configured
//! timezone; timestamps are stored and passed around as UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::models::{Event, FixedTrainingTime};

pub const DEFAULT_LEAD_TIME_HOURS: i64 = 2;
pub const DEFAULT_CUTOFF_HOUR: u32 = 9;

/// Length of one rollover period.
pub fn week() -> Duration {
    Duration::days(7)
}

/// A tick slightly before the exact 7-day boundary still rolls over.
pub fn rollover_slack() -> Duration {
    Duration::hours(1)
}

/// Tunables for announcing recurring events.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePolicy {
    pub timezone: Tz,
    /// Announcements inside this window before the start are always allowed.
    pub lead_time: Duration,
    /// Before this local hour, announcements further out than `lead_time`
    /// are deferred.
    pub cutoff_hour: u32,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            lead_time: Duration::hours(DEFAULT_LEAD_TIME_HOURS),
            cutoff_hour: DEFAULT_CUTOFF_HOUR,
        }
    }
}

impl SchedulePolicy {
    pub fn local_weekday(&self, at: DateTime<Utc>) -> Weekday {
        at.with_timezone(&self.timezone).weekday()
    }

    /// Converts a local wall-clock time to UTC. Returns `None` for times
    /// skipped by a DST transition.
    pub fn local_to_utc(&self, date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
        let naive = date.and_hms_opt(hour, minute, 0)?;
        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Start and end of today's instance of `template`, if it runs today.
    pub fn todays_window(
        &self,
        template: &FixedTrainingTime,
        now: DateTime<Utc>,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let local_now = now.with_timezone(&self.timezone);
        if template.weekday()? != local_now.weekday() {
            return None;
        }
        let today = local_now.date_naive();
        let start = self.local_to_utc(today, template.start_time_hours, template.start_time_minutes)?;
        let end = self.local_to_utc(today, template.end_time_hours, template.end_time_minutes)?;
        Some((start, end))
    }

    pub fn is_too_early(&self, now: DateTime<Utc>, start: DateTime<Utc>) -> bool {
        let local_hour = now.with_timezone(&self.timezone).hour();
        local_hour < self.cutoff_hour && start - now > self.lead_time
    }

    /// Whether `event` is the instance of `template` starting at `candidate_start`.
    ///
    /// Identity is derived from name and local weekday/hour/minute; only
    /// events within one week of the candidate count, so last week's
    /// instance does not block this week's.
    pub fn is_same_slot(
        &self,
        event: &Event,
        template: &FixedTrainingTime,
        candidate_start: DateTime<Utc>,
    ) -> bool {
        if event.name != template.name {
            return false;
        }
        let local = event.start_time.with_timezone(&self.timezone);
        if Some(local.weekday()) != template.weekday()
            || local.hour() != template.start_time_hours
            || local.minute() != template.start_time_minutes
        {
            return false;
        }
        event.start_time > candidate_start - week() && event.start_time < candidate_start + week()
    }

    pub fn rollover_due(&self, now: DateTime<Utc>, last_week_reset: Option<DateTime<Utc>>) -> bool {
        if self.local_weekday(now) != Weekday::Mon {
            return false;
        }
        match last_week_reset {
            None => true,
            Some(last) => now - last >= week() - rollover_slack(),
        }
    }
}

/// First instant of the current week window.
pub fn week_window_start(now: DateTime<Utc>, last_week_reset: Option<DateTime<Utc>>) -> DateTime<Utc> {
    last_week_reset.unwrap_or_else(|| now - week())
}
