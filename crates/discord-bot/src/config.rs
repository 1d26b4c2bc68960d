use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::Duration;
use chrono_tz::Tz;
use eyre::{Result, WrapErr, eyre};
use rollcall_core::models::{DEFAULT_CHANNEL_NAME, FixedTrainingTime, TemplateFile};
use rollcall_core::orchestrator::Settings;
use rollcall_core::timing::{DEFAULT_CUTOFF_HOUR, DEFAULT_LEAD_TIME_HOURS, SchedulePolicy};

const DEFAULT_TEMPLATES_PATH: &str = "config.json";
const DEFAULT_TICK_SECONDS: u64 = 60;

/// Configuration for the Discord bot.
///
/// Everything except the token and the database URL has a default.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Discord bot token (required)
    pub token: String,
    /// Database connection URL (required)
    pub database_url: String,
    /// JSON file with the recurring event templates
    pub templates_path: PathBuf,
    /// Channel announcements and summaries go to
    pub channel_name: String,
    pub timezone: Tz,
    pub lead_time_hours: i64,
    pub cutoff_hour: u32,
    pub tick_seconds: u64,
    /// Prefix for commands (defaults to "!")
    pub command_prefix: Option<String>,
}

impl BotConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("DISCORD_TOKEN")
            .ok_or_else(|| eyre!("DISCORD_TOKEN environment variable not set"))?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable not set"))?;

        let templates_path = lookup("ROLLCALL_TEMPLATES")
            .unwrap_or_else(|| DEFAULT_TEMPLATES_PATH.to_string())
            .into();

        let channel_name = lookup("ROLLCALL_CHANNEL")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHANNEL_NAME.to_string());

        let timezone = match lookup("ROLLCALL_TIMEZONE") {
            Some(raw) => raw
                .parse::<Tz>()
                .map_err(|e| eyre!("ROLLCALL_TIMEZONE '{}' is not a known timezone: {}", raw, e))?,
            None => Tz::UTC,
        };

        let lead_time_hours = parse_or(&lookup, "ROLLCALL_LEAD_TIME_HOURS", DEFAULT_LEAD_TIME_HOURS)?;
        if lead_time_hours < 0 {
            return Err(eyre!("ROLLCALL_LEAD_TIME_HOURS must not be negative"));
        }

        let cutoff_hour = parse_or(&lookup, "ROLLCALL_CUTOFF_HOUR", DEFAULT_CUTOFF_HOUR)?;
        if cutoff_hour > 23 {
            return Err(eyre!("ROLLCALL_CUTOFF_HOUR must be within 0..=23"));
        }

        let tick_seconds = parse_or(&lookup, "ROLLCALL_TICK_SECONDS", DEFAULT_TICK_SECONDS)?;
        if tick_seconds == 0 {
            return Err(eyre!("ROLLCALL_TICK_SECONDS must be positive"));
        }

        // an empty prefix would turn every message into a command
        let command_prefix = lookup("DISCORD_COMMAND_PREFIX").filter(|prefix| !prefix.trim().is_empty());

        Ok(Self {
            token,
            database_url,
            templates_path,
            channel_name,
            timezone,
            lead_time_hours,
            cutoff_hour,
            tick_seconds,
            command_prefix,
        })
    }

    /// Get the command prefix (defaults to "!" if not set)
    pub fn command_prefix(&self) -> &str {
        self.command_prefix.as_deref().unwrap_or("!")
    }

    pub fn tick_period(&self) -> StdDuration {
        StdDuration::from_secs(self.tick_seconds)
    }

    pub fn policy(&self) -> SchedulePolicy {
        SchedulePolicy {
            timezone: self.timezone,
            lead_time: Duration::hours(self.lead_time_hours),
            cutoff_hour: self.cutoff_hour,
        }
    }

    /// Reads and validates the template file.
    pub fn load_templates(&self) -> Result<Vec<FixedTrainingTime>> {
        load_templates(&self.templates_path)
    }

    pub fn settings(&self, templates: Vec<FixedTrainingTime>) -> Settings {
        Settings {
            templates,
            policy: self.policy(),
            default_channel: self.channel_name.clone(),
            command_prefix: self.command_prefix().to_string(),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| eyre!("{} '{}' is invalid: {}", key, raw, e)),
        None => Ok(default),
    }
}

pub fn load_templates(path: &Path) -> Result<Vec<FixedTrainingTime>> {
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read templates from {}", path.display()))?;
    let file = TemplateFile::from_json(&json)
        .wrap_err_with(|| format!("Invalid templates in {}", path.display()))?;
    Ok(file.fixed_training_times)
}
