use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::errors::{RollcallError, RollcallResult};

/// Recurring weekly event definition.
///
/// `week_day` counts from Sunday (0) to Saturday (6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedTrainingTime {
    pub week_day: u32,
    pub start_time_hours: u32,
    pub start_time_minutes: u32,
    pub end_time_hours: u32,
    pub end_time_minutes: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

impl FixedTrainingTime {
    pub fn weekday(&self) -> Option<Weekday> {
        match self.week_day {
            0 => Some(Weekday::Sun),
            1 => Some(Weekday::Mon),
            2 => Some(Weekday::Tue),
            3 => Some(Weekday::Wed),
            4 => Some(Weekday::Thu),
            5 => Some(Weekday::Fri),
            6 => Some(Weekday::Sat),
            _ => None,
        }
    }

    pub fn validate(&self) -> RollcallResult<()> {
        if self.name.trim().is_empty() {
            return Err(RollcallError::Validation(
                "template name must not be empty".to_string(),
            ));
        }
        if self.weekday().is_none() {
            return Err(RollcallError::Validation(format!(
                "template '{}': weekDay {} is outside 0..=6",
                self.name, self.week_day
            )));
        }
        if self.start_time_hours > 23 || self.end_time_hours > 23 {
            return Err(RollcallError::Validation(format!(
                "template '{}': hours must be within 0..=23",
                self.name
            )));
        }
        if self.start_time_minutes > 59 || self.end_time_minutes > 59 {
            return Err(RollcallError::Validation(format!(
                "template '{}': minutes must be within 0..=59",
                self.name
            )));
        }
        let start = self.start_time_hours * 60 + self.start_time_minutes;
        let end = self.end_time_hours * 60 + self.end_time_minutes;
        if end <= start {
            return Err(RollcallError::Validation(format!(
                "template '{}': end time must be after start time",
                self.name
            )));
        }
        Ok(())
    }
}

/// On-disk template file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFile {
    #[serde(default)]
    pub fixed_training_times: Vec<FixedTrainingTime>,
}

impl TemplateFile {
    pub fn from_json(json: &str) -> RollcallResult<Self> {
        let file: TemplateFile = serde_json::from_str(json)
            .map_err(|e| RollcallError::Validation(format!("invalid template file: {}", e)))?;
        for template in &file.fixed_training_times {
            template.validate()?;
        }
        Ok(file)
    }
}
