use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Hour of day (UTC) at which batched notifications are flushed
pub const BATCH_HOUR: u8 = 14;

/// How often subscribers of an alert receive its notifications.
///
/// This is the value an operator picks in the alert form. The platform only
/// understands [`BatchWindow`]s, so the frequency is stored next to the window
/// it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    #[serde(rename = "Immediately", alias = "Immediate")]
    Immediate,
    Daily,
    Weekly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Immediate, Frequency::Daily, Frequency::Weekly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "Immediately",
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
        }
    }

    /// The batch window to store for this frequency. `None` means notifications
    /// are delivered as soon as they are triggered.
    pub fn batch_window(&self) -> Option<BatchWindow> {
        match self {
            Self::Immediate => None,
            Self::Daily => Some(BatchWindow {
                cadence: Cadence::Daily,
                days: BatchDays::Preset(DayPreset::Weekdays),
                hour: BATCH_HOUR,
            }),
            Self::Weekly => Some(BatchWindow {
                cadence: Cadence::Weekly,
                days: BatchDays::On(vec![Weekday::Fri]),
                hour: BATCH_HOUR,
            }),
        }
    }

    /// Recovers the frequency from a stored batch window. Only the cadence is
    /// looked at and anything that is not daily or weekly is immediate.
    pub fn from_batch_window(window: Option<&BatchWindow>) -> Self {
        match window.map(|w| &w.cadence) {
            Some(Cadence::Daily) => Self::Daily,
            Some(Cadence::Weekly) => Self::Weekly,
            Some(Cadence::Other) | None => Self::Immediate,
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Self::Immediate
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Frequency: {0} is not one of Immediately, Daily or Weekly")]
pub struct InvalidFrequencyError(pub String);

impl FromStr for Frequency {
    type Err = InvalidFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Immediately" | "Immediate" => Ok(Self::Immediate),
            "Daily" => Ok(Self::Daily),
            "Weekly" => Ok(Self::Weekly),
            _ => Err(InvalidFrequencyError(s.to_string())),
        }
    }
}

/// Delivery timing understood by the notification platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchWindow {
    #[serde(rename = "frequency")]
    pub cadence: Cadence,
    #[serde(default)]
    pub days: BatchDays,
    #[serde(rename = "hours", default = "default_batch_hour")]
    pub hour: u8,
}

fn default_batch_hour() -> u8 {
    BATCH_HOUR
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    /// Cadences written by other tools, e.g. `monthly`
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchDays {
    Preset(DayPreset),
    On(Vec<Weekday>),
}

impl Default for BatchDays {
    fn default() -> Self {
        Self::On(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPreset {
    Weekdays,
    Weekends,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

/// Reads an optional batch window and treats anything undecodable as absent
pub(crate) fn deserialize_lenient_window<'de, D>(
    deserializer: D,
) -> Result<Option<BatchWindow>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Reads a stored frequency, falling back to immediate delivery for missing,
/// null or unknown values
pub(crate) fn deserialize_lenient_frequency<'de, D>(deserializer: D) -> Result<Frequency, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}
