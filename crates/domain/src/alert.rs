use crate::{
    batch_window::{
        deserialize_lenient_frequency, deserialize_lenient_window, BatchWindow, Frequency,
    },
    slug::slugify,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Event types an alert can subscribe to and that can be sent as test events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "server:info")]
    ServerInfo,
    #[serde(rename = "server:warn")]
    ServerWarn,
    #[serde(rename = "server:alert")]
    ServerAlert,
}

impl EventType {
    pub const ALL: [EventType; 3] = [Self::ServerInfo, Self::ServerWarn, Self::ServerAlert];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServerInfo => "server:info",
            Self::ServerWarn => "server:warn",
            Self::ServerAlert => "server:alert",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ServerInfo => "Server info",
            Self::ServerWarn => "Server warning",
            Self::ServerAlert => "Server alert",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown event type: {0}")]
pub struct InvalidEventTypeError(pub String);

impl FromStr for EventType {
    type Err = InvalidEventTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|e| e.as_str() == s)
            .copied()
            .ok_or_else(|| InvalidEventTypeError(s.to_string()))
    }
}

/// Delivery channels configured on the notification workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "sms")]
    Sms,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "in-app")]
    InApp,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Self::Sms, Self::Email, Self::InApp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Email => "email",
            Self::InApp => "in-app",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sms => "SMS",
            Self::Email => "Email",
            Self::InApp => "In-App",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown channel: {0}")]
pub struct InvalidChannelError(pub String);

impl FromStr for Channel {
    type Err = InvalidChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| InvalidChannelError(s.to_string()))
    }
}

/// The properties stored on an alert object.
///
/// Other tools write to the same collection, so decoding never rejects an
/// object: unknown tags are skipped and unreadable values fall back to their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProperties {
    /// The free text identifier the alert was created with
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lenient_text")]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_known_tags")]
    pub events: Vec<EventType>,
    #[serde(default, deserialize_with = "deserialize_known_tags")]
    pub channels: Vec<Channel>,
    #[serde(default, deserialize_with = "deserialize_lenient_window")]
    pub batch_window: Option<BatchWindow>,
    #[serde(default, deserialize_with = "deserialize_lenient_frequency")]
    pub frequency: Frequency,
}

fn deserialize_lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

/// Keeps the tags this dashboard knows about and skips the rest
fn deserialize_known_tags<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(tags) => tags
            .iter()
            .filter_map(|tag| tag.as_str()?.parse().ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Error, Debug)]
#[error("Alert properties are malformed: {0}")]
pub struct MalformedAlertError(#[from] serde_json::Error);

impl AlertProperties {
    pub fn from_json(properties: &Map<String, Value>) -> Result<Self, MalformedAlertError> {
        Ok(serde_json::from_value(Value::Object(properties.clone()))?)
    }

    pub fn to_json(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct with named fields always serializes to an object
            _ => Map::new(),
        }
    }

    /// The frequency the edit form starts out with. It is derived from the
    /// stored batch window rather than the stored frequency, as the window is
    /// what the platform actually acts on.
    pub fn effective_frequency(&self) -> Frequency {
        Frequency::from_batch_window(self.batch_window.as_ref())
    }
}

/// An alert as stored in the platform's alert collection
#[derive(Debug, Clone, PartialEq)]
pub struct AlertObject {
    pub id: String,
    pub properties: AlertProperties,
}

/// A validated alert submitted by an operator, before it is written
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub name: String,
    pub description: String,
    pub events: Vec<EventType>,
    pub channels: Vec<Channel>,
    pub frequency: Frequency,
}

impl AlertDraft {
    /// The key the alert is stored under
    pub fn object_id(&self) -> String {
        slugify(&self.name)
    }

    /// Properties to write, with the batch window derived from the frequency
    pub fn properties(&self) -> AlertProperties {
        AlertProperties {
            name: self.name.clone(),
            description: self.description.clone(),
            events: self.events.clone(),
            channels: self.channels.clone(),
            batch_window: self.frequency.batch_window(),
            frequency: self.frequency,
        }
    }

    pub fn into_object(self) -> AlertObject {
        AlertObject {
            id: self.object_id(),
            properties: self.properties(),
        }
    }
}
