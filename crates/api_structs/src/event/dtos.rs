use crate::dtos::{FieldErrors, OptionDTO};
use alertdeck_domain::{AlertObject, EventType};
use serde::Serialize;

/// Confirmation shown after a test event was sent
#[derive(Debug, Serialize, Clone)]
pub struct SentEventDTO {
    pub alert_id: String,
    pub event: String,
    pub workflow_run_id: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct TestEventFormDTO {
    pub alerts: Vec<OptionDTO>,
    pub event_types: Vec<OptionDTO>,
    pub errors: FieldErrors,
    pub sent: Option<SentEventDTO>,
}

impl TestEventFormDTO {
    pub fn new(alerts: &[AlertObject], alert_id: Option<&str>, event_type: Option<&str>) -> Self {
        let alerts = alerts
            .iter()
            .map(|a| {
                OptionDTO::new(
                    a.id.clone(),
                    format!("{} | {}", a.properties.description, a.id),
                    alert_id == Some(a.id.as_str()),
                )
            })
            .collect();
        let event_types = EventType::ALL
            .iter()
            .map(|e| {
                OptionDTO::new(
                    e.as_str().to_string(),
                    format!("{} ({})", e.label(), e.as_str()),
                    event_type == Some(e.as_str()),
                )
            })
            .collect();

        Self {
            alerts,
            event_types,
            errors: FieldErrors::new(),
            sent: None,
        }
    }
}
