use super::api::upsert_alert::RequestBody;
use alertdeck_domain::{slugify, AlertObject, Channel, EventType, Frequency, User};
use serde::Serialize;
use std::collections::BTreeMap;

/// Inline validation messages keyed by form field name
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Serialize, Clone)]
pub struct AlertDTO {
    pub id: String,
    pub name: String,
    pub description: String,
    pub events: Vec<String>,
    pub channels: Vec<String>,
    pub frequency: String,
}

impl AlertDTO {
    pub fn new(alert: AlertObject) -> Self {
        let props = alert.properties;
        Self {
            id: alert.id,
            name: props.name,
            description: props.description,
            events: props.events.iter().map(|e| e.to_string()).collect(),
            channels: props.channels.iter().map(|c| c.to_string()).collect(),
            frequency: props.frequency.to_string(),
        }
    }
}

/// A checkbox, radio button or select option
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OptionDTO {
    pub value: String,
    pub label: String,
    pub checked: bool,
}

impl OptionDTO {
    pub fn new<T: Into<String>>(value: T, label: T, checked: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            checked,
        }
    }
}

/// State of the create / edit alert form
#[derive(Debug, Serialize, Clone)]
pub struct AlertFormDTO {
    pub id: String,
    pub description: String,
    /// Whether the form edits an alert that already exists
    pub existing: bool,
    pub events: Vec<OptionDTO>,
    pub channels: Vec<OptionDTO>,
    pub frequencies: Vec<OptionDTO>,
    pub recipients: Vec<OptionDTO>,
    pub initial_recipients: Vec<String>,
    pub selected_recipient_count: usize,
    pub errors: FieldErrors,
}

/// Values currently chosen in the form, by their wire names
struct Selection<'a> {
    events: &'a [String],
    channels: &'a [String],
    frequency: &'a str,
    recipients: &'a [String],
}

impl AlertFormDTO {
    fn build(
        id: String,
        description: String,
        existing: bool,
        selection: Selection,
        initial_recipients: Vec<String>,
        users: &[User],
    ) -> Self {
        let events = EventType::ALL
            .iter()
            .map(|e| {
                let checked = selection.events.iter().any(|s| s == e.as_str());
                OptionDTO::new(e.as_str(), e.label(), checked)
            })
            .collect();
        let channels = Channel::ALL
            .iter()
            .map(|c| {
                let checked = selection.channels.iter().any(|s| s == c.as_str());
                OptionDTO::new(c.as_str(), c.label(), checked)
            })
            .collect();
        let frequencies = Frequency::ALL
            .iter()
            .map(|f| OptionDTO::new(f.as_str(), f.as_str(), f.as_str() == selection.frequency))
            .collect();

        let selected = selection.recipients;

        let mut recipients: Vec<OptionDTO> = users
            .iter()
            .map(|u| {
                OptionDTO::new(
                    u.id.as_str(),
                    u.display_label(),
                    selected.contains(&u.id),
                )
            })
            .collect();
        // Keep subscribers that are missing from the directory listing pickable
        for id in selected.iter().chain(initial_recipients.iter()) {
            if !recipients.iter().any(|r| &r.value == id) {
                recipients.push(OptionDTO::new(id.as_str(), id.as_str(), selected.contains(id)));
            }
        }

        Self {
            id,
            description,
            existing,
            events,
            channels,
            frequencies,
            selected_recipient_count: recipients.iter().filter(|r| r.checked).count(),
            recipients,
            initial_recipients,
            errors: FieldErrors::new(),
        }
    }

    /// Form for a new alert: everything subscribed, delivered immediately
    pub fn new_alert(default_id: String, users: &[User]) -> Self {
        let events: Vec<String> = EventType::ALL.iter().map(|e| e.to_string()).collect();
        let channels: Vec<String> = Channel::ALL.iter().map(|c| c.to_string()).collect();
        Self::build(
            default_id,
            String::new(),
            false,
            Selection {
                events: &events,
                channels: &channels,
                frequency: Frequency::Immediate.as_str(),
                recipients: &[],
            },
            Vec::new(),
            users,
        )
    }

    /// Form pre filled from a stored alert and its current subscribers
    pub fn edit(alert: &AlertObject, subscribers: Vec<String>, users: &[User]) -> Self {
        let props = &alert.properties;
        // Prefer the original free text when it still maps to this alert
        let id = if !props.name.is_empty() && slugify(&props.name) == alert.id {
            props.name.clone()
        } else {
            alert.id.clone()
        };
        let events: Vec<String> = props.events.iter().map(|e| e.to_string()).collect();
        let channels: Vec<String> = props.channels.iter().map(|c| c.to_string()).collect();
        Self::build(
            id,
            props.description.clone(),
            true,
            Selection {
                events: &events,
                channels: &channels,
                frequency: props.effective_frequency().as_str(),
                recipients: &subscribers,
            },
            subscribers.clone(),
            users,
        )
    }

    /// Form re rendered with the values of a rejected submission
    pub fn resubmit(body: &RequestBody, users: &[User], errors: FieldErrors) -> Self {
        let mut form = Self::build(
            body.id.clone(),
            body.description.clone(),
            body.existing,
            Selection {
                events: &body.events,
                channels: &body.channels,
                frequency: &body.frequency,
                recipients: &body.recipients,
            },
            body.initial_recipients.clone(),
            users,
        );
        form.errors = errors;
        form
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alertdeck_domain::AlertDraft;

    fn users() -> Vec<User> {
        let mut user = User::new("user_1");
        user.email = Some("ops@example.com".into());
        vec![user, User::new("user_2")]
    }

    #[test]
    fn new_alert_form_checks_everything() {
        let form = AlertFormDTO::new_alert("alert_1".into(), &users());
        assert!(form.events.iter().all(|e| e.checked));
        assert!(form.channels.iter().all(|c| c.checked));
        let checked: Vec<_> = form.frequencies.iter().filter(|f| f.checked).collect();
        assert_eq!(checked.len(), 1);
        assert_eq!(checked[0].value, "Immediately");
        assert_eq!(form.recipients[0].label, "ops@example.com");
        assert_eq!(form.selected_recipient_count, 0);
    }

    #[test]
    fn edit_form_uses_stored_values() {
        let alert = AlertDraft {
            name: "Disk Full".into(),
            description: "disk usage".into(),
            events: vec![EventType::ServerAlert],
            channels: vec![Channel::Email],
            frequency: Frequency::Weekly,
        }
        .into_object();

        let form = AlertFormDTO::edit(&alert, vec!["user_2".into(), "gone".into()], &users());
        assert_eq!(form.id, "Disk Full");
        assert!(form.existing);
        let checked_events: Vec<_> = form.events.iter().filter(|e| e.checked).map(|e| e.value.as_str()).collect();
        assert_eq!(checked_events, vec!["server:alert"]);
        assert!(form.frequencies.iter().any(|f| f.checked && f.value == "Weekly"));
        assert_eq!(form.initial_recipients, vec!["user_2", "gone"]);
        assert_eq!(form.selected_recipient_count, 2);
        assert!(form.recipients.iter().any(|r| r.value == "gone" && r.checked));
    }

    #[test]
    fn resubmitted_form_keeps_the_submitted_choices() {
        let body = RequestBody::from_form(
            b"id=Disk+Full&description=d&events=server%3Awarn&events=server%3Apanic&channels=sms\
              &frequency=Daily&recipients=user_2&initialRecipients=user_1",
        );
        let mut errors = FieldErrors::new();
        errors.insert("description".into(), "too short".into());

        let form = AlertFormDTO::resubmit(&body, &users(), errors);
        let checked = |options: &[OptionDTO]| -> Vec<String> {
            options.iter().filter(|o| o.checked).map(|o| o.value.clone()).collect()
        };
        assert_eq!(checked(&form.events), vec!["server:warn"]);
        assert_eq!(checked(&form.channels), vec!["sms"]);
        assert_eq!(checked(&form.frequencies), vec!["Daily"]);
        assert_eq!(checked(&form.recipients), vec!["user_2"]);
        assert_eq!(form.initial_recipients, vec!["user_1"]);
        assert_eq!(form.errors.len(), 1);
    }
}
