use crate::shared::form::FormFields;
use serde::Deserialize;
use validator::Validate;

pub mod list_alerts {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    pub struct QueryParams {
        /// Id of the alert that was just created or updated
        #[serde(default)]
        pub saved: Option<String>,
    }
}

pub mod get_alert {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub alert_id: String,
    }
}

pub mod upsert_alert {
    use super::*;

    /// The alert form as submitted by the browser
    #[derive(Debug, Default, Clone, Validate)]
    pub struct RequestBody {
        #[validate(length(min = 2, message = "Alert ID should be a valid JSON property name"))]
        pub id: String,
        #[validate(length(min = 2, message = "Description must be at least 2 characters."))]
        pub description: String,
        #[validate(length(min = 1, message = "You have to select at least one item."))]
        pub events: Vec<String>,
        #[validate(length(min = 1, message = "You have to select at least one item."))]
        pub channels: Vec<String>,
        pub frequency: String,
        /// Recipients that should be subscribed after the submission
        pub recipients: Vec<String>,
        /// Recipients the caller explicitly asks to unsubscribe
        pub removed_recipients: Vec<String>,
        /// Recipients that were subscribed when the form was rendered
        pub initial_recipients: Vec<String>,
        /// Set by the edit form
        pub existing: bool,
    }

    impl RequestBody {
        pub fn from_form(body: &[u8]) -> Self {
            let form = FormFields::parse(body);
            Self {
                id: form.value("id"),
                description: form.value("description"),
                events: form.values("events"),
                channels: form.values("channels"),
                frequency: form.value("frequency"),
                recipients: form.values("recipients"),
                removed_recipients: form.values("removedRecipients"),
                initial_recipients: form.values("initialRecipients"),
                existing: form.value("existing") == "true",
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::upsert_alert::RequestBody;
    use validator::Validate;

    #[test]
    fn it_decodes_the_alert_form() {
        let body = RequestBody::from_form(
            b"id=Disk+Full&description=disk+usage&events=server%3Aalert&channels=email\
              &frequency=Weekly&recipients=user_1&initialRecipients=user_2",
        );
        assert_eq!(body.id, "Disk Full");
        assert_eq!(body.events, vec!["server:alert"]);
        assert_eq!(body.channels, vec!["email"]);
        assert_eq!(body.frequency, "Weekly");
        assert_eq!(body.recipients, vec!["user_1"]);
        assert!(body.removed_recipients.is_empty());
        assert_eq!(body.initial_recipients, vec!["user_2"]);
        assert!(!body.existing);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn it_rejects_short_fields_and_empty_sets() {
        let body = RequestBody::from_form(b"id=a&description=b&frequency=Daily");
        let errors = body.validate().expect_err("Form to be invalid");
        let fields = errors.field_errors();
        for field in &["id", "description", "events", "channels"] {
            assert!(fields.contains_key(field), "Missing error for {}", field);
        }
    }
}
