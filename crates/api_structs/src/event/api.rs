use crate::shared::form::FormFields;
use validator::Validate;

pub mod test_alert_event {
    use super::*;

    #[derive(Debug, Default, Clone, Validate)]
    pub struct RequestBody {
        #[validate(length(min = 2, message = "Select an alert to send a test event."))]
        pub alert_id: String,
        #[validate(required(message = "You need to select a notification type."))]
        pub event_type: Option<String>,
    }

    impl RequestBody {
        pub fn from_form(body: &[u8]) -> Self {
            let form = FormFields::parse(body);
            Self {
                alert_id: form.value("alertId"),
                event_type: form.optional("eventType"),
            }
        }
    }
}
