mod alert;
mod batch_window;
mod recipients;
mod slug;
mod user;

pub use alert::{
    AlertDraft, AlertObject, AlertProperties, Channel, EventType, InvalidChannelError,
    InvalidEventTypeError, MalformedAlertError,
};
pub use batch_window::{
    BatchDays, BatchWindow, Cadence, DayPreset, Frequency, InvalidFrequencyError, Weekday,
    BATCH_HOUR,
};
pub use recipients::{Recipient, RecipientChanges};
pub use slug::slugify;
pub use user::User;
