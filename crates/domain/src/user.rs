use serde::{Deserialize, Serialize};

/// A user in the notification platform's directory. Users are managed on the
/// platform itself and only read here to pick alert recipients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }

    /// How the user is shown in the recipient picker
    pub fn display_label(&self) -> &str {
        match &self.email {
            Some(email) if !email.is_empty() => email,
            _ => &self.id,
        }
    }
}
