use serde::Serialize;

/// Subscription changes to apply to an alert.
///
/// Both lists are supplied by the caller and applied as given: `removed` is
/// detached first, then `recipients` is attached. An id present in both lists
/// therefore ends up subscribed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipientChanges {
    /// Desired recipients, attached after the removals
    pub recipients: Vec<String>,
    /// Recipients to detach
    pub removed: Vec<String>,
}

impl RecipientChanges {
    pub fn new(recipients: Vec<String>, removed: Vec<String>) -> Self {
        Self {
            recipients: dedup(recipients),
            removed: dedup(removed),
        }
    }

    /// Builds the changes from a recipient picker.
    ///
    /// `initial` holds the recipients that were subscribed when the picker was
    /// rendered. Every one of them that is no longer selected is removed, in
    /// addition to the ids the caller explicitly asked to remove.
    pub fn from_selection(selected: Vec<String>, initial: &[String], explicit: Vec<String>) -> Self {
        let mut removed: Vec<String> = initial
            .iter()
            .filter(|id| !selected.contains(id))
            .cloned()
            .collect();
        removed.extend(explicit);
        Self::new(selected, removed)
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty() && self.removed.is_empty()
    }
}

/// A workflow recipient. Objects receive notifications on behalf of their
/// subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Recipient {
    User(String),
    Object { id: String, collection: String },
}

fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !id.is_empty() && !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}
