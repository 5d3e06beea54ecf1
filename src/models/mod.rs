use serde::{Deserialize, Serialize};

/// A single todo item as stored and as rendered over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: u64,
    pub title: String,
    pub completed: bool,
}
impl TodoItem {
    pub fn new(id: u64, title: String, completed: bool) -> Self {
        Self {
            id,
            title,
            completed,
        }
    }

    /// Storage key for the item with `id`.
    ///
    /// Zero padded so that key order matches id order when scanning.
    pub fn key(id: u64) -> String {
        format!("{}{:020}", Self::PREFIX, id)
    }

    pub const PREFIX: &'static str = "todo:";
}

/// Validated fields of a create or update request.
///
/// `None` means the field was not supplied; what that implies depends on
/// the verb (see [`TodoInput::apply`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoInput {
    pub title: Option<String>,
    pub completed: Option<bool>,
}
impl TodoInput {
    /// Overwrite the mutable fields of `item`.
    ///
    /// A full replace resets an omitted `completed` to `false`; a partial
    /// update leaves omitted fields untouched. The id never changes.
    pub fn apply(self, item: &mut TodoItem, partial: bool) {
        if let Some(title) = self.title {
            item.title = title;
        }
        match (self.completed, partial) {
            (Some(completed), _) => item.completed = completed,
            (None, false) => item.completed = false,
            (None, true) => {}
        }
    }
}
