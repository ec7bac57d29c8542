use std::fmt;

use crate::constants::{STANDARD_GROUP_KEY, STANDARD_GROUP_NAME};

/// Stable identity of a conversation, assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    /// Department slug; `None` belongs to the standard group
    pub department: Option<String>,
    pub archived: bool,
    pub created_at: i64,
    pub updated_at: i64,
    /// Short preview of the latest message
    pub summary: Option<String>,
    pub message_count: u32,
}

impl Conversation {
    /// Key of the group this conversation is filed under.
    pub fn group_key(&self) -> &str {
        self.department.as_deref().unwrap_or(STANDARD_GROUP_KEY)
    }
}

/// Department metadata supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: String,
    pub slug: Option<String>,
    pub name: String,
}

impl Department {
    /// Group key: the slug, falling back to the id.
    pub fn key(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.id)
    }
}

/// Top-level filter above the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ConversationFilter {
    #[default]
    All,
    Archived,
    Department(String),
}

impl ConversationFilter {
    pub fn is_archived(&self) -> bool {
        matches!(self, Self::Archived)
    }

    pub fn label<'a>(&'a self, departments: &'a [Department]) -> std::borrow::Cow<'a, str> {
        match self {
            Self::All => "All".into(),
            Self::Archived => "Archived".into(),
            Self::Department(key) => department_display_name(key, departments),
        }
    }
}

/// Display name for a group key: the department name when known,
/// "Standard" for the default group, otherwise the capitalized slug.
pub fn department_display_name<'a>(
    key: &'a str,
    departments: &'a [Department],
) -> std::borrow::Cow<'a, str> {
    if let Some(dept) = departments.iter().find(|d| d.key() == key) {
        return dept.name.as_str().into();
    }
    if key == STANDARD_GROUP_KEY {
        return STANDARD_GROUP_NAME.into();
    }
    capitalize(key).into()
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
