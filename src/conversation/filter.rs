//! Local substring filter applied on top of whatever collection is loaded.
//!
//! Runs on every keystroke (no debounce) and narrows remote search results
//! further, so the list never shows rows that visibly fail to match.

use aho_corasick::AhoCorasick;

use super::types::{Conversation, Department, department_display_name};

/// Case-insensitive matcher over conversation title and department label.
pub struct LocalFilter {
    matcher: Option<AhoCorasick>,
}

impl LocalFilter {
    pub fn new(query: &str) -> Self {
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() {
            return Self { matcher: None };
        }
        // A single literal pattern always builds; fall back to no filtering if not
        let matcher = match AhoCorasick::new([&query_lower]) {
            Ok(ac) => Some(ac),
            Err(e) => {
                tracing::warn!("Failed to build search matcher for '{}': {}", query, e);
                None
            }
        };
        Self { matcher }
    }

    pub fn is_active(&self) -> bool {
        self.matcher.is_some()
    }

    pub fn matches(&self, conversation: &Conversation, departments: &[Department]) -> bool {
        let Some(ac) = &self.matcher else {
            return true;
        };
        if ac.is_match(&conversation.title.to_lowercase()) {
            return true;
        }
        let label = department_display_name(conversation.group_key(), departments);
        ac.is_match(&label.to_lowercase())
    }
}

/// Conversations split by archived flag, after local filtering.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    pub active: Vec<&'a Conversation>,
    pub archived: Vec<&'a Conversation>,
}

pub fn partition<'a>(
    conversations: &'a [Conversation],
    departments: &[Department],
    query: &str,
) -> Partition<'a> {
    let filter = LocalFilter::new(query);
    let mut out = Partition::default();
    for conv in conversations {
        if filter.is_active() && !filter.matches(conv, departments) {
            continue;
        }
        if conv.archived {
            out.archived.push(conv);
        } else {
            out.active.push(conv);
        }
    }
    out
}
