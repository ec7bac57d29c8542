//! Department grouping of the visible conversation subset.
//!
//! Grouping is a pure function of (conversations, departments, filter, query)
//! and is recomputed whenever any of them changes. Per-group collapse state is
//! tracked separately in [`GroupExpansion`] so recomputation never loses it.

use std::collections::HashMap;

use super::filter::partition;
use super::types::{Conversation, ConversationFilter, Department, capitalize};
use crate::constants::{STANDARD_GROUP_KEY, STANDARD_GROUP_NAME};

#[derive(Debug, Clone)]
pub struct DepartmentGroup<'a> {
    pub key: String,
    pub name: String,
    pub conversations: Vec<&'a Conversation>,
}

impl DepartmentGroup<'_> {
    fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            conversations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }
}

/// Ordered key -> group map. Seeded groups keep department order; groups
/// synthesized for unknown slugs follow in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct DepartmentGroups<'a> {
    groups: Vec<DepartmentGroup<'a>>,
}

impl<'a> DepartmentGroups<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &DepartmentGroup<'a>> {
        self.groups.iter()
    }

    pub fn get(&self, key: &str) -> Option<&DepartmentGroup<'a>> {
        self.groups.iter().find(|g| g.key == key)
    }

    pub fn conversation_count(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    /// All conversations in group order, ignoring collapse state.
    pub fn flatten(&self) -> Vec<&'a Conversation> {
        self.groups
            .iter()
            .flat_map(|g| g.conversations.iter().copied())
            .collect()
    }

    fn get_or_insert(&mut self, key: &str) -> &mut DepartmentGroup<'a> {
        let idx = match self.groups.iter().position(|g| g.key == key) {
            Some(idx) => idx,
            None => {
                self.groups
                    .push(DepartmentGroup::new(key, &capitalize(key)));
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx]
    }
}

/// Partition, filter, and group conversations for display.
pub fn group_conversations<'a>(
    conversations: &'a [Conversation],
    departments: &[Department],
    filter: &ConversationFilter,
    query: &str,
) -> DepartmentGroups<'a> {
    let parts = partition(conversations, departments, query);
    let subset = if filter.is_archived() {
        parts.archived
    } else {
        parts.active
    };

    let mut groups = DepartmentGroups::default();
    if !departments.iter().any(|d| d.key() == STANDARD_GROUP_KEY) {
        groups
            .groups
            .push(DepartmentGroup::new(STANDARD_GROUP_KEY, STANDARD_GROUP_NAME));
    }
    for dept in departments {
        // Duplicate keys in department metadata collapse into the first entry
        if groups.get(dept.key()).is_none() {
            groups.groups.push(DepartmentGroup::new(dept.key(), &dept.name));
        }
    }

    for conv in subset {
        groups.get_or_insert(conv.group_key()).conversations.push(conv);
    }

    if let ConversationFilter::Department(key) = filter {
        groups.groups.retain(|g| &g.key == key);
    }

    groups
}

/// Per-group expand/collapse state. A group without an explicit toggle is
/// expanded exactly when it has conversations.
#[derive(Debug, Clone, Default)]
pub struct GroupExpansion {
    explicit: HashMap<String, bool>,
}

impl GroupExpansion {
    pub fn is_expanded(&self, group: &DepartmentGroup<'_>) -> bool {
        self.explicit
            .get(&group.key)
            .copied()
            .unwrap_or(!group.is_empty())
    }

    /// Flip the effective state and remember it explicitly.
    pub fn toggle(&mut self, group: &DepartmentGroup<'_>) -> bool {
        let expanded = !self.is_expanded(group);
        self.explicit.insert(group.key.clone(), expanded);
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::test_support::conversation;

    fn dept(id: &str, slug: Option<&str>, name: &str) -> Department {
        Department {
            id: id.to_string(),
            slug: slug.map(|s| s.to_string()),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_standard_group_always_exists() {
        let groups = group_conversations(&[], &[], &ConversationFilter::All, "");
        assert_eq!(groups.iter().count(), 1);
        let standard = groups.get(STANDARD_GROUP_KEY).unwrap();
        assert_eq!(standard.name, "Standard");
        assert!(standard.is_empty());
    }

    #[test]
    fn test_declared_standard_department_is_not_duplicated() {
        let depts = vec![dept("d0", Some("standard"), "General")];
        let groups = group_conversations(&[], &depts, &ConversationFilter::All, "");
        assert_eq!(groups.iter().count(), 1);
        assert_eq!(groups.get("standard").unwrap().name, "General");
    }

    #[test]
    fn test_seeded_groups_use_slug_then_id() {
        let depts = vec![
            dept("d1", Some("sales"), "Sales"),
            dept("d2", None, "Legal"),
        ];
        let convs = vec![
            conversation("1", "Deal", Some("sales")),
            conversation("2", "Contract", Some("d2")),
            conversation("3", "Hello", None),
        ];
        let groups = group_conversations(&convs, &depts, &ConversationFilter::All, "");
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["standard", "sales", "d2"]);
        assert_eq!(groups.get("d2").unwrap().conversations[0].title, "Contract");
        assert_eq!(groups.get("standard").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_slug_synthesizes_group() {
        let convs = vec![conversation("1", "Campaign", Some("marketing"))];
        let groups = group_conversations(&convs, &[], &ConversationFilter::All, "");
        let synthesized = groups.get("marketing").unwrap();
        assert_eq!(synthesized.name, "Marketing");
        assert_eq!(synthesized.len(), 1);
    }

    #[test]
    fn test_archived_filter_selects_archived_subset() {
        let mut old = conversation("2", "Old", None);
        old.archived = true;
        let convs = vec![conversation("1", "New", None), old];

        let active = group_conversations(&convs, &[], &ConversationFilter::All, "");
        assert_eq!(active.flatten().len(), 1);
        assert_eq!(active.flatten()[0].title, "New");

        let archived = group_conversations(&convs, &[], &ConversationFilter::Archived, "");
        assert_eq!(archived.flatten().len(), 1);
        assert_eq!(archived.flatten()[0].title, "Old");
    }

    #[test]
    fn test_department_filter_restricts_to_one_group() {
        let depts = vec![dept("d1", Some("sales"), "Sales")];
        let convs = vec![
            conversation("1", "Deal", Some("sales")),
            conversation("2", "Hello", None),
        ];
        let filter = ConversationFilter::Department("sales".to_string());
        let groups = group_conversations(&convs, &depts, &filter, "");
        assert_eq!(groups.iter().count(), 1);
        assert_eq!(groups.iter().next().unwrap().key, "sales");
        assert_eq!(groups.conversation_count(), 1);
    }

    #[test]
    fn test_search_query_narrows_groups() {
        let convs = vec![
            conversation("1", "Budget review", None),
            conversation("2", "Team lunch", None),
        ];
        let groups = group_conversations(&convs, &[], &ConversationFilter::All, "BUDGET");
        assert_eq!(groups.conversation_count(), 1);
    }

    #[test]
    fn test_group_expansion_defaults_and_explicit_toggle() {
        let convs = vec![conversation("1", "Deal", Some("sales"))];
        let groups = group_conversations(&convs, &[], &ConversationFilter::All, "");
        let standard = groups.get("standard").unwrap();
        let sales = groups.get("sales").unwrap();

        let mut expansion = GroupExpansion::default();
        assert!(!expansion.is_expanded(standard));
        assert!(expansion.is_expanded(sales));

        assert!(!expansion.toggle(sales));
        assert!(!expansion.is_expanded(sales));
        assert!(expansion.toggle(standard));
        assert!(expansion.is_expanded(standard));
    }

    #[test]
    fn test_explicit_toggle_wins_over_later_content() {
        let mut expansion = GroupExpansion::default();
        let empty = group_conversations(&[], &[], &ConversationFilter::All, "");
        // Expand the empty standard group explicitly, then collapse it
        expansion.toggle(empty.get("standard").unwrap());
        expansion.toggle(empty.get("standard").unwrap());

        let convs = vec![conversation("1", "Now has content", None)];
        let groups = group_conversations(&convs, &[], &ConversationFilter::All, "");
        assert!(!expansion.is_expanded(groups.get("standard").unwrap()));
    }
}
