pub mod filter;
pub mod group;
pub mod types;

pub use group::{DepartmentGroups, GroupExpansion, group_conversations};
pub use types::{
    Conversation, ConversationFilter, ConversationId, Department, department_display_name,
};

#[cfg(test)]
pub(crate) mod test_support {
    use super::{Conversation, ConversationId};

    pub fn conversation(id: &str, title: &str, department: Option<&str>) -> Conversation {
        Conversation {
            id: ConversationId::from(id),
            title: title.to_string(),
            department: department.map(|s| s.to_string()),
            archived: false,
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
            summary: None,
            message_count: 0,
        }
    }

    pub fn conversations(n: usize) -> Vec<Conversation> {
        (0..n)
            .map(|i| conversation(&format!("c{}", i), &format!("Conversation {}", i), None))
            .collect()
    }
}
