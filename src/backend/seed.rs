//! Demo data for `chatrail seed`.

use anyhow::Result;

use super::store::ConversationStore;
use crate::conversation::{Conversation, ConversationId, Department};

const DEPARTMENTS: &[(&str, Option<&str>, &str)] = &[
    ("dept-sales", Some("sales"), "Sales"),
    ("dept-support", Some("support"), "Customer Support"),
    ("dept-eng", Some("engineering"), "Engineering"),
    // No slug: grouped under its id
    ("dept-legal", None, "Legal"),
];

const TOPICS: &[&str] = &[
    "Quarterly budget review",
    "Onboarding checklist",
    "Refund request follow-up",
    "Release notes draft",
    "Contract renewal terms",
    "Pricing page copy",
    "Incident postmortem",
    "Hiring plan",
    "Customer churn analysis",
    "API rate limits",
    "Office move logistics",
    "Partnership proposal",
];

/// Slugs assigned round-robin. `marketing` has no department entry and
/// shows up as a synthesized group.
const ASSIGNMENTS: &[Option<&str>] = &[
    None,
    Some("sales"),
    Some("support"),
    Some("engineering"),
    Some("dept-legal"),
    Some("marketing"),
];

impl ConversationStore {
    /// Insert departments and `count` conversations. Returns the number of
    /// conversations written.
    pub async fn seed_demo(&self, count: usize) -> Result<usize> {
        for (position, (id, slug, name)) in DEPARTMENTS.iter().enumerate() {
            let department = Department {
                id: id.to_string(),
                slug: slug.map(|s| s.to_string()),
                name: name.to_string(),
            };
            self.insert_department(&department, position as i64).await?;
        }

        let now = chrono::Utc::now().timestamp();
        for i in 0..count {
            let topic = TOPICS[i % TOPICS.len()];
            let round = i / TOPICS.len();
            let title = if round == 0 {
                topic.to_string()
            } else {
                format!("{} ({})", topic, round + 1)
            };
            let conversation = Conversation {
                id: ConversationId(format!("demo-{:04}", i)),
                title,
                department: ASSIGNMENTS[i % ASSIGNMENTS.len()].map(|s| s.to_string()),
                archived: i % 7 == 6,
                created_at: now - (i as i64 + 1) * 3600,
                updated_at: now - i as i64 * 1800,
                summary: Some(format!("Latest message about {}", topic.to_lowercase())),
                message_count: (i as u32 * 7) % 40 + 1,
            };
            self.insert_conversation(&conversation).await?;
        }

        tracing::info!(
            "Seeded {} departments and {} conversations",
            DEPARTMENTS.len(),
            count
        );
        Ok(count)
    }
}
