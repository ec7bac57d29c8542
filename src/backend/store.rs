//! SQLite-backed conversation store.
//!
//! Stands in for the remote conversation service: listing, search,
//! mutations, and the durable key-value preferences table.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::constants::STANDARD_GROUP_NAME;
use crate::conversation::{Conversation, ConversationId, Department};

/// Connection pool size - the actor runs each command on its own task
const POOL_SIZE: u32 = 4;

const CONVERSATION_COLUMNS: &str =
    "id, title, department, archived, created_at, updated_at, summary, message_count";

fn row_to_conversation(row: SqliteRow) -> Conversation {
    Conversation {
        id: ConversationId(row.get("id")),
        title: row.get("title"),
        department: row.get("department"),
        archived: row.get("archived"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        summary: row.get("summary"),
        message_count: row.get::<i64, _>("message_count") as u32,
    }
}

/// Escape LIKE wildcards so user text matches literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn new_conversation_id() -> Result<ConversationId> {
    let mut bytes = [0u8; 8];
    getrandom::fill(&mut bytes).map_err(|e| anyhow::anyhow!("Failed to generate id: {}", e))?;
    Ok(ConversationId(format!("conv-{:016x}", u64::from_le_bytes(bytes))))
}

#[derive(Clone)]
pub struct ConversationStore {
    pool: SqlitePool,
}

impl ConversationStore {
    pub async fn open(path: &Path) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(POOL_SIZE)
            .connect_with(options)
            .await
            .context("Failed to create connection pool")?;

        Self::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to create in-memory connection pool")?;

        Self::init_schema(&pool).await?;
        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS departments (
                id TEXT PRIMARY KEY,
                slug TEXT,
                name TEXT NOT NULL,
                position INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS conversations (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                department TEXT,
                archived INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                summary TEXT,
                message_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_conversations_updated
                ON conversations(updated_at DESC);

            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to initialize schema")?;
        Ok(())
    }

    /// Newest conversations first. The flag reports whether more exist
    /// beyond `limit`.
    pub async fn list_conversations(&self, limit: usize) -> Result<(Vec<Conversation>, bool)> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM conversations ORDER BY updated_at DESC, id LIMIT ?",
            CONVERSATION_COLUMNS
        ))
        .bind(limit as i64 + 1)
        .fetch_all(&self.pool)
        .await?;

        let has_more = rows.len() > limit;
        let conversations = rows
            .into_iter()
            .take(limit)
            .map(row_to_conversation)
            .collect();
        Ok((conversations, has_more))
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>> {
        let rows = sqlx::query("SELECT id, slug, name FROM departments ORDER BY position, name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| Department {
                id: row.get("id"),
                slug: row.get("slug"),
                name: row.get("name"),
            })
            .collect())
    }

    #[cfg(test)]
    pub async fn get_conversation(&self, id: &ConversationId) -> Result<Option<Conversation>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM conversations WHERE id = ?",
            CONVERSATION_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_conversation))
    }

    /// Case-insensitive substring search over title, summary and the
    /// department label shown in the list. An empty query returns the
    /// unfiltered list.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Conversation>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(self.list_conversations(limit).await?.0);
        }
        let pattern = like_pattern(query);
        let standard_matches = STANDARD_GROUP_NAME
            .to_lowercase()
            .contains(&query.to_lowercase());
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM conversations
            WHERE title LIKE ?1 ESCAPE '\'
               OR summary LIKE ?1 ESCAPE '\'
               OR department LIKE ?1 ESCAPE '\'
               OR department IN (
                   SELECT COALESCE(slug, id) FROM departments
                   WHERE name LIKE ?1 ESCAPE '\'
               )
               OR (department IS NULL AND ?2)
            ORDER BY updated_at DESC, id
            LIMIT ?3
            "#,
            CONVERSATION_COLUMNS
        ))
        .bind(&pattern)
        .bind(standard_matches)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_conversation).collect())
    }

    pub async fn insert_conversation(&self, conversation: &Conversation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO conversations
            (id, title, department, archived, created_at, updated_at, summary, message_count)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(conversation.id.as_str())
        .bind(&conversation.title)
        .bind(&conversation.department)
        .bind(conversation.archived)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .bind(&conversation.summary)
        .bind(conversation.message_count as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_department(&self, department: &Department, position: i64) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO departments (id, slug, name, position) VALUES (?, ?, ?, ?)",
        )
        .bind(&department.id)
        .bind(&department.slug)
        .bind(&department.name)
        .bind(position)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Create an empty conversation in the standard group.
    pub async fn create_conversation(&self) -> Result<Conversation> {
        let now = chrono::Utc::now().timestamp();
        let conversation = Conversation {
            id: new_conversation_id()?,
            title: "New conversation".to_string(),
            department: None,
            archived: false,
            created_at: now,
            updated_at: now,
            summary: None,
            message_count: 0,
        };
        self.insert_conversation(&conversation).await?;
        Ok(conversation)
    }

    /// Returns false if no such conversation exists.
    pub async fn delete_conversation(&self, id: &ConversationId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all `ids` in one transaction. Returns the ids that existed.
    pub async fn bulk_delete(&self, ids: &[ConversationId]) -> Result<Vec<ConversationId>> {
        let mut tx = self.pool.begin().await?;
        let mut deleted = Vec::with_capacity(ids.len());
        for id in ids {
            let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
                .bind(id.as_str())
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() > 0 {
                deleted.push(id.clone());
            }
        }
        tx.commit().await?;
        Ok(deleted)
    }

    /// Returns false if no such conversation exists.
    pub async fn rename(&self, id: &ConversationId, title: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE conversations SET title = ?, updated_at = ? WHERE id = ?")
            .bind(title)
            .bind(chrono::Utc::now().timestamp())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a conversation to `slug`. Returns false if no such conversation exists.
    pub async fn update_department(&self, id: &ConversationId, slug: Option<&str>) -> Result<bool> {
        let result = sqlx::query("UPDATE conversations SET department = ? WHERE id = ?")
            .bind(slug)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    pub async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO preferences (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_bool_preference(&self, key: &str) -> Result<bool> {
        Ok(self
            .get_preference(key)
            .await?
            .is_some_and(|v| v == "true"))
    }

    pub async fn set_bool_preference(&self, key: &str, value: bool) -> Result<()> {
        self.set_preference(key, if value { "true" } else { "false" })
            .await
    }

    pub async fn conversation_count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM conversations")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("n") as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::test_support::conversation;

    async fn store_with(convs: &[Conversation]) -> ConversationStore {
        let store = ConversationStore::open_in_memory().await.unwrap();
        for conv in convs {
            store.insert_conversation(conv).await.unwrap();
        }
        store
    }

    fn at(mut conv: Conversation, updated_at: i64) -> Conversation {
        conv.updated_at = updated_at;
        conv
    }

    #[tokio::test]
    async fn test_list_newest_first_with_has_more() {
        let store = store_with(&[
            at(conversation("a", "Oldest", None), 1),
            at(conversation("b", "Middle", None), 2),
            at(conversation("c", "Newest", None), 3),
        ])
        .await;

        let (page, has_more) = store.list_conversations(2).await.unwrap();
        let titles: Vec<_> = page.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Middle"]);
        assert!(has_more);

        let (all, has_more) = store.list_conversations(10).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(!has_more);
    }

    #[tokio::test]
    async fn test_search_matches_title_and_summary_case_insensitively() {
        let mut with_summary = conversation("b", "Weekly sync", None);
        with_summary.summary = Some("Discussed the BUDGET".to_string());
        let store = store_with(&[conversation("a", "Budget review", None), with_summary]).await;
        store
            .insert_conversation(&conversation("c", "Lunch", None))
            .await
            .unwrap();

        let results = store.search("budget", 50).await.unwrap();
        assert_eq!(results.len(), 2);

        let everything = store.search("  ", 50).await.unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn test_search_matches_department_label() {
        let store = store_with(&[
            conversation("a", "Deal", Some("sales")),
            conversation("b", "Lunch", None),
            conversation("c", "Contract", Some("legal")),
        ])
        .await;
        let sales = Department {
            id: "d1".to_string(),
            slug: Some("sales".to_string()),
            name: "Sales Team".to_string(),
        };
        store.insert_department(&sales, 0).await.unwrap();

        let by_name = store.search("team", 50).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id.as_str(), "a");

        // Unknown keys are labelled with the key itself
        let by_key = store.search("LEG", 50).await.unwrap();
        assert_eq!(by_key.len(), 1);
        assert_eq!(by_key[0].id.as_str(), "c");

        let standard = store.search("stand", 50).await.unwrap();
        assert_eq!(standard.len(), 1);
        assert_eq!(standard[0].id.as_str(), "b");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let store = store_with(&[
            conversation("a", "100% done", None),
            conversation("b", "1000 items", None),
        ])
        .await;
        let results = store.search("0%", 50).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_mutations_report_missing_rows() {
        let store = store_with(&[conversation("a", "Title", None)]).await;
        let missing = ConversationId::from("nope");

        assert!(store.rename(&ConversationId::from("a"), "Renamed").await.unwrap());
        assert!(!store.rename(&missing, "x").await.unwrap());
        assert!(!store.update_department(&missing, Some("sales")).await.unwrap());
        assert!(!store.delete_conversation(&missing).await.unwrap());

        let renamed = store
            .get_conversation(&ConversationId::from("a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.title, "Renamed");
    }

    #[tokio::test]
    async fn test_update_department_round_trip() {
        let store = store_with(&[conversation("a", "Deal", None)]).await;
        let id = ConversationId::from("a");
        store.update_department(&id, Some("sales")).await.unwrap();
        let conv = store.get_conversation(&id).await.unwrap().unwrap();
        assert_eq!(conv.department.as_deref(), Some("sales"));

        store.update_department(&id, None).await.unwrap();
        let conv = store.get_conversation(&id).await.unwrap().unwrap();
        assert_eq!(conv.department, None);
    }

    #[tokio::test]
    async fn test_bulk_delete_returns_existing_ids() {
        let store = store_with(&[
            conversation("a", "A", None),
            conversation("b", "B", None),
            conversation("c", "C", None),
        ])
        .await;
        let deleted = store
            .bulk_delete(&[
                ConversationId::from("a"),
                ConversationId::from("missing"),
                ConversationId::from("c"),
            ])
            .await
            .unwrap();
        assert_eq!(deleted, vec![ConversationId::from("a"), ConversationId::from("c")]);
        assert_eq!(store.conversation_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_conversation_is_listed() {
        let store = ConversationStore::open_in_memory().await.unwrap();
        let created = store.create_conversation().await.unwrap();
        assert!(created.id.as_str().starts_with("conv-"));
        let (list, _) = store.list_conversations(10).await.unwrap();
        assert_eq!(list, vec![created]);
    }

    #[tokio::test]
    async fn test_departments_keep_position_order() {
        let store = ConversationStore::open_in_memory().await.unwrap();
        let legal = Department {
            id: "d2".to_string(),
            slug: None,
            name: "Legal".to_string(),
        };
        let sales = Department {
            id: "d1".to_string(),
            slug: Some("sales".to_string()),
            name: "Sales".to_string(),
        };
        store.insert_department(&legal, 1).await.unwrap();
        store.insert_department(&sales, 0).await.unwrap();
        assert_eq!(store.list_departments().await.unwrap(), vec![sales, legal]);
    }

    #[tokio::test]
    async fn test_bool_preference_persists() {
        let store = ConversationStore::open_in_memory().await.unwrap();
        assert!(!store.get_bool_preference("panel.pinned").await.unwrap());
        store.set_bool_preference("panel.pinned", true).await.unwrap();
        assert!(store.get_bool_preference("panel.pinned").await.unwrap());
        store.set_bool_preference("panel.pinned", false).await.unwrap();
        assert_eq!(
            store.get_preference("panel.pinned").await.unwrap().as_deref(),
            Some("false")
        );
    }
}
