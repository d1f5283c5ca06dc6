//! In-memory sender sessions with expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use postmate_core::error::RepoError;
use postmate_core::ports::ConversationSessions;

const DEFAULT_TTL_MINUTES: u64 = 1440;

struct SessionEntry {
    post_id: Uuid,
    expires_at: Instant,
}

/// Sender → active post map held in process memory.
///
/// Note: Sessions are lost on process restart; the sender then has to start
/// a new post.
pub struct InMemoryConversationSessions {
    entries: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl InMemoryConversationSessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Reads `SESSION_TTL_MINUTES` (default one day).
    pub fn from_env() -> Self {
        let minutes = std::env::var("SESSION_TTL_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TTL_MINUTES);
        Self::new(Duration::from_secs(minutes * 60))
    }
}

impl Default for InMemoryConversationSessions {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_MINUTES * 60))
    }
}

/// Remove `sender`'s entry if it is still expired at `now`. A `bind` can
/// land between the read and write locks; that fresh entry is kept and
/// returned.
fn evict_expired(
    entries: &mut HashMap<String, SessionEntry>,
    sender: &str,
    now: Instant,
) -> Option<Uuid> {
    let entry = entries.get(sender)?;
    if now < entry.expires_at {
        return Some(entry.post_id);
    }
    entries.remove(sender);
    tracing::debug!(sender = %sender, "Conversation session expired");
    None
}

#[async_trait]
impl ConversationSessions for InMemoryConversationSessions {
    async fn bind(&self, sender: &str, post_id: Uuid) -> Result<(), RepoError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            sender.to_string(),
            SessionEntry {
                post_id,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn active(&self, sender: &str) -> Result<Option<Uuid>, RepoError> {
        let entries = self.entries.read().await;
        let Some(entry) = entries.get(sender) else {
            return Ok(None);
        };

        if Instant::now() < entry.expires_at {
            return Ok(Some(entry.post_id));
        }

        drop(entries);
        let mut entries = self.entries.write().await;
        Ok(evict_expired(&mut entries, sender, Instant::now()))
    }

    async fn clear(&self, sender: &str) -> Result<(), RepoError> {
        self.entries.write().await.remove(sender);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_and_active() {
        let sessions = InMemoryConversationSessions::default();
        let post_id = Uuid::new_v4();

        sessions.bind("alice", post_id).await.unwrap();

        assert_eq!(sessions.active("alice").await.unwrap(), Some(post_id));
        assert_eq!(sessions.active("bob").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rebind_replaces_post() {
        let sessions = InMemoryConversationSessions::default();
        let second = Uuid::new_v4();

        sessions.bind("alice", Uuid::new_v4()).await.unwrap();
        sessions.bind("alice", second).await.unwrap();

        assert_eq!(sessions.active("alice").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_clear() {
        let sessions = InMemoryConversationSessions::default();
        sessions.bind("alice", Uuid::new_v4()).await.unwrap();

        sessions.clear("alice").await.unwrap();

        assert_eq!(sessions.active("alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_eviction_keeps_entry_rebound_meanwhile() {
        let sessions = InMemoryConversationSessions::new(Duration::from_secs(60));
        let rebound = Uuid::new_v4();
        sessions.bind("alice", rebound).await.unwrap();

        let mut entries = sessions.entries.write().await;
        assert_eq!(evict_expired(&mut entries, "alice", Instant::now()), Some(rebound));
        assert!(entries.contains_key("alice"));

        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(evict_expired(&mut entries, "alice", later), None);
        assert!(!entries.contains_key("alice"));
        drop(entries);

        assert_eq!(sessions.active("alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session() {
        let sessions = InMemoryConversationSessions::new(Duration::ZERO);
        sessions.bind("alice", Uuid::new_v4()).await.unwrap();

        assert_eq!(sessions.active("alice").await.unwrap(), None);
    }
}
