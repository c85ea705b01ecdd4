use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::errors::TurnResult;
use crate::models::message::Message;

/// An ordered conversation keyed by an opaque id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

impl Session {
    fn new(id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            message_count: self.messages.len(),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub message_count: usize,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

/// Storage for conversation histories
///
/// `save` replaces the stored sequence. Callers only ever pass a sequence that extends
/// what `load` returned, so a history grows and is never rewritten.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The stored history, empty for a session that has never completed a turn
    async fn load(&self, session_id: &str) -> TurnResult<Vec<Message>>;

    async fn save(&self, session_id: &str, messages: &[Message]) -> TurnResult<()>;

    /// Summaries of every known session, most recently updated first
    async fn list(&self) -> TurnResult<Vec<SessionSummary>>;
}

/// Process-lifetime store; everything is gone on exit
#[derive(Default)]
pub struct InMemoryStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn load(&self, session_id: &str) -> TurnResult<Vec<Message>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .map(|session| session.messages.clone())
            .unwrap_or_default())
    }

    async fn save(&self, session_id: &str, messages: &[Message]) -> TurnResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id));
        session.messages = messages.to_vec();
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn list(&self) -> TurnResult<Vec<SessionSummary>> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> =
            sessions.values().map(Session::summary).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_session_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.load("nobody").await.unwrap().is_empty());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = InMemoryStore::new();
        let messages = vec![
            Message::user().with_text("hello"),
            Message::assistant().with_text("hi"),
        ];

        store.save("s1", &messages).await.unwrap();

        assert_eq!(store.load("s1").await.unwrap(), messages);
        assert!(store.load("s2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_summaries() {
        let store = InMemoryStore::new();
        store
            .save("a", &[Message::user().with_text("one")])
            .await
            .unwrap();
        store
            .save(
                "b",
                &[
                    Message::user().with_text("two"),
                    Message::assistant().with_text("three"),
                ],
            )
            .await
            .unwrap();

        let summaries = store.list().await.unwrap();
        assert_eq!(summaries.len(), 2);

        let b = summaries.iter().find(|s| s.id == "b").unwrap();
        assert_eq!(b.message_count, 2);
    }

    #[tokio::test]
    async fn test_save_keeps_created_at() {
        let store = InMemoryStore::new();
        store
            .save("s1", &[Message::user().with_text("one")])
            .await
            .unwrap();
        let created = store.sessions.read().await["s1"].created_at;

        store
            .save(
                "s1",
                &[
                    Message::user().with_text("one"),
                    Message::assistant().with_text("two"),
                ],
            )
            .await
            .unwrap();

        let sessions = store.sessions.read().await;
        assert_eq!(sessions["s1"].created_at, created);
        assert!(sessions["s1"].updated_at >= created);
        assert_eq!(sessions["s1"].messages.len(), 2);
    }
}
