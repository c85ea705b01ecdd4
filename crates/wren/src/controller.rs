use futures::TryStreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;

use crate::agent::{Agent, TurnState};
use crate::errors::{TurnError, TurnResult};
use crate::models::message::Message;
use crate::models::role::Role;
use crate::session::{SessionStore, SessionSummary};

/// The outcome of a completed turn
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// Text of the final assistant message
    pub reply: String,
    /// Everything the turn appended to the history, starting with the user message
    pub messages: Vec<Message>,
}

/// Runs conversational turns against session-keyed history.
///
/// Turns on the same session are serialized. A turn only touches the store once it has
/// succeeded, so a failed or cancelled turn leaves the history exactly as it was.
pub struct TurnController {
    agent: Agent,
    store: Arc<dyn SessionStore>,
    memory: bool,
    locks: Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl TurnController {
    pub fn new(agent: Agent, store: Arc<dyn SessionStore>) -> Self {
        Self {
            agent,
            store,
            memory: true,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// When memory is off the responder only sees the current turn, the store still records it
    pub fn with_memory(mut self, memory: bool) -> Self {
        self.memory = memory;
        self
    }

    pub fn memory(&self) -> bool {
        self.memory
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Submit user text to a session and return the assistant's reply
    pub async fn submit_turn(&self, session_id: &str, user_text: &str) -> TurnResult<String> {
        self.run_turn(session_id, user_text)
            .await
            .map(|turn| turn.reply)
    }

    /// Like `submit_turn`, also returning every message the turn appended
    pub async fn run_turn(&self, session_id: &str, user_text: &str) -> TurnResult<Turn> {
        if session_id.trim().is_empty() {
            return Err(TurnError::InvalidInput(
                "session id must not be empty".to_string(),
            ));
        }
        let text = user_text.trim();
        if text.is_empty() {
            return Err(TurnError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }

        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let history = self.store.load(session_id).await?;
        tracing::info!(
            session_id,
            history = history.len(),
            state = %TurnState::AwaitingUserInput,
            "starting turn"
        );

        let mut appended = vec![Message::user().with_text(text)];
        let context: Vec<Message> = if self.memory {
            history.iter().chain(appended.iter()).cloned().collect()
        } else {
            appended.clone()
        };

        match self.collect_reply(&context).await {
            Ok(produced) => appended.extend(produced),
            Err(e) => {
                tracing::warn!(session_id, error = %e, "turn failed, history left unchanged");
                return Err(e);
            }
        }

        let reply = match appended.last() {
            Some(last) if last.role == Role::Assistant && !last.has_tool_request() => last.text(),
            _ => {
                return Err(TurnError::Internal(
                    "turn ended without an assistant reply".to_string(),
                ))
            }
        };

        let mut updated = history;
        updated.extend(appended.iter().cloned());
        self.store.save(session_id, &updated).await?;
        tracing::info!(
            session_id,
            appended = appended.len(),
            state = %TurnState::AssistantReplied,
            "turn committed"
        );

        Ok(Turn {
            reply,
            messages: appended,
        })
    }

    pub async fn history(&self, session_id: &str) -> TurnResult<Vec<Message>> {
        self.store.load(session_id).await
    }

    pub async fn sessions(&self) -> TurnResult<Vec<SessionSummary>> {
        self.store.list().await
    }

    async fn collect_reply(&self, context: &[Message]) -> TurnResult<Vec<Message>> {
        let mut stream = self.agent.reply(context).await?;
        let mut produced = Vec::new();
        while let Some(message) = stream.try_next().await? {
            produced.push(message);
        }
        Ok(produced)
    }

    /// Entries die with the last turn holding them
    async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        if let Some(existing) = locks.get(session_id).and_then(Weak::upgrade) {
            return existing;
        }

        locks.retain(|_, weak| weak.strong_count() > 0);
        let lock = Arc::new(Mutex::new(()));
        locks.insert(session_id.to_string(), Arc::downgrade(&lock));
        lock
    }
}
