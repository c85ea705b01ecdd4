use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, Usage};

/// A scripted reply for the mock provider
pub enum MockReply {
    Message(Message),
    Error(String),
    /// Wait before replying with the message, to exercise timeouts and locking
    Delayed(Duration, Message),
}

/// A mock provider that returns pre-configured responses for testing
///
/// Every call records the messages it was given so tests can check what the model saw.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<MockReply>>>,
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self::scripted(responses.into_iter().map(MockReply::Message).collect())
    }

    pub fn scripted(responses: Vec<MockReply>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The message history passed to each call so far
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system_prompt: &str,
        messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let next = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                None
            } else {
                Some(responses.remove(0))
            }
        };

        match next {
            // Return empty response if no more pre-configured responses
            None => Ok((Message::assistant().with_text(""), Usage::default())),
            Some(MockReply::Message(message)) => Ok((message, Usage::default())),
            Some(MockReply::Error(error)) => Err(anyhow!(error)),
            Some(MockReply::Delayed(delay, message)) => {
                tokio::time::sleep(delay).await;
                Ok((message, Usage::default()))
            }
        }
    }
}
