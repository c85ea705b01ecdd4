use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use wren::models::message::Message;
use wren::models::tool::{Tool, ToolCall};
use wren::providers::base::{Provider, Usage};

/// Scripted responder for the session tests. The one in the wren crate is only built for its
/// own tests, so this keeps a small copy.
#[derive(Clone)]
pub struct StubProvider {
    replies: Arc<Mutex<VecDeque<Result<Message, String>>>>,
    calls: Arc<Mutex<usize>>,
}

impl StubProvider {
    pub fn replies(replies: Vec<&str>) -> Self {
        Self::scripted(replies.into_iter().map(text_reply).collect())
    }

    /// Request one tool call, then answer with `reply` once the result is back
    pub fn calling_tool(id: &str, name: &str, arguments: Value, reply: &str) -> Self {
        Self::scripted(vec![
            Ok(Message::assistant().with_tool_request(id, Ok(ToolCall::new(name, arguments)))),
            text_reply(reply),
        ])
    }

    /// Fail the first call, then answer with the given replies
    pub fn failing_then(replies: Vec<&str>) -> Self {
        let mut script = vec![Err("Server error: 503 Service Unavailable".to_string())];
        script.extend(replies.into_iter().map(text_reply));
        Self::scripted(script)
    }

    fn scripted(script: Vec<Result<Message, String>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(script.into())),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Provider for StubProvider {
    async fn complete(
        &self,
        _system_prompt: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        *self.calls.lock().unwrap() += 1;
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(message)) => Ok((message, Usage::default())),
            Some(Err(error)) => Err(anyhow!(error)),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}

fn text_reply(text: &str) -> Result<Message, String> {
    Ok(Message::assistant().with_text(text))
}
