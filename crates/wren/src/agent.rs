use futures::stream::BoxStream;
use serde::Serialize;
use std::time::Duration;
use strum_macros::Display;
use tokio::time::timeout;

use crate::errors::{AgentError, AgentResult, TurnError, TurnResult};
use crate::models::content::Content;
use crate::models::message::{Message, ToolRequest};
use crate::models::tool::Tool;
use crate::prompt_template::{load_prompt, SYSTEM_PROMPT};
use crate::providers::base::Provider;
use crate::toolkits::Toolkit;

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;
pub const DEFAULT_RESPONDER_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounds on a single reply
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentLimits {
    /// Consecutive tool round-trips allowed before the turn is abandoned
    pub max_tool_rounds: usize,
    pub responder_timeout: Duration,
    pub tool_timeout: Duration,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            responder_timeout: DEFAULT_RESPONDER_TIMEOUT,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}

/// Where a turn currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TurnState {
    AwaitingUserInput,
    Responding,
    ToolInvocation,
    AssistantReplied,
}

#[derive(Clone, Debug, Serialize)]
struct ToolkitInfo {
    name: String,
    description: String,
    instructions: String,
}

#[derive(Debug, Serialize)]
struct SystemPromptContext {
    date: String,
    toolkits: Vec<ToolkitInfo>,
}

/// Agent integrates a foundational LLM with the toolkits it may call on
pub struct Agent {
    toolkits: Vec<Box<dyn Toolkit>>,
    provider: Box<dyn Provider>,
    limits: AgentLimits,
}

impl Agent {
    /// Create a new Agent with the specified provider
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            toolkits: Vec::new(),
            provider,
            limits: AgentLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: AgentLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> AgentLimits {
        self.limits
    }

    /// Add a toolkit to the agent
    pub fn add_toolkit(&mut self, toolkit: Box<dyn Toolkit>) {
        self.toolkits.push(toolkit);
    }

    pub fn toolkit_names(&self) -> Vec<&str> {
        self.toolkits.iter().map(|toolkit| toolkit.name()).collect()
    }

    /// Get all tools declared by all toolkits
    pub fn tools(&self) -> Vec<Tool> {
        self.toolkits
            .iter()
            .flat_map(|toolkit| toolkit.tools().iter().cloned())
            .collect()
    }

    fn get_toolkit_for_tool(&self, tool_name: &str) -> Option<&dyn Toolkit> {
        self.toolkits
            .iter()
            .find(|toolkit| toolkit.has_tool(tool_name))
            .map(|toolkit| &**toolkit)
    }

    /// Dispatch a single tool request to the toolkit that declares it.
    ///
    /// The inner result is what gets recorded for the model. The outer error means the
    /// tool could not be reached at all and the turn has to stop.
    async fn dispatch_tool_call(
        &self,
        request: &ToolRequest,
    ) -> TurnResult<AgentResult<Vec<Content>>> {
        let call = match &request.tool_call {
            Ok(call) => call.clone(),
            Err(e) => return Ok(Err(e.clone())),
        };

        let Some(toolkit) = self.get_toolkit_for_tool(&call.name) else {
            tracing::warn!(tool = %call.name, "model requested an unknown tool");
            return Ok(Err(AgentError::ToolNotFound(call.name)));
        };

        let tool_name = call.name.clone();
        tracing::info!(tool = %tool_name, toolkit = toolkit.name(), "dispatching tool call");

        match timeout(self.limits.tool_timeout, toolkit.call(call)).await {
            Err(_) => Err(TurnError::ToolUnavailable {
                tool: tool_name,
                reason: format!("timed out after {:?}", self.limits.tool_timeout),
            }),
            Ok(Err(e)) if !e.is_request_error() => {
                tracing::error!(tool = %tool_name, error = %e, "tool call failed");
                Err(TurnError::ToolUnavailable {
                    tool: tool_name,
                    reason: e.to_string(),
                })
            }
            Ok(result) => Ok(result),
        }
    }

    fn get_system_prompt(&self) -> TurnResult<String> {
        let context = SystemPromptContext {
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            toolkits: self
                .toolkits
                .iter()
                .map(|toolkit| ToolkitInfo {
                    name: toolkit.name().to_string(),
                    description: toolkit.description().to_string(),
                    instructions: toolkit.instructions().to_string(),
                })
                .collect(),
        };

        load_prompt(SYSTEM_PROMPT, &context).map_err(|e| TurnError::Internal(e.to_string()))
    }

    /// Ask the provider for the next message, bounded by the responder timeout
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> TurnResult<Message> {
        let completion = timeout(
            self.limits.responder_timeout,
            self.provider.complete(system_prompt, messages, tools),
        )
        .await
        .map_err(|_| {
            TurnError::ResponderUnavailable(format!(
                "timed out after {:?}",
                self.limits.responder_timeout
            ))
        })?;

        let (response, usage) = completion.map_err(|e| {
            tracing::error!(error = %e, "completion failed");
            TurnError::ResponderUnavailable(e.to_string())
        })?;
        tracing::debug!(?usage, "completion finished");

        if !response.has_text() && !response.has_tool_request() {
            return Err(TurnError::ResponderUnavailable(
                "the model returned an empty reply".to_string(),
            ));
        }

        Ok(response)
    }

    /// Create a stream that yields each message as it's generated by the agent.
    ///
    /// This includes the assistant's responses and a tool message after every response
    /// that requested tools. The stream ends after the first response without tool requests.
    pub async fn reply(
        &self,
        messages: &[Message],
    ) -> TurnResult<BoxStream<'_, TurnResult<Message>>> {
        let mut messages = messages.to_vec();
        let tools = self.tools();
        let system_prompt = self.get_system_prompt()?;

        Ok(Box::pin(async_stream::try_stream! {
            let mut rounds = 0;
            let mut state = TurnState::Responding;

            loop {
                tracing::debug!(%state, rounds, "turn step");
                match state {
                    TurnState::Responding => {
                        let response = self.complete(&system_prompt, &messages, &tools).await?;
                        messages.push(response.clone());

                        state = if response.has_tool_request() {
                            TurnState::ToolInvocation
                        } else {
                            TurnState::AssistantReplied
                        };
                        yield response;

                        // Make sure the response reaches the caller before tools start running
                        tokio::task::yield_now().await;
                    }
                    TurnState::ToolInvocation => {
                        if rounds == self.limits.max_tool_rounds {
                            Err::<(), _>(TurnError::ToolRoundLimitExceeded(rounds))?;
                        }
                        rounds += 1;

                        let requests: Vec<ToolRequest> = messages
                            .last()
                            .map(|response| response.tool_requests().into_iter().cloned().collect())
                            .unwrap_or_default();

                        // Dispatch each in parallel but wait until all are finished
                        let futures: Vec<_> = requests
                            .iter()
                            .map(|request| self.dispatch_tool_call(request))
                            .collect();
                        let outputs = futures::future::join_all(futures)
                            .await
                            .into_iter()
                            .collect::<TurnResult<Vec<_>>>()?;

                        let mut message_tool_response = Message::tool();
                        for (request, output) in requests.iter().zip(outputs.into_iter()) {
                            message_tool_response = message_tool_response.with_tool_response(
                                request.id.clone(),
                                output,
                            );
                        }

                        messages.push(message_tool_response.clone());
                        yield message_tool_response;
                        state = TurnState::Responding;
                    }
                    TurnState::AssistantReplied | TurnState::AwaitingUserInput => break,
                }
            }
        }))
    }
}
