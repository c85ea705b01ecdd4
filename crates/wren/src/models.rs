//! These models represent the objects passed around by the agent
//!
//! There are a few related formats we need to interact with:
//! - the internal conversation history, keyed by session and owned by the session store
//! - openai compatible chat completion messages/tools, sent from the agent to the LLM
//! - tool requests, sent from the agent to the toolkits providing capabilities
//! - the json payloads exchanged with the web surface
//!
//! We always immediately convert those data models into the internal structs using to/from
//! helpers. The internal models are not an exact match to any of these formats.
pub mod content;
pub mod message;
pub mod role;
pub mod tool;
