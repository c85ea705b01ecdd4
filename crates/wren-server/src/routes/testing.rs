use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::Request,
    response::Response,
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::state::AppState;
use wren::agent::Agent;
use wren::controller::TurnController;
use wren::models::message::Message;
use wren::models::tool::Tool;
use wren::providers::base::{Provider, Usage};
use wren::session::InMemoryStore;

pub enum Scripted {
    Reply(&'static str),
    Fail(&'static str),
}

/// Responder that answers from a script, one entry per call
pub struct StubProvider {
    script: Mutex<VecDeque<Scripted>>,
}

#[async_trait]
impl Provider for StubProvider {
    async fn complete(
        &self,
        _system_prompt: &str,
        _messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(text)) => Ok((Message::assistant().with_text(text), Usage::default())),
            Some(Scripted::Fail(error)) => Err(anyhow!(error)),
            None => Err(anyhow!("no scripted reply left")),
        }
    }
}

pub fn state_with(script: Vec<Scripted>) -> AppState {
    let provider = StubProvider {
        script: Mutex::new(script.into()),
    };
    AppState::new(TurnController::new(
        Agent::new(Box::new(provider)),
        Arc::new(InMemoryStore::new()),
    ))
}

pub fn json_request<T: Serialize>(uri: &str, body: &T) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
