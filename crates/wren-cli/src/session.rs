use anyhow::Result;
use std::sync::Arc;

use crate::prompt::{InputType, Prompt};
use wren::controller::{Turn, TurnController};
use wren::models::message::Message;

#[cfg(test)]
mod mock_provider;

pub struct Session<'a> {
    controller: Arc<TurnController>,
    prompt: Box<dyn Prompt + 'a>,
    session_id: String,
}

impl<'a> Session<'a> {
    pub fn new(
        controller: Arc<TurnController>,
        prompt: Box<impl Prompt + 'a>,
        session_id: String,
    ) -> Self {
        Session {
            controller,
            prompt,
            session_id,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        self.setup_session();

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        self.process_turn(content).await;
                    }
                }
                InputType::Exit => break,
                InputType::AskAgain => continue,
            }
        }
        self.prompt.close();
        Ok(())
    }

    /// Run a single turn without reading from the prompt. Failures are returned to the caller.
    pub async fn headless_start(&mut self, text: &str) -> Result<()> {
        self.prompt.show_busy();
        let result = self.controller.run_turn(&self.session_id, text).await;
        self.prompt.hide_busy();

        let turn = result?;
        self.render_turn(turn);
        Ok(())
    }

    async fn process_turn(&mut self, text: &str) {
        self.prompt.show_busy();
        let outcome = tokio::select! {
            result = self.controller.run_turn(&self.session_id, text) => Some(result),
            // Dropping the turn before it commits leaves the history untouched
            _ = tokio::signal::ctrl_c() => None,
        };
        self.prompt.hide_busy();

        match outcome {
            Some(Ok(turn)) => self.render_turn(turn),
            Some(Err(e)) => self.prompt.render_error(&e.to_string()),
            None => self.prompt.render(raw_message(
                " Interrupt: the conversation is unchanged, your last message was not sent.\n",
            )),
        }
    }

    fn render_turn(&mut self, turn: Turn) {
        // The user message was typed at the prompt, everything after it is new
        for message in turn.messages.into_iter().skip(1) {
            self.prompt.render(Box::new(message));
        }
    }

    fn setup_session(&mut self) {
        let toolkits = self.controller.agent().toolkit_names().join(", ");
        if toolkits.is_empty() {
            tracing::info!("starting session without tools");
        } else {
            tracing::info!(toolkits = %toolkits, "starting session");
        }
        self.prompt.ready(&self.session_id);
    }
}

fn raw_message(content: &str) -> Box<Message> {
    Box::new(Message::tool().with_text(content))
}
