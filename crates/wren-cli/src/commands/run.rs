use anyhow::{bail, Result};
use std::io::Read;

use super::session::{build_controller, SessionArgs};
use crate::prompt::rustyline::RustylinePrompt;
use crate::session::Session;

pub async fn execute(text: String, args: SessionArgs) -> Result<()> {
    let text = read_text(text, std::io::stdin())?;
    let controller = build_controller(&args)?;
    let prompt = RustylinePrompt::new()?;
    let mut session = Session::new(controller, Box::new(prompt), args.session_id());
    session.headless_start(&text).await
}

/// `-` reads the message from the given reader instead
fn read_text(text: String, mut reader: impl Read) -> Result<String> {
    let text = if text == "-" {
        let mut buffer = String::new();
        reader.read_to_string(&mut buffer)?;
        buffer
    } else {
        text
    };

    if text.trim().is_empty() {
        bail!("Nothing to send: the message is empty");
    }
    Ok(text)
}
