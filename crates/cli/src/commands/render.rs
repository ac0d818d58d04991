use std::io::Read;

use anyhow::{Context, Result};
use moltbot_render::smart_reply;

use crate::commands::{CommandResult, FailureClass};

const COMMAND: &str = "render";

/// Renders `text`, or stdin when no text is given, as outgoing payload JSON.
pub fn run(text: Option<String>) -> CommandResult {
    let text = match text.map(Ok).unwrap_or_else(read_stdin) {
        Ok(text) => text,
        Err(error) => {
            return CommandResult::failure(COMMAND, FailureClass::Input, format!("{error:#}"))
        }
    };

    render_payload(&text)
}

pub fn render_payload(text: &str) -> CommandResult {
    CommandResult::payload(COMMAND, &smart_reply(text))
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text).context("failed to read reply text from stdin")?;
    Ok(text)
}
