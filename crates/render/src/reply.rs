use chrono::{DateTime, Utc};
use moltbot_core::EMPTY_REPLY_FALLBACK;
use serde::Serialize;
use tracing::debug;

use crate::blocks::{derive_title, parse};
use crate::card::{compose_at, compose_error, CardDocument};
use crate::classify::matched_rule;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextMessage {
    pub text: String,
}

/// What the transport sends back to the user for one reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutgoingMessage {
    Text(TextMessage),
    Card(CardDocument),
}

impl OutgoingMessage {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(message) => Some(&message.text),
            Self::Card(_) => None,
        }
    }

    pub fn as_card(&self) -> Option<&CardDocument> {
        match self {
            Self::Card(card) => Some(card),
            Self::Text(_) => None,
        }
    }
}

pub fn smart_reply(text: &str) -> OutgoingMessage {
    smart_reply_at(text, Utc::now())
}

pub fn smart_reply_at(text: &str, rendered_at: DateTime<Utc>) -> OutgoingMessage {
    let Some(rule) = matched_rule(text) else {
        let text = if text.is_empty() { EMPTY_REPLY_FALLBACK } else { text };
        return OutgoingMessage::Text(TextMessage { text: text.to_string() });
    };

    debug!(
        event_name = "render.reply.structured",
        rule = rule.as_str(),
        chars = text.chars().count(),
        "rendering reply as card"
    );

    let title = derive_title(text);
    OutgoingMessage::Card(compose_at(parse(text), &title, text, rendered_at))
}

pub fn error_reply(detail: &str) -> OutgoingMessage {
    OutgoingMessage::Card(compose_error(detail))
}
