use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::prompt::{ACKNOWLEDGEMENT, SYSTEM_PREAMBLE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A tool the model asked for, with the arguments it supplied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub name: String,
    pub args: Map<String, Value>,
    /// Opaque backend token that must accompany the call when it is replayed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self { name: name.into(), args, signature: None }
    }

    pub fn args_value(&self) -> Value {
        Value::Object(self.args.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    ToolCall(ToolInvocation),
    ToolResult { name: String, result: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self { role: Role::User, parts: vec![Part::Text { text: text.into() }] }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self { role: Role::Model, parts: vec![Part::Text { text: text.into() }] }
    }

    /// Replays the model's tool request, keeping any text it wrote alongside.
    pub fn model_tool_call(text: &str, invocation: ToolInvocation) -> Self {
        let mut parts = Vec::with_capacity(2);
        if !text.is_empty() {
            parts.push(Part::Text { text: text.to_string() });
        }
        parts.push(Part::ToolCall(invocation));
        Self { role: Role::Model, parts }
    }

    pub fn tool_result(name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::ToolResult { name: name.into(), result: result.into() }],
        }
    }
}

/// State of one user message from receipt to final reply. Nothing outlives it.
#[derive(Clone, Debug)]
pub struct ConversationTurn {
    turn_id: Uuid,
    caller_id: Option<String>,
    history: Vec<Message>,
}

impl ConversationTurn {
    pub fn start(user_text: &str, caller_id: Option<&str>) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            caller_id: caller_id.map(str::to_string),
            history: vec![
                Message::user_text(SYSTEM_PREAMBLE),
                Message::model_text(ACKNOWLEDGEMENT),
                Message::user_text(user_text),
            ],
        }
    }

    pub fn turn_id(&self) -> Uuid {
        self.turn_id
    }

    pub fn caller_label(&self) -> &str {
        self.caller_id.as_deref().unwrap_or("unknown")
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn record_tool_round_trip(
        &mut self,
        model_text: &str,
        invocation: ToolInvocation,
        result: String,
    ) {
        let name = invocation.name.clone();
        self.history.push(Message::model_tool_call(model_text, invocation));
        self.history.push(Message::tool_result(name, result));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::{ConversationTurn, Part, Role, ToolInvocation};
    use crate::prompt::{ACKNOWLEDGEMENT, SYSTEM_PREAMBLE};

    #[test]
    fn turn_is_seeded_with_preamble_acknowledgement_and_user_text() {
        let turn = ConversationTurn::start("幫我查天氣", Some("U123"));
        let history = turn.history();

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].parts, vec![Part::Text { text: SYSTEM_PREAMBLE.to_string() }]);
        assert_eq!(history[1].role, Role::Model);
        assert_eq!(history[1].parts, vec![Part::Text { text: ACKNOWLEDGEMENT.to_string() }]);
        assert_eq!(history[2].parts, vec![Part::Text { text: "幫我查天氣".to_string() }]);
        assert_eq!(turn.caller_label(), "U123");
    }

    #[test]
    fn each_turn_gets_a_fresh_id() {
        let first = ConversationTurn::start("a", None);
        let second = ConversationTurn::start("a", None);
        assert_ne!(first.turn_id(), second.turn_id());
        assert_eq!(first.caller_label(), "unknown");
    }

    #[test]
    fn tool_round_trip_appends_call_and_result() {
        let mut turn = ConversationTurn::start("note this", None);
        let mut args = Map::new();
        args.insert("filename".to_string(), json!("todo.txt"));
        let invocation = ToolInvocation::new("write_note", args);
        turn.record_tool_round_trip("", invocation, "✅ ok".to_string());

        let history = turn.history();
        assert_eq!(history.len(), 5);
        assert_eq!(history[3].role, Role::Model);
        assert!(matches!(
            &history[3].parts[..],
            [Part::ToolCall(call)] if call.name == "write_note"
        ));
        assert_eq!(history[4].role, Role::User);
        assert_eq!(
            history[4].parts,
            vec![Part::ToolResult { name: "write_note".to_string(), result: "✅ ok".to_string() }]
        );
    }
}
