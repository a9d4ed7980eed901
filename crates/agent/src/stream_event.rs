//! Agent-level streaming events.
//!
//! `AgentStreamEvent` is the observable output contract of the streaming
//! path; the dashboard renders these incrementally over SSE or WebSocket.
//! Within one iteration the order is always `thinking`, then zero or more
//! `tool_start`/`tool_result` pairs; a successful run ends with `content`
//! chunks followed by `done`, a fatal one with a single `error` and no
//! `done`.

use serde::{Deserialize, Serialize};

/// Events emitted by the assistant during streaming execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// The assistant is about to call the model.
    Thinking { text: String },

    /// A tool invocation is starting.
    ToolStart {
        tool_name: String,
        args: serde_json::Value,
    },

    /// A tool invocation finished; `result` is the text fed back to the
    /// model, whether the tool succeeded or not.
    ToolResult { tool_name: String, result: String },

    /// A chunk of the final answer.
    Content { text: String },

    /// A fatal error; the stream terminates without `done`.
    Error { message: String },

    /// The stream is complete.
    Done,
}

impl AgentStreamEvent {
    /// SSE event name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Thinking { .. } => "thinking",
            Self::ToolStart { .. } => "tool_start",
            Self::ToolResult { .. } => "tool_result",
            Self::Content { .. } => "content",
            Self::Error { .. } => "error",
            Self::Done => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_thinking() {
        let event = AgentStreamEvent::Thinking {
            text: "Looking at your request...".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"thinking""#));
        assert!(json.contains("Looking at your request"));
    }

    #[test]
    fn event_serialization_tool_start() {
        let event = AgentStreamEvent::ToolStart {
            tool_name: "crm_search".into(),
            args: serde_json::json!({"object": "leads"}),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"tool_start""#));
        assert!(json.contains(r#""tool_name":"crm_search""#));
    }

    #[test]
    fn event_serialization_done_is_bare() {
        let event = AgentStreamEvent::Done;
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"done"}"#);
    }

    #[test]
    fn event_serialization_error() {
        let event = AgentStreamEvent::Error {
            message: "provider unreachable".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"error""#));
    }

    #[test]
    fn event_type_names() {
        assert_eq!(
            AgentStreamEvent::Thinking { text: "x".into() }.event_type(),
            "thinking"
        );
        assert_eq!(
            AgentStreamEvent::ToolStart {
                tool_name: "a".into(),
                args: serde_json::Value::Null
            }
            .event_type(),
            "tool_start"
        );
        assert_eq!(
            AgentStreamEvent::ToolResult {
                tool_name: "a".into(),
                result: "b".into()
            }
            .event_type(),
            "tool_result"
        );
        assert_eq!(
            AgentStreamEvent::Content { text: "x".into() }.event_type(),
            "content"
        );
        assert_eq!(
            AgentStreamEvent::Error { message: "x".into() }.event_type(),
            "error"
        );
        assert_eq!(AgentStreamEvent::Done.event_type(), "done");
    }

    #[test]
    fn event_deserialization() {
        let json = r#"{"type":"content","text":"hi"}"#;
        let event: AgentStreamEvent = serde_json::from_str(json).unwrap();
        match event {
            AgentStreamEvent::Content { text } => assert_eq!(text, "hi"),
            _ => panic!("Wrong variant"),
        }
    }
}
