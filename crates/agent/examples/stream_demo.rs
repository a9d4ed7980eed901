//! Streams one full assistant turn against stubbed integrations.
//!
//! No network access needed: the model is scripted and the CRM/mailbox
//! clients are in-process stubs.
//!
//! Run with: `cargo run -p dealflow-agent --example stream_demo`

use async_trait::async_trait;
use dealflow_agent::{AgentStreamEvent, AssistantLoop};
use dealflow_config::IntegrationsConfig;
use dealflow_core::error::ProviderError;
use dealflow_core::event::EventBus;
use dealflow_core::message::{Message, MessageToolCall};
use dealflow_core::provider::{Provider, ProviderRequest, ProviderResponse};
use dealflow_integrations::{IntegrationClients, build_registry};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct ScriptedProvider {
    script: Mutex<VecDeque<ProviderResponse>>,
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::Network("script exhausted".into()))
    }
}

fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ProviderResponse {
    let mut message = Message::assistant("");
    message.tool_calls = vec![MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments,
    }];
    ProviderResponse {
        message,
        usage: None,
        model: "scripted".into(),
    }
}

fn text(content: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(content),
        usage: None,
        model: "scripted".into(),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let provider = Arc::new(ScriptedProvider {
        script: Mutex::new(
            vec![
                tool_call("call_1", "crm_search", json!({"object": "opportunities"})),
                tool_call(
                    "call_2",
                    "gmail_search_mailbox",
                    json!({"query": "from:maria@acmecorp.test"}),
                ),
                text("decide"),
                text(
                    "The Acme Corp renewal ($48,000) is in negotiation and closes \
                     September 30. Maria emailed yesterday about renewal pricing; \
                     a reply draft would be a good next step.",
                ),
            ]
            .into(),
        ),
    });

    let flags = IntegrationsConfig {
        crm_connected: true,
        google_connected: true,
        outlook_connected: false,
    };
    let registry = Arc::new(build_registry(&flags, &IntegrationClients::stubs()));
    let agent = AssistantLoop::new(
        provider,
        "scripted",
        0.7,
        registry,
        Arc::new(EventBus::default()),
    );

    let mut events = agent.run_stream(
        "Where does the Acme renewal stand, and has Maria written back?",
        "You are a sales assistant with access to the user's CRM and mailbox.",
    );

    while let Some(event) = events.recv().await {
        match &event {
            AgentStreamEvent::Thinking { text } => println!("[thinking] {text}"),
            AgentStreamEvent::ToolStart { tool_name, args } => {
                println!("[tool_start] {tool_name} {args}")
            }
            AgentStreamEvent::ToolResult { tool_name, result } => {
                println!("[tool_result] {tool_name}:\n{result}")
            }
            AgentStreamEvent::Content { text } => println!("[content] {text}"),
            AgentStreamEvent::Error { message } => println!("[error] {message}"),
            AgentStreamEvent::Done => println!("[done]"),
        }
    }
}
