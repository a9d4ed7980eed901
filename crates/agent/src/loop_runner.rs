//! The assistant reasoning loop.
//!
//! A bounded state machine: send the conversation and tool schemas to the
//! model, interpret the response as either a final answer or a batch of
//! tool calls, execute the calls sequentially, feed the results back, and
//! repeat. The iteration budget bounds total cost; exhausting it yields a
//! topic-aware fallback answer rather than an error, because budget
//! exhaustion is common enough that a raw failure is unacceptable UX.
//! Only a failure of the model transport itself is fatal.

use crate::executor::ToolExecutor;
use crate::stream_event::AgentStreamEvent;
use dealflow_config::AppConfig;
use dealflow_core::event::{ActivityEvent, EventBus};
use dealflow_core::message::{Conversation, ConversationId, Message};
use dealflow_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
use dealflow_core::tool::ToolRegistry;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// The core loop that orchestrates model calls and tool execution.
#[derive(Clone)]
pub struct AssistantLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry for this session
    tools: Arc<ToolRegistry>,

    /// Hard bound on model-and-tool round trips per turn
    max_iterations: u32,

    /// Event bus for activity events
    event_bus: Arc<EventBus>,

    /// Executes individual tool calls
    executor: ToolExecutor,
}

impl AssistantLoop {
    /// Create a new assistant loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let executor = ToolExecutor::new(tools.clone(), event_bus.clone());
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            event_bus,
            executor,
        }
    }

    /// Create a loop with model settings taken from the app configuration.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        config: &AppConfig,
        tools: Arc<ToolRegistry>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self::new(provider, &config.model, config.temperature, tools, event_bus)
            .with_max_tokens(config.max_tokens)
            .with_max_iterations(config.max_iterations)
    }

    /// Set the maximum number of tool call iterations.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the default max tokens per model response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Run a single query to completion and return only the final answer.
    pub async fn run(
        &self,
        query: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Result<String, dealflow_core::Error> {
        let mut conversation = Conversation::new();
        conversation.push(Message::system(system_prompt));
        conversation.push(Message::user(query));
        self.process(&mut conversation).await
    }

    /// Process a conversation and generate a response.
    ///
    /// Appends to the conversation as it goes: the assistant message for
    /// each model turn, and one `tool` message per executed call, keyed to
    /// that call's id. Provider failures propagate immediately; everything
    /// else resolves to text.
    pub async fn process(
        &self,
        conversation: &mut Conversation,
    ) -> Result<String, dealflow_core::Error> {
        info!(
            conversation_id = %conversation.id,
            messages = conversation.messages.len(),
            tools = self.tools.len(),
            "Processing conversation"
        );

        let tool_definitions = self.tools.definitions();

        for iteration in 1..=self.max_iterations {
            debug!(
                conversation_id = %conversation.id,
                iteration,
                "Assistant loop iteration"
            );

            let request = self.request(conversation, &tool_definitions, false);
            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    self.publish_fatal(&e.to_string());
                    return Err(e.into());
                }
            };

            self.publish_usage(&conversation.id, &response);

            if response.message.tool_calls.is_empty() {
                // No tool calls: this is the final text response
                let response_text = response.message.content.clone();
                conversation.push(response.message);
                return Ok(response_text);
            }

            debug!(
                tool_count = response.message.tool_calls.len(),
                "Executing tool calls"
            );

            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            // Sequential, in call order. Keeps the transcript deterministic
            // and the audit log free of interleaved records.
            for tc in &tool_calls {
                let output = self.executor.execute_call(tc).await;
                conversation.push(Message::tool_result(&tc.id, &output));
            }
        }

        warn!(
            conversation_id = %conversation.id,
            max_iterations = self.max_iterations,
            "Iteration budget exhausted; returning fallback answer"
        );
        Ok(self.fallback_answer(conversation))
    }

    /// Run a single query with streaming progress events.
    ///
    /// The caller consumes the receiver until `Done` or `Error`. Dropping
    /// the receiver cancels the run at the next event boundary; no further
    /// model or tool calls are issued once the caller stops listening.
    pub fn run_stream(
        &self,
        query: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> mpsc::Receiver<AgentStreamEvent> {
        let (tx, rx) = mpsc::channel(32);
        let this = self.clone();
        let query = query.into();
        let system_prompt = system_prompt.into();

        tokio::spawn(async move {
            this.stream_task(query, system_prompt, tx).await;
        });

        rx
    }

    async fn stream_task(
        &self,
        query: String,
        system_prompt: String,
        tx: mpsc::Sender<AgentStreamEvent>,
    ) {
        let mut conversation = Conversation::new();
        conversation.push(Message::system(system_prompt));
        conversation.push(Message::user(query));

        let tool_definitions = self.tools.definitions();

        for iteration in 1..=self.max_iterations {
            let thinking = if iteration == 1 {
                "Looking at your request..."
            } else {
                "Reviewing the results..."
            };
            if tx
                .send(AgentStreamEvent::Thinking {
                    text: thinking.into(),
                })
                .await
                .is_err()
            {
                return; // caller stopped consuming
            }

            let request = self.request(&conversation, &tool_definitions, false);
            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    self.publish_fatal(&e.to_string());
                    let _ = tx
                        .send(AgentStreamEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                    return; // fatal: no Done
                }
            };

            self.publish_usage(&conversation.id, &response);

            if response.message.tool_calls.is_empty() {
                // Final iteration: re-invoke in token-streaming mode so the
                // caller sees the answer arrive incrementally.
                self.stream_final_answer(&conversation, &tx).await;
                return;
            }

            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            for tc in &tool_calls {
                if tx
                    .send(AgentStreamEvent::ToolStart {
                        tool_name: tc.name.clone(),
                        args: tc.arguments.clone(),
                    })
                    .await
                    .is_err()
                {
                    return;
                }

                let output = self.executor.execute_call(tc).await;
                conversation.push(Message::tool_result(&tc.id, &output));

                if tx
                    .send(AgentStreamEvent::ToolResult {
                        tool_name: tc.name.clone(),
                        result: output,
                    })
                    .await
                    .is_err()
                {
                    return;
                }
            }
        }

        let fallback = self.fallback_answer(&conversation);
        if tx
            .send(AgentStreamEvent::Content { text: fallback })
            .await
            .is_err()
        {
            return;
        }
        let _ = tx.send(AgentStreamEvent::Done).await;
    }

    async fn stream_final_answer(
        &self,
        conversation: &Conversation,
        tx: &mpsc::Sender<AgentStreamEvent>,
    ) {
        let request = self.request(conversation, &[], true);
        let mut chunks = match self.provider.stream(request).await {
            Ok(rx) => rx,
            Err(e) => {
                self.publish_fatal(&e.to_string());
                let _ = tx
                    .send(AgentStreamEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
                return;
            }
        };

        while let Some(chunk) = chunks.recv().await {
            match chunk {
                Ok(chunk) => {
                    if let Some(text) = chunk.content
                        && !text.is_empty()
                        && tx.send(AgentStreamEvent::Content { text }).await.is_err()
                    {
                        return;
                    }
                    if chunk.done {
                        break;
                    }
                }
                Err(e) => {
                    self.publish_fatal(&e.to_string());
                    let _ = tx
                        .send(AgentStreamEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                    return;
                }
            }
        }

        let _ = tx.send(AgentStreamEvent::Done).await;
    }

    fn request(
        &self,
        conversation: &Conversation,
        tools: &[ToolDefinition],
        stream: bool,
    ) -> ProviderRequest {
        ProviderRequest {
            model: self.model.clone(),
            messages: conversation.messages.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: tools.to_vec(),
            stream,
        }
    }

    fn publish_usage(&self, conversation_id: &ConversationId, response: &ProviderResponse) {
        if let Some(usage) = &response.usage {
            self.event_bus.publish(ActivityEvent::ResponseGenerated {
                conversation_id: conversation_id.to_string(),
                model: response.model.clone(),
                tokens_used: usage.total_tokens,
                timestamp: Utc::now(),
            });
        }
    }

    fn publish_fatal(&self, message: &str) {
        self.event_bus.publish(ActivityEvent::ErrorOccurred {
            context: "model_call".into(),
            error_message: message.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// A user-facing answer for when the iteration budget runs out.
    ///
    /// Keyed off the last user utterance so the suggestion points at the
    /// integration most likely involved. Always non-empty.
    fn fallback_answer(&self, conversation: &Conversation) -> String {
        let topic = conversation
            .last_user_message()
            .map(|m| m.content.to_lowercase())
            .unwrap_or_default();

        if topic.contains("lead") {
            "I wasn't able to finish looking up those leads just now. Please try \
             asking again, or check that your CRM connection is still active."
                .into()
        } else if topic.contains("contact") {
            "I wasn't able to finish retrieving those contacts just now. Please \
             try asking again, or check that your CRM connection is still active."
                .into()
        } else if topic.contains("deal")
            || topic.contains("opportunit")
            || topic.contains("pipeline")
        {
            "I wasn't able to finish reviewing your deals just now. Please try \
             asking again, or check that your CRM connection is still active."
                .into()
        } else if topic.contains("email")
            || topic.contains("inbox")
            || topic.contains("mail")
            || topic.contains("draft")
        {
            "I wasn't able to finish working with your mailbox just now. Please \
             try asking again, or check that your email account is still connected."
                .into()
        } else if topic.contains("calendar")
            || topic.contains("meeting")
            || topic.contains("schedule")
            || topic.contains("event")
        {
            "I wasn't able to finish setting that up on your calendar just now. \
             Please try asking again, or check that your calendar account is \
             still connected."
                .into()
        } else {
            "I wasn't able to complete that request just now. Please try \
             rephrasing it or asking again in a moment."
                .into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dealflow_core::error::{ProviderError, ToolError};
    use dealflow_core::message::{MessageToolCall, Role};
    use dealflow_core::provider::Usage;
    use dealflow_core::tool::{RecoveryPolicy, Tool, ToolResult};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A provider that plays back a script of responses, one per call.
    /// Panics if called more times than scripted.
    struct SequentialMockProvider {
        script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
        calls: AtomicUsize,
    }

    impl SequentialMockProvider {
        fn new(script: Vec<Result<ProviderResponse, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider for SequentialMockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock provider called more times than scripted")
        }
    }

    fn text_response(content: &str) -> Result<ProviderResponse, ProviderError> {
        Ok(ProviderResponse {
            message: Message::assistant(content),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }

    fn tool_call_response(
        calls: Vec<(&str, &str, serde_json::Value)>,
    ) -> Result<ProviderResponse, ProviderError> {
        let mut message = Message::assistant("");
        message.tool_calls = calls
            .into_iter()
            .map(|(id, name, arguments)| MessageToolCall {
                id: id.into(),
                name: name.into(),
                arguments,
            })
            .collect();
        Ok(ProviderResponse {
            message,
            usage: None,
            model: "mock-model".into(),
        })
    }

    struct StaticTool {
        name: &'static str,
        output: &'static str,
        policies: Vec<RecoveryPolicy>,
    }

    #[async_trait]
    impl Tool for StaticTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "test tool"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object"})
        }
        fn recovery_policies(&self) -> Vec<RecoveryPolicy> {
            self.policies.clone()
        }
        async fn execute(
            &self,
            _arguments: serde_json::Value,
        ) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::ok(self.output))
        }
    }

    fn registry_with(tools: Vec<StaticTool>) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(Box::new(tool));
        }
        Arc::new(registry)
    }

    fn assistant(
        provider: Arc<SequentialMockProvider>,
        tools: Arc<ToolRegistry>,
    ) -> AssistantLoop {
        AssistantLoop::new(
            provider,
            "mock-model",
            0.7,
            tools,
            Arc::new(EventBus::default()),
        )
    }

    #[tokio::test]
    async fn text_only_response_returns_immediately() {
        let provider = SequentialMockProvider::new(vec![text_response("Hello! How can I help?")]);
        let agent = assistant(provider.clone(), Arc::new(ToolRegistry::new()));

        let mut conv = Conversation::new();
        conv.push(Message::user("Hello!"));

        let response = agent.process(&mut conv).await.unwrap();
        assert_eq!(response, "Hello! How can I help?");
        assert_eq!(provider.call_count(), 1);
        // User + Assistant, no tool messages
        assert_eq!(conv.messages.len(), 2);
        assert!(conv.messages.iter().all(|m| m.role != Role::Tool));
    }

    #[tokio::test]
    async fn tool_round_trip_then_answer() {
        let provider = SequentialMockProvider::new(vec![
            tool_call_response(vec![("call_1", "crm_search", json!({"object": "leads"}))]),
            text_response("You have 2 open leads."),
        ]);
        let tools = registry_with(vec![StaticTool {
            name: "crm_search",
            output: "2 leads found",
            policies: vec![],
        }]);
        let agent = assistant(provider.clone(), tools);

        let mut conv = Conversation::new();
        conv.push(Message::user("show me my leads"));

        let response = agent.process(&mut conv).await.unwrap();
        assert_eq!(response, "You have 2 open leads.");
        assert_eq!(provider.call_count(), 2);

        let tool_msg = conv
            .messages
            .iter()
            .find(|m| m.role == Role::Tool)
            .expect("tool message appended");
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_msg.content, "2 leads found");
    }

    #[tokio::test]
    async fn tool_messages_pair_with_calls() {
        let provider = SequentialMockProvider::new(vec![
            tool_call_response(vec![
                ("call_1", "crm_search", json!({"object": "leads"})),
                ("call_2", "crm_search", json!({"object": "contacts"})),
            ]),
            text_response("done"),
        ]);
        let tools = registry_with(vec![StaticTool {
            name: "crm_search",
            output: "records",
            policies: vec![],
        }]);
        let agent = assistant(provider, tools);

        let mut conv = Conversation::new();
        conv.push(Message::user("search everything"));
        agent.process(&mut conv).await.unwrap();

        let call_ids: Vec<String> = conv
            .messages
            .iter()
            .flat_map(|m| m.tool_calls.iter().map(|tc| tc.id.clone()))
            .collect();
        let tool_msg_ids: Vec<String> = conv
            .messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .filter_map(|m| m.tool_call_id.clone())
            .collect();
        assert_eq!(call_ids, tool_msg_ids);
        assert_eq!(call_ids, vec!["call_1", "call_2"]);
    }

    #[tokio::test]
    async fn unknown_tool_does_not_crash_the_loop() {
        let provider = SequentialMockProvider::new(vec![
            tool_call_response(vec![("call_1", "no_such_tool", json!({}))]),
            text_response("sorry about that"),
        ]);
        let agent = assistant(provider, Arc::new(ToolRegistry::new()));

        let mut conv = Conversation::new();
        conv.push(Message::user("do something"));

        let response = agent.process(&mut conv).await.unwrap();
        assert_eq!(response, "sorry about that");

        let tool_msg = conv.messages.iter().find(|m| m.role == Role::Tool).unwrap();
        assert!(tool_msg.content.contains("not found"));
    }

    #[tokio::test]
    async fn budget_exhaustion_returns_topic_aware_fallback() {
        // Model asks for tools on every one of the 10 allowed iterations,
        // and would have asked an 11th time.
        let script: Vec<_> = (0..11)
            .map(|i| {
                tool_call_response(vec![(
                    &*format!("call_{i}"),
                    "crm_search",
                    json!({"object": "leads"}),
                )])
            })
            .collect();
        let provider = SequentialMockProvider::new(script);
        let tools = registry_with(vec![StaticTool {
            name: "crm_search",
            output: "records",
            policies: vec![],
        }]);
        let agent = assistant(provider.clone(), tools);

        let mut conv = Conversation::new();
        conv.push(Message::user("find my hottest leads"));

        let response = agent.process(&mut conv).await.unwrap();
        assert!(!response.is_empty());
        assert!(response.contains("leads"));
        assert!(response.contains("CRM connection"));
        assert_eq!(provider.call_count(), 10);
    }

    #[tokio::test]
    async fn fallback_mentions_mailbox_for_email_queries() {
        let script: Vec<_> = (0..10)
            .map(|_| tool_call_response(vec![("c", "t", json!({}))]))
            .collect();
        let provider = SequentialMockProvider::new(script);
        let agent = assistant(provider, Arc::new(ToolRegistry::new()))
            .with_max_iterations(10);

        let mut conv = Conversation::new();
        conv.push(Message::user("any new email from maria?"));

        let response = agent.process(&mut conv).await.unwrap();
        assert!(response.contains("email account"));
    }

    #[tokio::test]
    async fn transport_error_is_fatal() {
        let provider = SequentialMockProvider::new(vec![
            tool_call_response(vec![("call_1", "crm_search", json!({"object": "leads"}))]),
            Err(ProviderError::Network("connection reset".into())),
        ]);
        let tools = registry_with(vec![StaticTool {
            name: "crm_search",
            output: "records",
            policies: vec![],
        }]);
        let agent = assistant(provider.clone(), tools);

        let mut conv = Conversation::new();
        conv.push(Message::user("show leads"));

        let result = agent.process(&mut conv).await;
        assert!(result.is_err());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn run_builds_conversation_from_query() {
        let provider = SequentialMockProvider::new(vec![text_response("hi")]);
        let agent = assistant(provider, Arc::new(ToolRegistry::new()));

        let response = agent
            .run("hello", "You are a sales assistant")
            .await
            .unwrap();
        assert_eq!(response, "hi");
    }

    async fn collect_events(
        mut rx: mpsc::Receiver<AgentStreamEvent>,
    ) -> Vec<AgentStreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn stream_event_ordering() {
        // complete: tool call, complete: final, stream (default wraps
        // complete): the streamed answer text.
        let provider = SequentialMockProvider::new(vec![
            tool_call_response(vec![("call_1", "crm_search", json!({"object": "leads"}))]),
            text_response("decided"),
            text_response("You have 2 open leads."),
        ]);
        let tools = registry_with(vec![StaticTool {
            name: "crm_search",
            output: "2 leads found",
            policies: vec![],
        }]);
        let agent = assistant(provider, tools);

        let events =
            collect_events(agent.run_stream("show my leads", "You are a sales assistant")).await;

        let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec![
                "thinking",
                "tool_start",
                "tool_result",
                "thinking",
                "content",
                "done"
            ]
        );

        match &events[4] {
            AgentStreamEvent::Content { text } => assert_eq!(text, "You have 2 open leads."),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn stream_fatal_error_ends_without_done() {
        let provider = SequentialMockProvider::new(vec![
            tool_call_response(vec![("call_1", "crm_search", json!({"object": "leads"}))]),
            Err(ProviderError::Network("connection reset".into())),
        ]);
        let tools = registry_with(vec![StaticTool {
            name: "crm_search",
            output: "records",
            policies: vec![],
        }]);
        let agent = assistant(provider, tools);

        let events = collect_events(agent.run_stream("show leads", "prompt")).await;

        let types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec!["thinking", "tool_start", "tool_result", "thinking", "error"]
        );
        assert!(!types.contains(&"done"));
    }

    #[tokio::test]
    async fn stream_budget_exhaustion_emits_fallback_then_done() {
        let script: Vec<_> = (0..2)
            .map(|_| tool_call_response(vec![("c", "crm_search", json!({"object": "leads"}))]))
            .collect();
        let provider = SequentialMockProvider::new(script);
        let tools = registry_with(vec![StaticTool {
            name: "crm_search",
            output: "records",
            policies: vec![],
        }]);
        let agent = assistant(provider, tools).with_max_iterations(2);

        let events = collect_events(agent.run_stream("find leads", "prompt")).await;

        let last_two: Vec<&str> = events[events.len() - 2..]
            .iter()
            .map(|e| e.event_type())
            .collect();
        assert_eq!(last_two, vec!["content", "done"]);

        match &events[events.len() - 2] {
            AgentStreamEvent::Content { text } => assert!(text.contains("leads")),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn activity_events_published_during_run() {
        let provider = SequentialMockProvider::new(vec![
            tool_call_response(vec![("call_1", "crm_search", json!({"object": "leads"}))]),
            text_response("done"),
        ]);
        let tools = registry_with(vec![StaticTool {
            name: "crm_search",
            output: "records",
            policies: vec![],
        }]);
        let event_bus = Arc::new(EventBus::default());
        let mut rx = event_bus.subscribe();

        let agent = AssistantLoop::new(provider, "mock-model", 0.7, tools, event_bus);
        let mut conv = Conversation::new();
        conv.push(Message::user("show leads"));
        agent.process(&mut conv).await.unwrap();

        let mut saw_tool = false;
        let mut saw_response = false;
        while let Ok(event) = rx.try_recv() {
            match &*event {
                ActivityEvent::ToolExecuted { .. } => saw_tool = true,
                ActivityEvent::ResponseGenerated { .. } => saw_response = true,
                ActivityEvent::ErrorOccurred { .. } => {}
            }
        }
        assert!(saw_tool);
        assert!(saw_response);
    }

    #[tokio::test]
    async fn from_config_applies_settings() {
        let config = AppConfig {
            model: "gpt-4o-mini".into(),
            max_iterations: 3,
            ..AppConfig::default()
        };
        let script: Vec<_> = (0..3)
            .map(|_| tool_call_response(vec![("c", "t", json!({}))]))
            .collect();
        let provider = SequentialMockProvider::new(script);

        let agent = AssistantLoop::from_config(
            provider.clone(),
            &config,
            Arc::new(ToolRegistry::new()),
            Arc::new(EventBus::default()),
        );

        let mut conv = Conversation::new();
        conv.push(Message::user("anything"));
        let response = agent.process(&mut conv).await.unwrap();
        assert!(!response.is_empty());
        assert_eq!(provider.call_count(), 3);
    }
}
