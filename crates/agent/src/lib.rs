//! The tool-calling assistant loop — the heart of dealflow.
//!
//! One turn works like this:
//!
//! 1. **Receive** a user request
//! 2. **Send to the model** with the session's tool schemas
//! 3. **If tool calls**: normalize arguments, execute sequentially, append
//!    results, loop back to step 2
//! 4. **If text**: that's the final answer
//!
//! The loop runs under a hard iteration budget; exhausting it produces a
//! topic-aware fallback answer instead of an error. The streaming variant
//! makes each step observable as a typed [`AgentStreamEvent`].

pub mod arguments;
pub mod executor;
pub mod loop_runner;
pub mod stream_event;

pub use arguments::normalize_arguments;
pub use executor::ToolExecutor;
pub use loop_runner::AssistantLoop;
pub use stream_event::AgentStreamEvent;
