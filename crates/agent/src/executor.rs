//! Tool execution with local failure recovery.
//!
//! The executor sits between the loop and the registry. Whatever happens —
//! unknown tool, empty arguments, unsafe filter syntax, collaborator error —
//! it returns *text*, because that text becomes a `tool` message and the
//! model must always receive something to reason about next. Exceptions
//! never escape to the loop.

use crate::arguments::{describe_shape, normalize_arguments};
use dealflow_core::event::{ActivityEvent, EventBus};
use dealflow_core::message::MessageToolCall;
use dealflow_core::tool::{RecoveryPolicy, ToolRegistry};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    event_bus: Arc<EventBus>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, event_bus: Arc<EventBus>) -> Self {
        Self {
            registry,
            event_bus,
        }
    }

    /// Execute one model-requested tool call and return the text to feed
    /// back to the model. Infallible.
    pub async fn execute_call(&self, call: &MessageToolCall) -> String {
        let Some(tool) = self.registry.get(&call.name) else {
            warn!(tool = %call.name, "Model requested unknown tool");
            return format!(
                "Tool '{}' not found. Available tools: {}",
                call.name,
                self.registry.names().join(", ")
            );
        };

        let mut arguments = normalize_arguments(&call.arguments);
        let policies = tool.recovery_policies();

        if arguments.is_empty() {
            match default_arguments(&policies) {
                Some(defaults) => {
                    // Recoverable formatting slip, not a fault; proceed
                    // silently with the tool's safe default.
                    debug!(
                        tool = %call.name,
                        "Empty arguments; substituting tool default"
                    );
                    arguments = defaults;
                }
                None => {
                    warn!(
                        tool = %call.name,
                        shape = %describe_shape(&call.arguments),
                        "Empty arguments and no safe default; skipping execution"
                    );
                    return format!(
                        "Tool '{}' was called without its required arguments \
                         (received {}). No action was taken. Please call it \
                         again with all required fields.",
                        call.name,
                        describe_shape(&call.arguments)
                    );
                }
            }
        }

        apply_filter_rewrites(&call.name, &policies, &mut arguments);

        let start = std::time::Instant::now();
        let result = tool.execute(Value::Object(arguments)).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(tool_result) => {
                self.event_bus.publish(ActivityEvent::ToolExecuted {
                    tool_name: call.name.clone(),
                    success: tool_result.success,
                    duration_ms,
                    timestamp: chrono::Utc::now(),
                });
                tool_result.output
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                self.event_bus.publish(ActivityEvent::ToolExecuted {
                    tool_name: call.name.clone(),
                    success: false,
                    duration_ms,
                    timestamp: chrono::Utc::now(),
                });
                format!("Error executing {}: {e}", call.name)
            }
        }
    }
}

fn default_arguments(policies: &[RecoveryPolicy]) -> Option<Map<String, Value>> {
    policies.iter().find_map(|p| match p {
        RecoveryPolicy::DefaultArguments(Value::Object(map)) => Some(map.clone()),
        _ => None,
    })
}

/// Rewrite filter queries whose embedded double quotes are known to break
/// the collaborator's transport serialization. The record type survives;
/// the filter is dropped and the result count bounded.
fn apply_filter_rewrites(
    tool_name: &str,
    policies: &[RecoveryPolicy],
    arguments: &mut Map<String, Value>,
) {
    for policy in policies {
        let RecoveryPolicy::StripQuotedFilter {
            field,
            limit_field,
            limit,
        } = policy
        else {
            continue;
        };

        let quoted = arguments
            .get(*field)
            .and_then(Value::as_str)
            .is_some_and(|f| f.contains('"'));

        if quoted {
            warn!(
                tool = %tool_name,
                field = %field,
                "Filter contains embedded quotes; rewriting to unfiltered bounded query"
            );
            arguments.remove(*field);
            arguments.insert(limit_field.to_string(), Value::from(*limit));
        }
    }
}
