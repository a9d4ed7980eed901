//! Mailbox integration — email search, drafts, and calendar events.
//!
//! Gmail and Outlook expose the same three operations, so both are modeled
//! as [`MailboxClient`] implementations and the tools are parameterized by a
//! provider label. The label prefixes the tool name (`gmail_search_mailbox`,
//! `outlook_create_draft`, ...) so the model can address a specific mailbox
//! when both are connected.

use crate::error::IntegrationError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use dealflow_core::error::ToolError;
use dealflow_core::tool::{RecoveryPolicy, Tool, ToolResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An email draft to be saved (never sent) in the user's mailbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// A calendar event to be created on the user's calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Async boundary to an email/calendar backend.
#[async_trait]
pub trait MailboxClient: Send + Sync {
    /// Search messages with the provider's query syntax.
    async fn search_messages(&self, query: &str, limit: u64)
    -> Result<String, IntegrationError>;

    /// Save a draft, returning a confirmation.
    async fn create_draft(&self, draft: DraftEmail) -> Result<String, IntegrationError>;

    /// Create a calendar event, returning a confirmation.
    async fn create_event(&self, event: CalendarEvent) -> Result<String, IntegrationError>;
}

const SEARCH_DEFAULT_LIMIT: u64 = 10;
const SEARCH_MAX_LIMIT: u64 = 25;

fn execution_failed(tool_name: &str, e: IntegrationError) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: tool_name.to_string(),
        reason: e.to_string(),
    }
}

/// Searches the mailbox. Empty arguments fall back to listing recent
/// unread mail rather than failing the turn.
pub struct MailboxSearchTool {
    name: String,
    description: String,
    client: Arc<dyn MailboxClient>,
}

impl MailboxSearchTool {
    pub fn new(label: &str, client: Arc<dyn MailboxClient>) -> Self {
        Self {
            name: format!("{label}_search_mailbox"),
            description: format!(
                "Search the user's {label} mailbox for messages matching a query."
            ),
            client,
        }
    }
}

#[async_trait]
impl Tool for MailboxSearchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query, e.g. 'from:alice@example.com' or 'subject:renewal'"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of messages to return (default 10)",
                    "default": 10
                }
            }
        })
    }

    fn required_overrides(&self) -> &[&str] {
        &["query"]
    }

    fn recovery_policies(&self) -> Vec<RecoveryPolicy> {
        vec![RecoveryPolicy::DefaultArguments(serde_json::json!({
            "query": "is:unread",
            "limit": SEARCH_DEFAULT_LIMIT,
        }))]
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;
        let limit = arguments["limit"]
            .as_u64()
            .unwrap_or(SEARCH_DEFAULT_LIMIT)
            .min(SEARCH_MAX_LIMIT);

        let output = self
            .client
            .search_messages(query, limit)
            .await
            .map_err(|e| execution_failed(&self.name, e))?;

        Ok(ToolResult::ok(output))
    }
}

/// Saves an email draft. Drafts are never sent automatically; the user
/// reviews them in their own mail client.
pub struct MailboxCreateDraftTool {
    name: String,
    description: String,
    client: Arc<dyn MailboxClient>,
}

impl MailboxCreateDraftTool {
    pub fn new(label: &str, client: Arc<dyn MailboxClient>) -> Self {
        Self {
            name: format!("{label}_create_draft"),
            description: format!(
                "Create an email draft in the user's {label} account. The draft is saved, not sent."
            ),
            client,
        }
    }
}

#[async_trait]
impl Tool for MailboxCreateDraftTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "to": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Recipient email addresses"
                },
                "subject": {
                    "type": "string",
                    "description": "Email subject line"
                },
                "body": {
                    "type": "string",
                    "description": "Email body text"
                }
            }
        })
    }

    fn required_overrides(&self) -> &[&str] {
        &["to", "subject", "body"]
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let draft: DraftEmail = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(format!("Invalid draft fields: {e}")))?;

        if draft.to.is_empty() {
            return Err(ToolError::InvalidArguments(
                "At least one recipient is required".into(),
            ));
        }

        let output = self
            .client
            .create_draft(draft)
            .await
            .map_err(|e| execution_failed(&self.name, e))?;

        Ok(ToolResult::ok(output))
    }
}

/// Creates a calendar event. Start and end are RFC 3339 timestamps.
pub struct MailboxCreateEventTool {
    name: String,
    description: String,
    client: Arc<dyn MailboxClient>,
}

impl MailboxCreateEventTool {
    pub fn new(label: &str, client: Arc<dyn MailboxClient>) -> Self {
        Self {
            name: format!("{label}_create_event"),
            description: format!(
                "Create a calendar event on the user's {label} calendar with a title, start and end time, and optional attendees."
            ),
            client,
        }
    }
}

#[async_trait]
impl Tool for MailboxCreateEventTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Event title"
                },
                "start": {
                    "type": "string",
                    "description": "Start time, RFC 3339 (e.g. 2026-09-01T14:00:00-07:00)"
                },
                "end": {
                    "type": "string",
                    "description": "End time, RFC 3339"
                },
                "attendees": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Attendee email addresses"
                },
                "description": {
                    "type": "string",
                    "description": "Optional event description"
                }
            }
        })
    }

    fn required_overrides(&self) -> &[&str] {
        &["title", "start", "end"]
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let event: CalendarEvent = serde_json::from_value(arguments).map_err(|e| {
            ToolError::InvalidArguments(format!(
                "Invalid event fields (start/end must be RFC 3339): {e}"
            ))
        })?;

        if event.end <= event.start {
            return Err(ToolError::InvalidArguments(
                "Event end must be after start".into(),
            ));
        }

        let output = self
            .client
            .create_event(event)
            .await
            .map_err(|e| execution_failed(&self.name, e))?;

        Ok(ToolResult::ok(output))
    }
}
