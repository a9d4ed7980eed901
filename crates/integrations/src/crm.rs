//! CRM integration — record search and contact creation.
//!
//! The [`CrmClient`] trait is the collaborator boundary; tools validate and
//! shape arguments, the client does the actual I/O. Production wires in an
//! HTTP-backed client, tests and demos use stubs.

use crate::error::IntegrationError;
use async_trait::async_trait;
use dealflow_core::error::ToolError;
use dealflow_core::tool::{RecoveryPolicy, Tool, ToolResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A contact to be created in the CRM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Async boundary to the CRM backend.
#[async_trait]
pub trait CrmClient: Send + Sync {
    /// Search records of the given object type (`contacts`, `leads`,
    /// `opportunities`). `filter` is a structured filter expression in the
    /// CRM's query sublanguage; `None` lists the most recent records.
    async fn search(
        &self,
        object: &str,
        filter: Option<&str>,
        limit: u64,
    ) -> Result<String, IntegrationError>;

    /// Create a contact, returning a human-readable confirmation.
    async fn create_contact(&self, contact: NewContact) -> Result<String, IntegrationError>;
}

const SEARCH_DEFAULT_LIMIT: u64 = 10;
const SEARCH_MAX_LIMIT: u64 = 50;

/// Searches CRM records. Tolerates empty arguments (defaults to listing
/// recent contacts) and filter queries with embedded quotes (rewritten to an
/// unfiltered bounded search).
pub struct CrmSearchTool {
    client: Arc<dyn CrmClient>,
}

impl CrmSearchTool {
    pub fn new(client: Arc<dyn CrmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CrmSearchTool {
    fn name(&self) -> &str {
        "crm_search"
    }

    fn description(&self) -> &str {
        "Search CRM records. Supports contacts, leads, and opportunities, with an optional structured filter expression."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "object": {
                    "type": "string",
                    "enum": ["contacts", "leads", "opportunities"],
                    "description": "Which record type to search"
                },
                "filter": {
                    "type": "string",
                    "description": "Optional filter expression, e.g. stage = 'negotiation'"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of records to return (default 10)",
                    "default": 10
                }
            }
        })
    }

    fn required_overrides(&self) -> &[&str] {
        &["object"]
    }

    fn recovery_policies(&self) -> Vec<RecoveryPolicy> {
        vec![
            RecoveryPolicy::DefaultArguments(serde_json::json!({
                "object": "contacts",
                "limit": SEARCH_DEFAULT_LIMIT,
            })),
            RecoveryPolicy::StripQuotedFilter {
                field: "filter",
                limit_field: "limit",
                limit: 20,
            },
        ]
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let object = arguments["object"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'object' argument".into()))?
            .to_string();

        let filter = arguments["filter"].as_str().map(str::to_string);
        let limit = arguments["limit"]
            .as_u64()
            .unwrap_or(SEARCH_DEFAULT_LIMIT)
            .min(SEARCH_MAX_LIMIT);

        let output = self
            .client
            .search(&object, filter.as_deref(), limit)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "crm_search".into(),
                reason: e.to_string(),
            })?;

        Ok(ToolResult::ok(output))
    }
}

/// Creates a contact in the CRM. No recovery policies: creating a record
/// from guessed arguments is worse than asking the model to retry.
pub struct CrmCreateContactTool {
    client: Arc<dyn CrmClient>,
}

impl CrmCreateContactTool {
    pub fn new(client: Arc<dyn CrmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CrmCreateContactTool {
    fn name(&self) -> &str {
        "crm_create_contact"
    }

    fn description(&self) -> &str {
        "Create a new contact in the CRM with a name, email, and optional company and title."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Full name of the contact"
                },
                "email": {
                    "type": "string",
                    "description": "Email address"
                },
                "company": {
                    "type": "string",
                    "description": "Company the contact works for"
                },
                "title": {
                    "type": "string",
                    "description": "Job title"
                }
            }
        })
    }

    fn required_overrides(&self) -> &[&str] {
        &["name", "email"]
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError> {
        let contact: NewContact = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(format!("Invalid contact fields: {e}")))?;

        if contact.name.trim().is_empty() || contact.email.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "Both 'name' and 'email' are required".into(),
            ));
        }

        let output = self
            .client
            .create_contact(contact)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "crm_create_contact".into(),
                reason: e.to_string(),
            })?;

        Ok(ToolResult::ok(output))
    }
}
