//! Per-session tool registry construction.
//!
//! The registry is rebuilt for every session from the connection flags, so
//! a tool is only ever offered to the model when its backing integration is
//! actually connected. Disconnected integrations contribute nothing rather
//! than a tool that fails at call time.

use crate::crm::{CrmClient, CrmCreateContactTool, CrmSearchTool};
use crate::mailbox::{
    MailboxClient, MailboxCreateDraftTool, MailboxCreateEventTool, MailboxSearchTool,
};
use crate::stub::{StubCrmClient, StubMailboxClient};
use dealflow_config::IntegrationsConfig;
use dealflow_core::tool::ToolRegistry;
use std::sync::Arc;
use tracing::warn;

/// The collaborators available to this deployment. A `None` client means
/// the integration is not wired up, independent of its connection flag.
#[derive(Clone, Default)]
pub struct IntegrationClients {
    pub crm: Option<Arc<dyn CrmClient>>,
    pub gmail: Option<Arc<dyn MailboxClient>>,
    pub outlook: Option<Arc<dyn MailboxClient>>,
}

impl IntegrationClients {
    /// All integrations backed by in-process stubs, for demos and tests.
    pub fn stubs() -> Self {
        Self {
            crm: Some(Arc::new(StubCrmClient)),
            gmail: Some(Arc::new(StubMailboxClient)),
            outlook: Some(Arc::new(StubMailboxClient)),
        }
    }
}

/// Build the tool registry for a session.
///
/// Each connected integration contributes its tool set; a flag without a
/// wired client is a deployment bug and is logged and skipped.
pub fn build_registry(flags: &IntegrationsConfig, clients: &IntegrationClients) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    if flags.crm_connected {
        if let Some(crm) = &clients.crm {
            registry.register(Box::new(CrmSearchTool::new(crm.clone())));
            registry.register(Box::new(CrmCreateContactTool::new(crm.clone())));
        } else {
            warn!("CRM marked connected but no client is wired; skipping CRM tools");
        }
    }

    if flags.google_connected {
        if let Some(gmail) = &clients.gmail {
            register_mailbox(&mut registry, "gmail", gmail.clone());
        } else {
            warn!("Google marked connected but no client is wired; skipping Gmail tools");
        }
    }

    if flags.outlook_connected {
        if let Some(outlook) = &clients.outlook {
            register_mailbox(&mut registry, "outlook", outlook.clone());
        } else {
            warn!("Outlook marked connected but no client is wired; skipping Outlook tools");
        }
    }

    registry
}

fn register_mailbox(registry: &mut ToolRegistry, label: &str, client: Arc<dyn MailboxClient>) {
    registry.register(Box::new(MailboxSearchTool::new(label, client.clone())));
    registry.register(Box::new(MailboxCreateDraftTool::new(label, client.clone())));
    registry.register(Box::new(MailboxCreateEventTool::new(label, client)));
}
