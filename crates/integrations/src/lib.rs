//! External integrations for dealflow: CRM, Gmail, and Outlook.
//!
//! Each integration is a small async client trait plus the tools that wrap
//! it. The per-session [`registry::build_registry`] decides which tools the
//! model sees, driven purely by connection flags.

pub mod crm;
pub mod error;
pub mod mailbox;
pub mod registry;
pub mod stub;

pub use crm::{CrmClient, CrmCreateContactTool, CrmSearchTool, NewContact};
pub use error::IntegrationError;
pub use mailbox::{
    CalendarEvent, DraftEmail, MailboxClient, MailboxCreateDraftTool, MailboxCreateEventTool,
    MailboxSearchTool,
};
pub use registry::{IntegrationClients, build_registry};
pub use stub::{StubCrmClient, StubMailboxClient};
