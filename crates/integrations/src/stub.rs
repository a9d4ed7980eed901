//! Stub clients that return plausible data without network access.
//!
//! Used by demos and end-to-end tests so the full agent loop can run
//! against deterministic collaborators.

use crate::crm::{CrmClient, NewContact};
use crate::error::IntegrationError;
use crate::mailbox::{CalendarEvent, DraftEmail, MailboxClient};
use async_trait::async_trait;

pub struct StubCrmClient;

#[async_trait]
impl CrmClient for StubCrmClient {
    async fn search(
        &self,
        object: &str,
        filter: Option<&str>,
        limit: u64,
    ) -> Result<String, IntegrationError> {
        let records: Vec<&str> = match object {
            "contacts" => vec![
                "Maria Santos <maria@acmecorp.test> — VP Engineering, Acme Corp",
                "James Wu <james@initech.test> — Procurement Lead, Initech",
            ],
            "leads" => vec![
                "Priya Nair — inbound demo request, Globex (score 82)",
                "Tom Beck — webinar signup, Umbrella Logistics (score 64)",
            ],
            "opportunities" => vec![
                "Acme Corp renewal — $48,000, stage: negotiation, close: 2026-09-30",
                "Globex pilot — $12,500, stage: proposal, close: 2026-10-15",
            ],
            other => {
                return Err(IntegrationError::InvalidRequest(format!(
                    "Unknown object type '{other}'"
                )));
            }
        };

        let shown: Vec<&str> = records.into_iter().take(limit as usize).collect();
        let header = match filter {
            Some(f) => format!("{} {} matching `{}`:\n", shown.len(), object, f),
            None => format!("{} recent {}:\n", shown.len(), object),
        };
        Ok(header + &shown.join("\n"))
    }

    async fn create_contact(&self, contact: NewContact) -> Result<String, IntegrationError> {
        Ok(format!(
            "Created contact {} <{}> (id: C-1042)",
            contact.name, contact.email
        ))
    }
}

pub struct StubMailboxClient;

#[async_trait]
impl MailboxClient for StubMailboxClient {
    async fn search_messages(
        &self,
        query: &str,
        limit: u64,
    ) -> Result<String, IntegrationError> {
        let count = limit.min(2);
        Ok(format!(
            "{count} messages matching '{query}':\n\
             1. Maria Santos — Re: renewal pricing (yesterday)\n\
             2. James Wu — Security questionnaire (3 days ago)"
        ))
    }

    async fn create_draft(&self, draft: DraftEmail) -> Result<String, IntegrationError> {
        Ok(format!(
            "Draft saved to {} recipient(s): \"{}\"",
            draft.to.len(),
            draft.subject
        ))
    }

    async fn create_event(&self, event: CalendarEvent) -> Result<String, IntegrationError> {
        Ok(format!(
            "Event \"{}\" created for {} ({} attendee(s))",
            event.title,
            event.start.to_rfc3339(),
            event.attendees.len()
        ))
    }
}
