//! Issue-tracker client
//!
//! Ticket names extracted from commit messages are enriched against a Jira
//! instance: every ticket gets a browse URL built from the configured base
//! URL, and when credentials are present the summary is fetched from the
//! REST API. Lookups degrade gracefully: a failed detail request yields a
//! ticket with its URL but no summary. Only rejected credentials abort the
//! run, since every subsequent lookup would fail the same way.

use crate::config::TrackerConfig;
use crate::domain::Ticket;
use crate::error::TrackerError;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

/// Ticket detail lookup against an issue tracker
#[async_trait]
pub trait TicketLookup {
    /// Resolve a ticket name to a ticket with url and, if possible, summary
    async fn ticket_details(&self, name: &str) -> Result<Ticket, TrackerError>;
}

/// Jira REST API client.
///
/// Authenticates with basic auth when an email is configured alongside the
/// token, otherwise with a bearer token. Without any token the client still
/// produces browse URLs but never calls the API.
pub struct JiraClient {
    base_url: String,
    token: String,
    email: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    summary: Option<String>,
}

impl JiraClient {
    /// Build a client from the tracker configuration
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            email: config.email.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Whether a tracker base URL is configured at all
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// Browse URL for a ticket name
    pub fn browse_url(&self, name: &str) -> String {
        format!("{}/browse/{name}", self.base_url)
    }

    async fn fetch_summary(&self, name: &str) -> Result<String, TrackerError> {
        let endpoint = format!(
            "{}/rest/api/2/issue/{name}?fields=summary",
            self.base_url
        );
        let request = if self.email.is_empty() {
            self.client.get(&endpoint).bearer_auth(&self.token)
        } else {
            self.client
                .get(&endpoint)
                .basic_auth(&self.email, Some(&self.token))
        };

        let response = request.send().await.map_err(|e| TrackerError::Http {
            ticket: name.to_string(),
            message: e.to_string(),
        })?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TrackerError::InvalidCredentials {
                url: self.base_url.clone(),
            });
        }
        if !response.status().is_success() {
            return Err(TrackerError::Http {
                ticket: name.to_string(),
                message: format!("status {}", response.status()),
            });
        }

        let issue: IssueResponse =
            response.json().await.map_err(|e| TrackerError::Http {
                ticket: name.to_string(),
                message: e.to_string(),
            })?;
        Ok(issue.fields.summary.unwrap_or_default())
    }
}

#[async_trait]
impl TicketLookup for JiraClient {
    async fn ticket_details(&self, name: &str) -> Result<Ticket, TrackerError> {
        let mut ticket = Ticket::new(name);
        if !self.is_configured() {
            return Ok(ticket);
        }
        ticket.url = self.browse_url(name);
        if self.token.is_empty() {
            debug!("no tracker token configured, skipping summary for {name}");
            return Ok(ticket);
        }

        match self.fetch_summary(name).await {
            Ok(summary) => ticket.summary = summary,
            // Rejected credentials doom every later lookup too
            Err(e @ TrackerError::InvalidCredentials { .. }) => return Err(e),
            Err(e) => warn!("{e}"),
        }
        Ok(ticket)
    }
}
