//! Gmail REST API source
//!
//! Lists matching messages with `users/me/messages?q=` and fetches each one
//! with `format=full`. The page token Gmail returns is the batch cursor.
//!
//! # Examples
//!
//! ```no_run
//! use wayfarer_domain::traits::DocumentSource;
//! use wayfarer_mail::{AuthorizedUser, GmailSource};
//!
//! let credentials = AuthorizedUser::load("token.json").unwrap();
//! let mut gmail = GmailSource::new(credentials);
//! let batch = gmail.search("your flight itinerary", 4, None).unwrap();
//! println!("{} messages", batch.documents.len());
//! ```

use crate::auth::AuthorizedUser;
use crate::mime::{extract_body, MessagePart};
use crate::SourceError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use wayfarer_domain::traits::DocumentSource;
use wayfarer_domain::{Batch, Cursor, Document};

/// Gmail API base URL
pub const DEFAULT_ENDPOINT: &str = "https://gmail.googleapis.com/gmail/v1";

/// Default request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gmail caps `maxResults` at 500
pub const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    id: String,
    #[serde(default)]
    thread_id: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    payload: MessagePart,
}

impl Message {
    fn into_document(self) -> Result<Document, SourceError> {
        let body = extract_body(&self.payload)?;
        let mut document = Document::new(self.id, body);
        if let Some(thread_id) = self.thread_id {
            document = document.with_metadata("thread_id", thread_id);
        }
        if let Some(snippet) = self.snippet {
            document = document.with_metadata("snippet", snippet);
        }
        Ok(document)
    }
}

/// Document source backed by a Gmail mailbox
pub struct GmailSource {
    endpoint: String,
    credentials: AuthorizedUser,
    client: reqwest::blocking::Client,
}

fn build_client(timeout: Duration) -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::blocking::Client::new())
}

impl GmailSource {
    /// Create a source for the authenticated user's mailbox
    pub fn new(credentials: AuthorizedUser) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credentials,
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    /// Point at a different API base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    fn list_url(&self) -> String {
        format!("{}/users/me/messages", self.endpoint)
    }

    fn message_url(&self, id: &str) -> String {
        format!("{}/users/me/messages/{}", self.endpoint, id)
    }

    /// GET a JSON resource, refreshing the access token once on 401
    fn get_json<T: DeserializeOwned>(
        &mut self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let mut refreshed = false;
        loop {
            if self.credentials.token.is_none() && self.credentials.can_refresh() && !refreshed {
                self.credentials.refresh(&self.client)?;
                refreshed = true;
            }

            let response = self
                .client
                .get(url)
                .bearer_auth(self.credentials.access_token()?)
                .query(params)
                .send()?;
            let status = response.status();

            if status == reqwest::StatusCode::UNAUTHORIZED && !refreshed && self.credentials.can_refresh() {
                warn!("Gmail rejected access token, refreshing");
                self.credentials.refresh(&self.client)?;
                refreshed = true;
                continue;
            }
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(SourceError::Auth(format!("Gmail returned {}", status)));
            }
            if !status.is_success() {
                let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());
                return Err(SourceError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            return response
                .json::<T>()
                .map_err(|e| SourceError::Decode(format!("Gmail response: {}", e)));
        }
    }
}

impl DocumentSource for GmailSource {
    type Error = SourceError;

    fn search(
        &mut self,
        query: &str,
        batch_size: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Batch, SourceError> {
        if batch_size == 0 {
            return Err(SourceError::InvalidRequest("batch size must be positive".to_string()));
        }

        let mut params = vec![
            ("q", query.to_string()),
            ("maxResults", batch_size.min(MAX_PAGE_SIZE).to_string()),
        ];
        if let Some(cursor) = cursor {
            params.push(("pageToken", cursor.as_str().to_string()));
        }

        let url = self.list_url();
        let list: MessageList = self.get_json(&url, &params)?;
        debug!(
            "Gmail listed {} messages, more: {}",
            list.messages.len(),
            list.next_page_token.is_some()
        );

        let full = [("format", "full".to_string())];
        let mut documents = Vec::with_capacity(list.messages.len());
        for reference in list.messages {
            let url = self.message_url(&reference.id);
            let message: Message = self.get_json(&url, &full)?;
            let document = message.into_document()?;
            if document.body.trim().is_empty() {
                debug!("Skipping message {} without a text body", document.id);
                continue;
            }
            documents.push(document);
        }

        info!("Fetched {} Gmail documents", documents.len());
        Ok(Batch::new(documents, list.next_page_token.map(Cursor::new)))
    }
}
