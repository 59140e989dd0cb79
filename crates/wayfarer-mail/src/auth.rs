//! OAuth credentials for the Gmail API
//!
//! Reads the authorized-user `token.json` written by Google's installed-app
//! flow and refreshes the access token when the API rejects it.

use crate::SourceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default Google OAuth token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Authorized-user credentials as stored in `token.json`
///
/// Unknown keys (scopes, expiry, universe_domain) are kept so a refreshed
/// file stays readable by other Google tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    /// Current access token
    #[serde(default)]
    pub token: Option<String>,

    /// Long-lived refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// OAuth client id
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,

    #[serde(skip)]
    path: Option<PathBuf>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
}

impl AuthorizedUser {
    /// Credentials holding only an access token, without refresh capability
    pub fn from_access_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            refresh_token: None,
            client_id: None,
            client_secret: None,
            token_uri: default_token_uri(),
            extra: serde_json::Map::new(),
            path: None,
        }
    }

    /// Load credentials from a `token.json` file
    ///
    /// A refreshed token is written back to the same file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut user: AuthorizedUser = serde_json::from_str(&contents)
            .map_err(|e| SourceError::Auth(format!("{}: {}", path.display(), e)))?;
        user.path = Some(path.to_path_buf());
        debug!("Loaded credentials from {}", path.display());
        Ok(user)
    }

    /// Current bearer token
    pub fn access_token(&self) -> Result<&str, SourceError> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| SourceError::Auth("no access token; refresh required".to_string()))
    }

    /// True when a refresh can be attempted
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Exchange the refresh token for a new access token
    pub fn refresh(&mut self, client: &reqwest::blocking::Client) -> Result<(), SourceError> {
        let (Some(refresh_token), Some(client_id), Some(client_secret)) =
            (&self.refresh_token, &self.client_id, &self.client_secret)
        else {
            return Err(SourceError::Auth(
                "credentials cannot be refreshed: refresh_token, client_id and client_secret are required"
                    .to_string(),
            ));
        };

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ];
        let response = client.post(&self.token_uri).form(&form).send()?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(SourceError::Auth(format!("token refresh failed ({}): {}", status, message)));
        }

        let refreshed: RefreshResponse = response.json()?;
        self.token = Some(refreshed.access_token);
        info!("Refreshed Gmail access token");

        if let Some(path) = &self.path {
            self.save(path)?;
        }
        Ok(())
    }

    /// Write the credentials as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SourceError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TOKEN_JSON: &str = r#"{
        "token": "ya29.old",
        "refresh_token": "1//refresh",
        "client_id": "id.apps.googleusercontent.com",
        "client_secret": "secret",
        "scopes": ["https://www.googleapis.com/auth/gmail.readonly"],
        "expiry": "2024-01-01T00:00:00Z"
    }"#;

    #[test]
    fn test_load_authorized_user() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, TOKEN_JSON).unwrap();

        let user = AuthorizedUser::load(&path).unwrap();
        assert_eq!(user.access_token().unwrap(), "ya29.old");
        assert_eq!(user.token_uri, DEFAULT_TOKEN_URI);
        assert!(user.can_refresh());
    }

    #[test]
    fn test_save_keeps_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, TOKEN_JSON).unwrap();

        let user = AuthorizedUser::load(&path).unwrap();
        user.save(&path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["scopes"][0], "https://www.googleapis.com/auth/gmail.readonly");
        assert_eq!(value["expiry"], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_access_token_only() {
        let user = AuthorizedUser::from_access_token("abc");
        assert_eq!(user.access_token().unwrap(), "abc");
        assert!(!user.can_refresh());
    }

    #[test]
    fn test_refresh_without_secrets_fails() {
        let mut user = AuthorizedUser::from_access_token("abc");
        let client = reqwest::blocking::Client::new();
        assert!(matches!(user.refresh(&client), Err(SourceError::Auth(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = AuthorizedUser::load("/nonexistent/token.json");
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
