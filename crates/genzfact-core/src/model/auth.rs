//! Credentials for the Vertex AI endpoint.
//!
//! A configured access token is sent as-is. Otherwise requests to Google use
//! Application Default Credentials, whose tokens the provider caches and
//! refreshes before they expire. A custom endpoint without a token is called
//! anonymously.

use gcp_auth::TokenProvider;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::GenzConfig;
use crate::error::{GenzError, GenzResult};

/// OAuth scope required by the prediction service.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

pub enum Credentials {
    /// Fixed bearer token from configuration.
    Static(String),
    /// Application Default Credentials, discovered on first use.
    ApplicationDefault(OnceCell<Arc<dyn TokenProvider>>),
    /// No `Authorization` header.
    Anonymous,
}

impl Credentials {
    pub fn from_config(config: &GenzConfig) -> Self {
        match (&config.access_token, &config.endpoint) {
            (Some(token), _) => Self::Static(token.clone()),
            (None, Some(_)) => Self::Anonymous,
            (None, None) => Self::ApplicationDefault(OnceCell::new()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Static(_) => "access-token",
            Self::ApplicationDefault(_) => "application-default",
            Self::Anonymous => "anonymous",
        }
    }

    /// Bearer token for the next request, if any.
    pub async fn bearer_token(&self) -> GenzResult<Option<String>> {
        match self {
            Self::Static(token) => Ok(Some(token.clone())),
            Self::Anonymous => Ok(None),
            Self::ApplicationDefault(cell) => {
                let provider = cell
                    .get_or_try_init(|| async {
                        debug!("Discovering Application Default Credentials");
                        gcp_auth::provider().await
                    })
                    .await
                    .map_err(|e| GenzError::Auth(e.to_string()))?;

                let token = provider
                    .token(&[CLOUD_PLATFORM_SCOPE])
                    .await
                    .map_err(|e| GenzError::Auth(e.to_string()))?;
                Ok(Some(token.as_str().to_string()))
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}
