//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then explicit overrides (CLI flags). The result is
//! immutable and shared read-only by every request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::badge::BadgePalette;
use crate::error::{GenzError, GenzResult};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "genzfact.toml";

pub const DEFAULT_PROJECT_ID: &str = "genzfact";
pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// 20 MiB, the inline-data ceiling of the generateContent endpoint.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Instruction prepended to every request; defines the report layout.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"You are GenzFact, a specialized AI assistant designed to demystify complex legal documents
and identify potentially misleading information.

Always output ONLY in this exact formatted structure (Markdown, no extra text):

1. What is misinformation?
   - <answer here>

2. Extracted Misinformation Breakdown
   - <answer here>

3. Verification Panel:
   - Badge: true / false / unverified / mislead
   - Evidence Links:
     - <link1>
     - <link2>

4. AI Explanation
   - <answer here>

5. Credibility Score (0-100)
   - <number>
"#;

/// Environment variables read by [`GenzConfig::apply_env`].
pub const ENV_PROJECT_ID: &str = "GENZFACT_PROJECT_ID";
pub const ENV_LOCATION: &str = "GENZFACT_LOCATION";
pub const ENV_MODEL: &str = "GENZFACT_MODEL";
pub const ENV_ENDPOINT: &str = "GENZFACT_ENDPOINT";
pub const ENV_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";

/// Effective configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenzConfig {
    /// Cloud project that hosts the model.
    pub project_id: String,
    /// Region of the model endpoint.
    pub location: String,
    pub model: String,
    /// Base URL of the prediction service. Derived from `location` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// OAuth bearer token. Never serialized.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub system_instruction: String,
    pub max_upload_bytes: usize,
    /// Per-request timeout in seconds; 0 waits indefinitely.
    pub request_timeout_secs: u64,
    pub palette: BadgePalette,
}

impl Default for GenzConfig {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: None,
            access_token: None,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: 0,
            palette: BadgePalette::default(),
        }
    }
}

/// Explicit values that win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub project_id: Option<String>,
    pub location: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

impl GenzConfig {
    /// Load configuration from all layers.
    ///
    /// An explicit `path` must exist; the default `genzfact.toml` is optional.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> GenzResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env();
        config.apply_overrides(overrides);
        config.validate()?;

        debug!(
            project_id = %config.project_id,
            location = %config.location,
            model = %config.model,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> GenzResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GenzError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> GenzResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply environment-style lookups. Empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_PROJECT_ID) {
            self.project_id = v;
        }
        if let Some(v) = get(ENV_LOCATION) {
            self.location = v;
        }
        if let Some(v) = get(ENV_MODEL) {
            self.model = v;
        }
        if let Some(v) = get(ENV_ENDPOINT) {
            self.endpoint = Some(v);
        }
        if let Some(v) = get(ENV_ACCESS_TOKEN) {
            self.access_token = Some(v);
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = &overrides.project_id {
            self.project_id = v.clone();
        }
        if let Some(v) = &overrides.location {
            self.location = v.clone();
        }
        if let Some(v) = &overrides.model {
            self.model = v.clone();
        }
        if let Some(v) = &overrides.endpoint {
            self.endpoint = Some(v.clone());
        }
    }

    pub fn validate(&self) -> GenzResult<()> {
        if self.project_id.trim().is_empty() {
            return Err(GenzError::config("project_id must not be empty"));
        }
        if self.location.trim().is_empty() {
            return Err(GenzError::config("location must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(GenzError::config("model must not be empty"));
        }
        if self.max_upload_bytes == 0 {
            return Err(GenzError::config("max_upload_bytes must be greater than zero"));
        }
        Ok(())
    }

    /// Base URL of the prediction service, without a trailing slash.
    pub fn endpoint_base(&self) -> String {
        match &self.endpoint {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}-aiplatform.googleapis.com", self.location),
        }
    }

    /// Full URL of the generateContent call for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.endpoint_base(),
            self.project_id,
            self.location,
            self.model
        )
    }

    /// Access token suitable for display.
    pub fn masked_token(&self) -> String {
        match &self.access_token {
            Some(token) if token.chars().count() > 8 => {
                let head: String = token.chars().take(4).collect();
                format!("{}…", head)
            }
            Some(_) => "****".to_string(),
            None => "(not set)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = GenzConfig::default();
        assert_eq!(config.project_id, "genzfact");
        assert_eq!(config.location, "us-central1");
        assert_eq!(config.model, "gemini-2.5-pro");
        assert!(config.system_instruction.contains("Badge: true / false / unverified / mislead"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generate_url_from_location() {
        let config = GenzConfig::default();
        assert_eq!(
            config.generate_url(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/genzfact/locations/us-central1/publishers/google/models/gemini-2.5-pro:generateContent"
        );
    }

    #[test]
    fn test_endpoint_override_strips_trailing_slash() {
        let config = GenzConfig {
            endpoint: Some("http://127.0.0.1:9000/".to_string()),
            ..GenzConfig::default()
        };
        assert!(config
            .generate_url()
            .starts_with("http://127.0.0.1:9000/v1/projects/genzfact/"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GenzConfig::from_toml(
            r##"
            project_id = "newsroom"
            max_upload_bytes = 1024

            [palette]
            MISLEAD = "#FDD835"
            "##,
        )
        .unwrap();

        assert_eq!(config.project_id, "newsroom");
        assert_eq!(config.location, DEFAULT_LOCATION);
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.palette.mislead_color, "#FDD835");
        assert_eq!(config.palette.true_color, "#4CAF50");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            GenzConfig::from_toml("project_id = ["),
            Err(GenzError::Toml(_))
        ));
    }

    #[test]
    fn test_env_layer() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_LOCATION, "europe-west4"),
            (ENV_MODEL, "gemini-2.5-flash"),
            (ENV_ACCESS_TOKEN, "ya29.secret-token"),
            (ENV_PROJECT_ID, "  "),
        ]);
        let mut config = GenzConfig::default();
        config.apply_env_with(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.location, "europe-west4");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.access_token.as_deref(), Some("ya29.secret-token"));
        assert_eq!(config.project_id, DEFAULT_PROJECT_ID);
    }

    #[test]
    fn test_overrides_win() {
        let mut config = GenzConfig::default();
        config.apply_env_with(|k| (k == ENV_MODEL).then(|| "from-env".to_string()));
        config.apply_overrides(&ConfigOverrides {
            model: Some("from-flag".to_string()),
            ..ConfigOverrides::default()
        });
        assert_eq!(config.model, "from-flag");
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let config = GenzConfig {
            model: String::new(),
            ..GenzConfig::default()
        };
        assert!(matches!(config.validate(), Err(GenzError::Config(_))));

        let config = GenzConfig {
            max_upload_bytes: 0,
            ..GenzConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_is_not_serialized() {
        let config = GenzConfig {
            access_token: Some("ya29.secret-token".to_string()),
            ..GenzConfig::default()
        };
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("secret"));
        assert_eq!(config.masked_token(), "ya29…");
    }
}
