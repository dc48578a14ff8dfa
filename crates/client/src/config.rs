use thumbforge_core::wire::GENERATE_PATH;
use url::Url;

/// Environment variable overriding the service base URL.
pub const ENV_API_URL: &str = "THUMBFORGE_API_URL";

/// Hosted generation service used when no override is set.
pub const DEFAULT_API_URL: &str = "https://mehotter-thumbnail-forge-backend.hf.space";

/// Client configuration.
///
/// | Env Var              | Default              |
/// |----------------------|----------------------|
/// | `THUMBFORGE_API_URL` | [`DEFAULT_API_URL`]  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeConfig {
    /// Base URL without a trailing slash, e.g. `https://host` or `https://host/forge`.
    api_url: String,
    base: Url,
}

/// Errors raised while building a [`ForgeConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("THUMBFORGE_API_URL must be an absolute http(s) URL, got '{value}': {reason}")]
    InvalidApiUrl { value: String, reason: String },
}

impl ForgeConfig {
    /// Build a configuration for the service at `api_url`.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        let trimmed = api_url.trim().trim_end_matches('/');
        let invalid = |reason: String| ConfigError::InvalidApiUrl {
            value: api_url.to_string(),
            reason,
        };

        let base = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }

        Ok(Self {
            api_url: trimmed.to_string(),
            base,
        })
    }

    /// Load `.env` if present, then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Read configuration from environment variables with defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup(ENV_API_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(&api_url)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Full URL of the generation endpoint.
    pub fn generate_url(&self) -> String {
        format!("{}{}", self.api_url, GENERATE_PATH)
    }

    /// Resolve an asset URL against the service origin, the way a browser
    /// resolves a root-relative link. Absolute URLs are returned unchanged.
    pub fn resolve(&self, reference: &str) -> Result<Url, url::ParseError> {
        self.base.join(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_hosted_service() {
        let config = ForgeConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ForgeConfig::new(DEFAULT_API_URL).unwrap());
        assert_eq!(
            config.generate_url(),
            "https://mehotter-thumbnail-forge-backend.hf.space/api/generate"
        );
    }

    #[test]
    fn env_override_is_used() {
        let config = ForgeConfig::from_lookup(|key| {
            (key == ENV_API_URL).then(|| "http://127.0.0.1:5000/".to_string())
        })
        .unwrap();
        assert_eq!(config.api_url(), "http://127.0.0.1:5000");
        assert_eq!(config.generate_url(), "http://127.0.0.1:5000/api/generate");
    }

    #[test]
    fn blank_override_falls_back_to_default() {
        let config = ForgeConfig::from_lookup(|_| Some("  ".into())).unwrap();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn path_prefix_is_kept_for_generate_url() {
        let config = ForgeConfig::new("https://host/forge").unwrap();
        assert_eq!(config.generate_url(), "https://host/forge/api/generate");
    }

    #[test]
    fn relative_or_non_http_urls_rejected() {
        assert!(ForgeConfig::new("localhost:5000").is_err());
        assert!(ForgeConfig::new("/api").is_err());
        assert!(ForgeConfig::new("ftp://host").is_err());
    }

    #[test]
    fn resolve_root_relative_against_origin() {
        let config = ForgeConfig::new("https://host/forge").unwrap();
        assert_eq!(
            config.resolve("/out/a.jpg").unwrap().as_str(),
            "https://host/out/a.jpg"
        );
        assert_eq!(
            config.resolve("http://cdn.example/a.jpg").unwrap().as_str(),
            "http://cdn.example/a.jpg"
        );
    }
}
