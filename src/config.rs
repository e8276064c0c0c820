//! Configuration for the session core.
//!
//! [`SessionConfig`] holds host-level settings resolved once at startup;
//! [`SessionParams`] carries the per-session inputs (credentials and prompt
//! inputs) that initialization consumes and the reconnect policy stores.

use std::time::Duration;

use crate::prompt::PromptTemplate;

/// Default chat-completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model route.
pub const DEFAULT_MODEL: &str = "openrouter/auto";

/// Default whole-request timeout; doubles as the stall guard for a stream
/// that hangs without closing.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default bound on reconnection attempts.
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Default fixed delay before each reconnection attempt.
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Resolved configuration for a [`crate::SessionManager`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model identifier sent with every request.
    pub model: String,

    /// Chat-completion endpoint URL.
    pub endpoint: String,

    /// Whether sends include the full pruned history or only the newest
    /// message.
    pub use_history: bool,

    /// Whether the prompt template's search-usage section is included.
    pub search_enabled: bool,

    /// Bound on reconnection attempts after an unexpected disconnect.
    pub max_reconnect_attempts: u32,

    /// Fixed delay before each reconnection attempt.
    pub reconnect_delay: Duration,

    /// Whole-request timeout for the HTTP client.
    pub request_timeout: Duration,

    /// Optional `HTTP-Referer` header identifying the app to the endpoint.
    pub app_referer: Option<String>,

    /// Optional `X-Title` header identifying the app to the endpoint.
    pub app_title: Option<String>,

    /// System prompt template assembled at initialization.
    pub template: PromptTemplate,
}

impl SessionConfig {
    /// Creates a new config with defaults.
    ///
    /// Defaults:
    /// - Endpoint: the public chat-completions route
    /// - Model: auto-routing
    /// - History: enabled
    /// - Reconnects: 3 attempts, 10 s apart
    /// - Request timeout: 60 s
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            use_history: true,
            search_enabled: false,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            app_referer: None,
            app_title: None,
            template: PromptTemplate::new(),
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Enables or disables sending conversation history.
    pub fn with_use_history(mut self, use_history: bool) -> Self {
        self.use_history = use_history;
        self
    }

    /// Enables or disables the search-usage prompt section.
    pub fn with_search_enabled(mut self, search_enabled: bool) -> Self {
        self.search_enabled = search_enabled;
        self
    }

    /// Sets the reconnection attempt bound.
    pub fn with_max_reconnect_attempts(mut self, max_reconnect_attempts: u32) -> Self {
        self.max_reconnect_attempts = max_reconnect_attempts;
        self
    }

    /// Sets the fixed reconnection delay.
    pub fn with_reconnect_delay(mut self, reconnect_delay: Duration) -> Self {
        self.reconnect_delay = reconnect_delay;
        self
    }

    /// Sets the whole-request timeout.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Sets the `HTTP-Referer` header value.
    pub fn with_app_referer(mut self, app_referer: impl Into<String>) -> Self {
        self.app_referer = Some(app_referer.into());
        self
    }

    /// Sets the `X-Title` header value.
    pub fn with_app_title(mut self, app_title: impl Into<String>) -> Self {
        self.app_title = Some(app_title.into());
        self
    }

    /// Sets the prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-session inputs: credentials plus the prompt inputs the host supplies.
///
/// Stored by the reconnect policy as the parameters needed to recreate the
/// session; cleared on close so stray reconnection attempts cannot reuse
/// stale credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Bearer credential for the endpoint.
    pub api_key: String,

    /// User-provided prompt context, fenced into the system prompt.
    pub custom_prompt: String,

    /// Named assistant profile selected in the host UI.
    pub profile: String,

    /// BCP 47 language tag selected in the host UI.
    pub language: String,
}

impl SessionParams {
    /// Creates params with the given credential and default profile inputs.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            custom_prompt: String::new(),
            profile: "interview".to_string(),
            language: "en-US".to_string(),
        }
    }

    /// Sets the custom prompt context.
    pub fn with_custom_prompt(mut self, custom_prompt: impl Into<String>) -> Self {
        self.custom_prompt = custom_prompt.into();
        self
    }

    /// Sets the profile name.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Sets the language tag.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SessionConfig::new();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.use_history);
        assert!(!config.search_enabled);
        assert_eq!(config.max_reconnect_attempts, 3);
        assert_eq!(config.reconnect_delay, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert!(config.app_referer.is_none());
        assert!(config.app_title.is_none());
    }

    #[test]
    fn config_builder_pattern() {
        let config = SessionConfig::new()
            .with_model("acme/overlay-1")
            .with_endpoint("https://example.com/v1/chat/completions")
            .with_use_history(false)
            .with_search_enabled(true)
            .with_max_reconnect_attempts(5)
            .with_reconnect_delay(Duration::from_secs(2))
            .with_request_timeout(Duration::from_secs(120))
            .with_app_referer("https://example.com")
            .with_app_title("Example Overlay");

        assert_eq!(config.model, "acme/overlay-1");
        assert_eq!(config.endpoint, "https://example.com/v1/chat/completions");
        assert!(!config.use_history);
        assert!(config.search_enabled);
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.reconnect_delay, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.app_referer.as_deref(), Some("https://example.com"));
        assert_eq!(config.app_title.as_deref(), Some("Example Overlay"));
    }

    #[test]
    fn session_params_defaults() {
        let params = SessionParams::new("sk-test")
            .with_custom_prompt("context")
            .with_profile("meeting")
            .with_language("de-DE");

        assert_eq!(params.api_key, "sk-test");
        assert_eq!(params.custom_prompt, "context");
        assert_eq!(params.profile, "meeting");
        assert_eq!(params.language, "de-DE");
    }
}
