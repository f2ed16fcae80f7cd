use std::time::Duration;

/// The REST production endpoint for GitHub.
pub const GITHUB_REST_ENDPOINT: &str = "https://api.github.com";

/// The default timeout of each resource call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// The default delay before a lookup hits the network.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Configuration of the lookup stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfiguration {
    /// The base URL of the REST API.
    pub endpoint: String,

    /// An optional API token used for elevated rate limits.
    pub api_token: Option<String>,

    /// The timeout of each resource call.
    pub timeout: Duration,

    /// The delay a lookup waits, cancellable, before fetching.
    pub debounce: Duration,
}

impl Default for LookupConfiguration {
    fn default() -> Self {
        Self {
            endpoint: GITHUB_REST_ENDPOINT.to_string(),
            api_token: None,
            timeout: DEFAULT_TIMEOUT,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}
