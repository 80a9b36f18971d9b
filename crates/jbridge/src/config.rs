use serde::{Deserialize, Serialize};

/// Environment variable that turns on debug logging in [`BridgeConfig::from_env`].
pub const DEBUG_ENV_VAR: &str = "JBRIDGE_DEBUG";

/// Runtime configuration of a thread attachment.
///
/// ```
/// use jbridge::BridgeConfig;
///
/// let config = BridgeConfig::new().debug(true);
/// assert!(config.describe_remote_exceptions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Log bridge events to stderr.
    pub debug: bool,
    /// Capture the remote exception's description into the host error message
    /// when a pending remote exception is consumed.
    pub describe_remote_exceptions: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            debug: false,
            describe_remote_exceptions: true,
        }
    }
}

impl BridgeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn describe_remote_exceptions(mut self, describe: bool) -> Self {
        self.describe_remote_exceptions = describe;
        self
    }

    /// Parses a configuration from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builds the default configuration, enabling `debug` when `JBRIDGE_DEBUG`
    /// is set to anything other than `0`, `false` or the empty string.
    #[must_use]
    pub fn from_env() -> Self {
        let debug = std::env::var(DEBUG_ENV_VAR)
            .map(|value| !matches!(value.trim(), "" | "0" | "false"))
            .unwrap_or(false);
        Self::default().debug(debug)
    }
}
