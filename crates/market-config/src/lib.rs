//! Configuration for the marketplace client.
//!
//! Configuration is read from TOML. The backend base URL, the session
//! storage backend, the polling intervals and the UI timings all come from
//! here; nothing else in the workspace hardcodes a host.
//!
//! ## Modular Configuration Support
//!
//! Files may pull in other files with `include = ["a.toml", "b.toml"]`.
//! Every top-level section must be defined in exactly one file.
//! `${VAR}` and `${VAR:-default}` are substituted from the environment
//! before parsing.

#[cfg(feature = "testing")]
pub mod builders {
	pub mod config;
}
mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep only the message, not the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the marketplace client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// REST backend connection settings.
	pub client: ClientConfig,
	/// Where the session credential is kept.
	pub session: SessionConfig,
	/// Background refresh intervals.
	#[serde(default)]
	pub polling: PollingConfig,
	/// Presentation timings.
	#[serde(default)]
	pub ui: UiConfig,
}

/// REST backend connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	/// Base URL every API path is joined under, e.g. `https://host/api`.
	pub base_url: String,
	/// Request timeout in seconds.
	#[serde(default = "default_timeout_seconds")]
	pub timeout_seconds: u64,
	/// User agent sent with every request.
	#[serde(default = "default_user_agent")]
	pub user_agent: String,
}

impl ClientConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_seconds)
	}
}

fn default_timeout_seconds() -> u64 {
	30
}

fn default_user_agent() -> String {
	concat!("gigmarket/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Session storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
	/// Which storage implementation holds the session.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
	/// Name the credential is stored under, allowing several accounts side by side.
	#[serde(default = "default_profile")]
	pub profile: String,
}

fn default_profile() -> String {
	"default".to_string()
}

/// Polling intervals for the background refresh loops.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
	/// Interval between notification unread-count refreshes.
	#[serde(default = "default_notifications_interval")]
	pub notifications_interval_seconds: u64,
	/// Interval between refreshes of an open message thread.
	#[serde(default = "default_messages_interval")]
	pub messages_interval_seconds: u64,
}

impl Default for PollingConfig {
	fn default() -> Self {
		Self {
			notifications_interval_seconds: default_notifications_interval(),
			messages_interval_seconds: default_messages_interval(),
		}
	}
}

impl PollingConfig {
	pub fn notifications_interval(&self) -> Duration {
		Duration::from_secs(self.notifications_interval_seconds)
	}

	pub fn messages_interval(&self) -> Duration {
		Duration::from_secs(self.messages_interval_seconds)
	}
}

fn default_notifications_interval() -> u64 {
	30
}

fn default_messages_interval() -> u64 {
	5
}

/// Presentation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
	/// How long a toast stays visible, in milliseconds.
	#[serde(default = "default_toast_duration_ms")]
	pub toast_duration_ms: u64,
	/// Posts requested per feed page.
	#[serde(default = "default_feed_page_size")]
	pub feed_page_size: u32,
}

impl Default for UiConfig {
	fn default() -> Self {
		Self {
			toast_duration_ms: default_toast_duration_ms(),
			feed_page_size: default_feed_page_size(),
		}
	}
}

impl UiConfig {
	pub fn toast_duration(&self) -> Duration {
		Duration::from_millis(self.toast_duration_ms)
	}
}

fn default_toast_duration_ms() -> u64 {
	3000
}

fn default_feed_page_size() -> u32 {
	10
}

/// Resolves environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable and
/// `${VAR_NAME:-default}` with the default when the variable is unset.
/// Input is limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = Vec::new();
	let resolved = re.replace_all(input, |caps: &regex::Captures| {
		let var_name = &caps[1];
		match (std::env::var(var_name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.push(var_name.to_string());
				String::new()
			},
		}
	});

	if let Some(var_name) = missing.first() {
		return Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			var_name
		)));
	}

	Ok(resolved.into_owned())
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let base_dir = path
			.parent()
			.filter(|p| !p.as_os_str().is_empty())
			.unwrap_or_else(|| Path::new("."));
		let file_name = path.file_name().ok_or_else(|| {
			ConfigError::Validation(format!("Invalid path: {}", path.display()))
		})?;

		let mut loader = loader::ConfigLoader::new(base_dir);
		let config = loader.load_config(file_name).await?;
		tracing::debug!(base_url = %config.client.base_url, "Loaded configuration");
		Ok(config)
	}

	/// Validates every section.
	fn validate(&self) -> Result<(), ConfigError> {
		let base_url = self.client.base_url.trim();
		if base_url.is_empty() {
			return Err(ConfigError::Validation(
				"client.base_url cannot be empty".into(),
			));
		}
		if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
			return Err(ConfigError::Validation(format!(
				"client.base_url must start with http:// or https://, got '{}'",
				base_url
			)));
		}
		if self.client.timeout_seconds == 0 || self.client.timeout_seconds > 300 {
			return Err(ConfigError::Validation(
				"client.timeout_seconds must be between 1 and 300".into(),
			));
		}

		if self.session.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one session implementation must be configured".into(),
			));
		}
		if !self
			.session
			.implementations
			.contains_key(&self.session.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary session storage '{}' not found in implementations",
				self.session.primary
			)));
		}
		if self.session.profile.trim().is_empty() {
			return Err(ConfigError::Validation(
				"session.profile cannot be empty".into(),
			));
		}

		for (name, value) in [
			(
				"polling.notifications_interval_seconds",
				self.polling.notifications_interval_seconds,
			),
			(
				"polling.messages_interval_seconds",
				self.polling.messages_interval_seconds,
			),
		] {
			if !(1..=3600).contains(&value) {
				return Err(ConfigError::Validation(format!(
					"{} must be between 1 and 3600, got {}",
					name, value
				)));
			}
		}

		if !(500..=60_000).contains(&self.ui.toast_duration_ms) {
			return Err(ConfigError::Validation(format!(
				"ui.toast_duration_ms must be between 500 and 60000, got {}",
				self.ui.toast_duration_ms
			)));
		}
		if self.ui.feed_page_size == 0 || self.ui.feed_page_size > 100 {
			return Err(ConfigError::Validation(
				"ui.feed_page_size must be between 1 and 100".into(),
			));
		}

		Ok(())
	}
}

/// Parses a configuration string, resolving environment variables and
/// validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
[client]
base_url = "http://127.0.0.1:8000/api"

[session]
primary = "memory"
[session.implementations.memory]
"#;

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.client.timeout_seconds, 30);
		assert!(config.client.user_agent.starts_with("gigmarket/"));
		assert_eq!(config.session.profile, "default");
		assert_eq!(config.polling.notifications_interval(), Duration::from_secs(30));
		assert_eq!(config.polling.messages_interval(), Duration::from_secs(5));
		assert_eq!(config.ui.toast_duration(), Duration::from_millis(3000));
		assert_eq!(config.ui.feed_page_size, 10);
	}

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("MARKET_TEST_HOST", "api.example.com");
		std::env::set_var("MARKET_TEST_PORT", "8443");

		let input = "base_url = \"https://${MARKET_TEST_HOST}:${MARKET_TEST_PORT}/api\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "base_url = \"https://api.example.com:8443/api\"");

		std::env::remove_var("MARKET_TEST_HOST");
		std::env::remove_var("MARKET_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "base_url = \"${MARKET_UNSET_URL:-http://localhost:8000/api}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "base_url = \"http://localhost:8000/api\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("token = \"${MARKET_UNSET_TOKEN}\"");
		assert!(result.unwrap_err().to_string().contains("MARKET_UNSET_TOKEN"));
	}

	#[test]
	fn test_base_url_must_be_http() {
		let config = MINIMAL.replace("http://127.0.0.1:8000/api", "ftp://example.com");
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("client.base_url"));
	}

	#[test]
	fn test_primary_session_must_exist() {
		let config = MINIMAL.replace("primary = \"memory\"", "primary = \"file\"");
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Primary session storage 'file'"));
	}

	#[test]
	fn test_polling_bounds() {
		let config = format!("{}\n[polling]\nmessages_interval_seconds = 0\n", MINIMAL);
		let err = config.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("polling.messages_interval_seconds"));
	}

	#[test]
	fn test_toast_bounds() {
		let config = format!("{}\n[ui]\ntoast_duration_ms = 100\n", MINIMAL);
		assert!(config.parse::<Config>().is_err());
	}
}
