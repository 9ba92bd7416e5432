//! Configuration builder for tests and local development.

use crate::{ClientConfig, Config, PollingConfig, SessionConfig, UiConfig};
use std::collections::HashMap;

/// Builder for creating `Config` instances with a fluent API.
///
/// Defaults point at a local backend and an in-memory session.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	base_url: String,
	timeout_seconds: u64,
	session_primary: String,
	session_implementations: HashMap<String, toml::Value>,
	notifications_interval_seconds: u64,
	messages_interval_seconds: u64,
	toast_duration_ms: u64,
	feed_page_size: u32,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	pub fn new() -> Self {
		let mut session_implementations = HashMap::new();
		session_implementations.insert(
			"memory".to_string(),
			toml::Value::Table(toml::Table::new()),
		);

		Self {
			base_url: "http://127.0.0.1:8000/api".to_string(),
			timeout_seconds: 5,
			session_primary: "memory".to_string(),
			session_implementations,
			notifications_interval_seconds: 30,
			messages_interval_seconds: 5,
			toast_duration_ms: 3000,
			feed_page_size: 10,
		}
	}

	/// Sets the backend base URL, e.g. the URI of a mock server.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = url.into();
		self
	}

	pub fn timeout_seconds(mut self, timeout: u64) -> Self {
		self.timeout_seconds = timeout;
		self
	}

	/// Uses the file session backend rooted at `storage_path`.
	pub fn file_session(mut self, storage_path: impl Into<String>) -> Self {
		let mut table = toml::Table::new();
		table.insert(
			"storage_path".to_string(),
			toml::Value::String(storage_path.into()),
		);
		self.session_implementations
			.insert("file".to_string(), toml::Value::Table(table));
		self.session_primary = "file".to_string();
		self
	}

	pub fn notifications_interval_seconds(mut self, interval: u64) -> Self {
		self.notifications_interval_seconds = interval;
		self
	}

	pub fn messages_interval_seconds(mut self, interval: u64) -> Self {
		self.messages_interval_seconds = interval;
		self
	}

	pub fn toast_duration_ms(mut self, duration: u64) -> Self {
		self.toast_duration_ms = duration;
		self
	}

	pub fn feed_page_size(mut self, size: u32) -> Self {
		self.feed_page_size = size;
		self
	}

	pub fn build(self) -> Config {
		Config {
			client: ClientConfig {
				base_url: self.base_url,
				timeout_seconds: self.timeout_seconds,
				user_agent: "gigmarket-test".to_string(),
			},
			session: SessionConfig {
				primary: self.session_primary,
				implementations: self.session_implementations,
				profile: "default".to_string(),
			},
			polling: PollingConfig {
				notifications_interval_seconds: self.notifications_interval_seconds,
				messages_interval_seconds: self.messages_interval_seconds,
			},
			ui: UiConfig {
				toast_duration_ms: self.toast_duration_ms,
				feed_page_size: self.feed_page_size,
			},
		}
	}
}
