//! Builder for assembling a [`Marketplace`] from configuration.
//!
//! The session backend is created through the storage factories so a
//! front end can add its own backends next to the built-in ones.

use crate::engine::Marketplace;
use market_client::HttpClient;
use market_config::Config;
use market_session::SessionStore;
use market_storage::{StorageFactory, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while assembling the client.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

pub struct MarketBuilder {
	config: Config,
	session: Option<Arc<SessionStore>>,
	storage_factories: HashMap<String, StorageFactory>,
}

impl MarketBuilder {
	/// Starts from `config` with every built-in storage backend registered.
	pub fn new(config: Config) -> Self {
		let storage_factories = market_storage::get_all_implementations()
			.into_iter()
			.map(|(name, factory)| (name.to_string(), factory))
			.collect();
		Self {
			config,
			session: None,
			storage_factories,
		}
	}

	/// Uses an existing session store instead of creating one.
	pub fn with_session(mut self, session: Arc<SessionStore>) -> Self {
		self.session = Some(session);
		self
	}

	/// Registers an additional storage backend for the session.
	pub fn with_storage_factory(mut self, name: impl Into<String>, factory: StorageFactory) -> Self {
		self.storage_factories.insert(name.into(), factory);
		self
	}

	pub fn build(self) -> Result<Marketplace, BuilderError> {
		let session = match self.session {
			Some(session) => session,
			None => Arc::new(self.create_session()?),
		};

		let client = HttpClient::new(&self.config.client, session.clone()).map_err(|e| {
			tracing::error!(component = "client", error = %e, "Failed to create HTTP client");
			BuilderError::Config(format!("Failed to create HTTP client: {}", e))
		})?;
		tracing::info!(component = "client", base_url = %client.base_url(), "Loaded");

		Ok(Marketplace::new(self.config, session, Arc::new(client)))
	}

	fn create_session(&self) -> Result<SessionStore, BuilderError> {
		let session_config = &self.config.session;
		let mut backends: HashMap<String, Box<dyn StorageInterface>> = HashMap::new();

		for (name, config) in &session_config.implementations {
			let Some(factory) = self.storage_factories.get(name) else {
				tracing::warn!(component = "session", implementation = %name, "No factory registered, skipping");
				continue;
			};
			match factory(config) {
				Ok(backend) => {
					backend.config_schema().validate(config).map_err(|e| {
						BuilderError::Config(format!(
							"Invalid configuration for session backend '{}': {}",
							name, e
						))
					})?;
					let is_primary = &session_config.primary == name;
					tracing::info!(component = "session", implementation = %name, enabled = %is_primary, "Loaded");
					backends.insert(name.clone(), backend);
				},
				Err(e) => {
					tracing::error!(
						component = "session",
						implementation = %name,
						error = %e,
						"Failed to create session backend"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create session backend '{}': {}",
						name, e
					)));
				},
			}
		}

		let backend = backends.remove(&session_config.primary).ok_or_else(|| {
			BuilderError::MissingComponent(format!(
				"Primary session backend '{}' failed to load or is not configured",
				session_config.primary
			))
		})?;

		Ok(SessionStore::new(
			Arc::new(StorageService::new(backend)),
			session_config.profile.clone(),
		))
	}
}
