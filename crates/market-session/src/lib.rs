//! Session management for the marketplace client.
//!
//! A session is the bearer token issued at login plus a cached copy of the
//! logged-in user. [`SessionStore`] owns reading and writing both through the
//! configured storage backend; everything else only gets read access through
//! [`SessionProvider`].

use async_trait::async_trait;
use market_config::SessionConfig;
use market_storage::{StorageError, StorageService};
use market_types::{SecretString, StorageKey, User};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
	/// The storage backend failed to read or write session data.
	#[error("Session storage error: {0}")]
	Storage(String),
	/// The session backend configuration is invalid.
	#[error("Session configuration error: {0}")]
	Configuration(String),
}

impl From<StorageError> for SessionError {
	fn from(err: StorageError) -> Self {
		match err {
			StorageError::Configuration(msg) => SessionError::Configuration(msg),
			other => SessionError::Storage(other.to_string()),
		}
	}
}

/// Read-only view of the current session.
///
/// Injected into the HTTP client so requests can carry the credential
/// without the client being able to change it. A read failure is logged and
/// treated as "no session".
#[async_trait]
pub trait SessionProvider: Send + Sync {
	/// The bearer token, if a user is logged in.
	async fn credential(&self) -> Option<SecretString>;

	/// The cached logged-in user.
	async fn current_user(&self) -> Option<User>;
}

/// Reads and writes the session for one profile.
///
/// Values live under [`StorageKey::Credential`] and
/// [`StorageKey::CurrentUser`] with the profile name as id, so several
/// profiles can share one storage directory.
pub struct SessionStore {
	storage: Arc<StorageService>,
	profile: String,
}

impl SessionStore {
	pub fn new(storage: Arc<StorageService>, profile: impl Into<String>) -> Self {
		Self {
			storage,
			profile: profile.into(),
		}
	}

	pub fn profile(&self) -> &str {
		&self.profile
	}

	/// Returns the stored bearer token, or `None` when logged out.
	pub async fn read_credential(&self) -> Result<Option<SecretString>, SessionError> {
		let token: Option<String> = self
			.storage
			.retrieve_optional(StorageKey::Credential, &self.profile)
			.await?;
		Ok(token
			.filter(|t| !t.trim().is_empty())
			.map(SecretString::new))
	}

	/// Persists a new bearer token, replacing any previous one.
	pub async fn write_credential(&self, token: &SecretString) -> Result<(), SessionError> {
		// SecretString serializes redacted, so store the exposed value
		let exposed = token.expose_secret().to_string();
		self.storage
			.store(StorageKey::Credential, &self.profile, &exposed)
			.await?;
		tracing::debug!(profile = %self.profile, "Stored session credential");
		Ok(())
	}

	/// Returns the cached logged-in user.
	pub async fn read_current_user(&self) -> Result<Option<User>, SessionError> {
		Ok(self
			.storage
			.retrieve_optional(StorageKey::CurrentUser, &self.profile)
			.await?)
	}

	/// Caches the logged-in user.
	pub async fn set_current_user(&self, user: &User) -> Result<(), SessionError> {
		self.storage
			.store(StorageKey::CurrentUser, &self.profile, user)
			.await?;
		Ok(())
	}

	/// Stores the token and user returned by a successful login or
	/// registration.
	pub async fn establish(&self, token: &SecretString, user: &User) -> Result<(), SessionError> {
		self.write_credential(token).await?;
		self.set_current_user(user).await
	}

	/// Forgets the credential and the cached user.
	///
	/// Both removals are attempted even if the first fails.
	pub async fn clear(&self) -> Result<(), SessionError> {
		let credential = self
			.storage
			.remove(StorageKey::Credential, &self.profile)
			.await;
		let user = self
			.storage
			.remove(StorageKey::CurrentUser, &self.profile)
			.await;
		tracing::debug!(profile = %self.profile, "Cleared session");
		credential?;
		user?;
		Ok(())
	}

	/// True when a credential is stored.
	pub async fn is_logged_in(&self) -> bool {
		self.credential().await.is_some()
	}
}

#[async_trait]
impl SessionProvider for SessionStore {
	async fn credential(&self) -> Option<SecretString> {
		match self.read_credential().await {
			Ok(token) => token,
			Err(e) => {
				tracing::warn!(error = %e, "Failed to read session credential");
				None
			},
		}
	}

	async fn current_user(&self) -> Option<User> {
		match self.read_current_user().await {
			Ok(user) => user,
			Err(e) => {
				tracing::warn!(error = %e, "Failed to read cached user");
				None
			},
		}
	}
}

/// Builds the session store described by `config`, using the backend named
/// by `config.primary`.
pub fn create_session_store(config: &SessionConfig) -> Result<SessionStore, SessionError> {
	let backend_config = config.implementations.get(&config.primary).ok_or_else(|| {
		SessionError::Configuration(format!(
			"Primary session backend '{}' has no configuration",
			config.primary
		))
	})?;

	let backend = market_storage::create_backend(&config.primary, backend_config)?;
	tracing::info!(
		backend = %config.primary,
		profile = %config.profile,
		"Session store initialized"
	);
	Ok(SessionStore::new(
		Arc::new(StorageService::new(backend)),
		config.profile.clone(),
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use market_storage::implementations::memory::MemoryStorage;
	use market_types::UserRole;
	use std::collections::HashMap;
	use tempfile::TempDir;

	fn user() -> User {
		User {
			id: 7,
			name: "Ana Lima".into(),
			username: Some("ana".into()),
			email: "ana@example.com".into(),
			avatar: None,
			role: UserRole::Freelancer,
			created_at: None,
		}
	}

	fn memory_store(profile: &str) -> SessionStore {
		SessionStore::new(
			Arc::new(StorageService::new(Box::new(MemoryStorage::new()))),
			profile,
		)
	}

	#[tokio::test]
	async fn test_establish_and_clear() {
		let store = memory_store("default");
		assert!(store.read_credential().await.unwrap().is_none());
		assert!(!store.is_logged_in().await);

		store
			.establish(&SecretString::from("tok-123"), &user())
			.await
			.unwrap();

		let token = store.credential().await.unwrap();
		assert_eq!(token.expose_secret(), "tok-123");
		assert_eq!(SessionProvider::current_user(&store).await, Some(user()));

		store.clear().await.unwrap();
		assert!(store.credential().await.is_none());
		assert!(SessionProvider::current_user(&store).await.is_none());

		// Clearing twice is harmless
		store.clear().await.unwrap();
	}

	#[tokio::test]
	async fn test_profiles_are_isolated() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let work = SessionStore::new(storage.clone(), "work");
		let home = SessionStore::new(storage, "home");

		work.write_credential(&SecretString::from("w")).await.unwrap();
		assert!(home.credential().await.is_none());
		assert_eq!(work.credential().await.unwrap().expose_secret(), "w");
	}

	#[tokio::test]
	async fn test_file_session_survives_restart() {
		let dir = TempDir::new().unwrap();
		let mut table = toml::Table::new();
		table.insert(
			"storage_path".into(),
			toml::Value::String(dir.path().display().to_string()),
		);
		let mut implementations = HashMap::new();
		implementations.insert("file".to_string(), toml::Value::Table(table));
		let config = SessionConfig {
			primary: "file".into(),
			implementations,
			profile: "default".into(),
		};

		let first = create_session_store(&config).unwrap();
		first
			.establish(&SecretString::from("persisted"), &user())
			.await
			.unwrap();
		drop(first);

		let second = create_session_store(&config).unwrap();
		assert_eq!(
			second.credential().await.unwrap().expose_secret(),
			"persisted"
		);
		assert_eq!(second.read_current_user().await.unwrap(), Some(user()));
	}

	#[test]
	fn test_missing_primary_backend() {
		let config = SessionConfig {
			primary: "file".into(),
			implementations: HashMap::new(),
			profile: "default".into(),
		};
		assert!(matches!(
			create_session_store(&config),
			Err(SessionError::Configuration(_))
		));
	}
}
