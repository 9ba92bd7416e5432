//! In-memory storage backend.
//!
//! Nothing survives the process. Used by tests and by sessions that should
//! not leave a credential on disk.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use market_types::{ConfigSchema, ImplementationRegistry, Schema, ValidationError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
	value: Vec<u8>,
	expires_at: Option<Instant>,
}

impl Entry {
	fn is_live(&self, now: Instant) -> bool {
		self.expires_at.is_none_or(|at| now < at)
	}
}

/// Map-backed storage. Expired entries are reported as missing and
/// dropped on the next cleanup.
#[derive(Clone, Default)]
pub struct MemoryStorage {
	store: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		store
			.get(key)
			.filter(|entry| entry.is_live(Instant::now()))
			.map(|entry| entry.value.clone())
			.ok_or(StorageError::NotFound)
	}

	async fn set_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let expires_at = ttl
			.filter(|ttl| !ttl.is_zero())
			.map(|ttl| Instant::now() + ttl);
		self.store
			.write()
			.await
			.insert(key.to_string(), Entry { value, expires_at });
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		self.store.write().await.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store
			.get(key)
			.is_some_and(|entry| entry.is_live(Instant::now())))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}

	async fn cleanup_expired(&self) -> Result<usize, StorageError> {
		let now = Instant::now();
		let mut store = self.store.write().await;
		let before = store.len();
		store.retain(|_, entry| entry.is_live(now));
		Ok(before - store.len())
	}
}

/// The memory backend takes no options.
pub struct MemoryStorageSchema;

impl ConfigSchema for MemoryStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Factory function to create a memory storage backend from configuration.
pub fn create_storage(_config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	Ok(Box::new(MemoryStorage::new()))
}

/// Registry for the memory storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_basic_operations() {
		let storage = MemoryStorage::new();

		storage
			.set_bytes("credential:default", b"\"tok\"".to_vec(), None)
			.await
			.unwrap();
		assert!(storage.exists("credential:default").await.unwrap());
		assert_eq!(
			storage.get_bytes("credential:default").await.unwrap(),
			b"\"tok\"".to_vec()
		);

		storage.delete("credential:default").await.unwrap();
		assert!(!storage.exists("credential:default").await.unwrap());
		assert!(matches!(
			storage.get_bytes("credential:default").await,
			Err(StorageError::NotFound)
		));

		// Deleting again is fine
		storage.delete("credential:default").await.unwrap();
	}

	#[tokio::test]
	async fn test_expired_entries_are_missing() {
		let storage = MemoryStorage::new();
		storage
			.set_bytes("a", vec![1], Some(Duration::from_millis(10)))
			.await
			.unwrap();
		storage.set_bytes("b", vec![2], None).await.unwrap();

		tokio::time::sleep(Duration::from_millis(30)).await;

		assert!(!storage.exists("a").await.unwrap());
		assert!(storage.get_bytes("a").await.is_err());
		assert_eq!(storage.cleanup_expired().await.unwrap(), 1);
		assert!(storage.exists("b").await.unwrap());
	}

	#[test]
	fn test_schema_accepts_empty_table() {
		let config = toml::Value::Table(toml::Table::new());
		assert!(MemoryStorageSchema.validate(&config).is_ok());
	}
}
