//! Storage keys for session data.

use std::str::FromStr;

/// Namespaces under which session data is persisted.
///
/// Every piece of client state that outlives a single command goes through
/// one of these keys, so there is exactly one place a credential can live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Bearer token of the logged-in user.
	Credential,
	/// Cached copy of the logged-in user.
	CurrentUser,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Credential => "credential",
			StorageKey::CurrentUser => "current_user",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::Credential, Self::CurrentUser].into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"credential" => Ok(Self::Credential),
			"current_user" => Ok(Self::CurrentUser),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
