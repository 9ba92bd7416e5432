//! Wire envelope shared by every marketplace endpoint.
//!
//! The backend wraps each payload as
//! `{ success, message?, data?, meta?, errors? }`. This module models that
//! envelope once so every API call decodes it the same way, and provides the
//! flattening of validation errors into a single user-facing message.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response envelope returned by the marketplace backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
	/// Whether the backend considers the request successful.
	///
	/// Bodies that omit the flag are treated as successful; the HTTP status
	/// still decides failure for those.
	#[serde(default = "default_success")]
	pub success: bool,
	/// Human-readable message from the server.
	#[serde(default)]
	pub message: Option<String>,
	/// Payload of the response.
	pub data: Option<T>,
	/// Pagination metadata for list endpoints.
	#[serde(default)]
	pub meta: Option<PageMeta>,
	/// Validation errors reported by the server.
	#[serde(default)]
	pub errors: Option<ErrorDetails>,
}

fn default_success() -> bool {
	true
}

impl<T> Envelope<T> {
	/// Returns the message to show the user when this envelope is a failure.
	///
	/// Flattened validation errors take precedence over the generic message,
	/// since the generic message usually only says that validation failed.
	pub fn error_message(&self) -> Option<String> {
		if let Some(errors) = &self.errors {
			let flattened = errors.flatten();
			if !flattened.is_empty() {
				return Some(flattened);
			}
		}

		self.message
			.as_ref()
			.map(|m| m.trim())
			.filter(|m| !m.is_empty())
			.map(str::to_string)
	}
}

/// Validation error payload.
///
/// Field validation failures arrive either keyed by field name or as a plain
/// list of messages, and occasionally as a single string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorDetails {
	/// Messages keyed by the field they refer to.
	Fields(BTreeMap<String, Vec<String>>),
	/// Messages without field attribution.
	List(Vec<String>),
	/// A single message.
	Single(String),
}

impl ErrorDetails {
	/// Flattens all messages into one string separated by spaces.
	///
	/// Field-keyed messages are emitted in field-name order so the result is
	/// stable regardless of the order the server serialized them in.
	pub fn flatten(&self) -> String {
		let messages: Vec<&str> = match self {
			ErrorDetails::Fields(fields) => fields
				.values()
				.flat_map(|msgs| msgs.iter().map(String::as_str))
				.collect(),
			ErrorDetails::List(list) => list.iter().map(String::as_str).collect(),
			ErrorDetails::Single(message) => vec![message.as_str()],
		};

		messages
			.into_iter()
			.map(str::trim)
			.filter(|m| !m.is_empty())
			.collect::<Vec<_>>()
			.join(" ")
	}
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
	pub current_page: u32,
	pub last_page: u32,
	#[serde(default)]
	pub per_page: Option<u32>,
	#[serde(default)]
	pub total: Option<u64>,
}

impl PageMeta {
	/// Whether another page exists after the current one.
	pub fn has_more(&self) -> bool {
		self.current_page < self.last_page
	}

	/// The page number to request next, if any.
	pub fn next_page(&self) -> Option<u32> {
		self.has_more().then(|| self.current_page + 1)
	}
}

/// A page of items together with its pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub meta: Option<PageMeta>,
}

impl<T> Page<T> {
	/// Whether the server reported further pages.
	///
	/// A page without metadata is the whole collection.
	pub fn has_more(&self) -> bool {
		self.meta.is_some_and(|m| m.has_more())
	}
}

/// Result of toggling a like, bookmark, favorite or follow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToggleState {
	/// State after the toggle (liked, bookmarked, favorited, following).
	#[serde(alias = "liked", alias = "bookmarked", alias = "favorited", alias = "following")]
	pub active: bool,
	/// Updated counter when the endpoint reports one.
	#[serde(default, alias = "likes_count", alias = "followers_count")]
	pub count: Option<u64>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_failure_message_prefers_flattened_errors() {
		let envelope: Envelope<serde_json::Value> = serde_json::from_value(json!({
			"success": false,
			"message": "The given data was invalid.",
			"errors": {
				"title": ["The title field is required."],
				"price": ["The price must be a number.", "The price must be at least 0."]
			}
		}))
		.unwrap();

		assert_eq!(
			envelope.error_message().unwrap(),
			"The price must be a number. The price must be at least 0. The title field is required."
		);
	}

	#[test]
	fn test_failure_message_falls_back_to_message() {
		let envelope: Envelope<()> =
			serde_json::from_value(json!({ "success": false, "message": "X" })).unwrap();
		assert!(!envelope.success);
		assert_eq!(envelope.error_message().as_deref(), Some("X"));

		let empty: Envelope<()> =
			serde_json::from_value(json!({ "success": false, "message": "  " })).unwrap();
		assert_eq!(empty.error_message(), None);
	}

	#[test]
	fn test_error_list_is_joined() {
		let details = ErrorDetails::List(vec!["first".into(), " ".into(), "second".into()]);
		assert_eq!(details.flatten(), "first second");
	}

	#[test]
	fn test_missing_success_defaults_to_true() {
		let envelope: Envelope<u32> = serde_json::from_value(json!({ "data": 4 })).unwrap();
		assert!(envelope.success);
		assert_eq!(envelope.data, Some(4));
	}

	#[test]
	fn test_page_meta_has_more() {
		let first = PageMeta {
			current_page: 1,
			last_page: 3,
			per_page: None,
			total: None,
		};
		assert!(first.has_more());
		assert_eq!(first.next_page(), Some(2));

		let last = PageMeta {
			current_page: 3,
			..first
		};
		assert!(!last.has_more());
		assert_eq!(last.next_page(), None);
	}

	#[test]
	fn test_toggle_state_aliases() {
		let liked: ToggleState =
			serde_json::from_value(json!({ "liked": true, "likes_count": 12 })).unwrap();
		assert!(liked.active);
		assert_eq!(liked.count, Some(12));

		let following: ToggleState = serde_json::from_value(json!({ "following": false })).unwrap();
		assert!(!following.active);
		assert_eq!(following.count, None);
	}
}
