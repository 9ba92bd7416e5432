//! Notification types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An in-app notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
	pub id: u64,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub title: Option<String>,
	pub message: String,
	/// Free-form payload, e.g. the order or post the notification refers to.
	#[serde(default)]
	pub data: serde_json::Value,
	#[serde(default)]
	pub read_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
}

impl Notification {
	pub fn is_read(&self) -> bool {
		self.read_at.is_some()
	}
}

/// Response of `GET /notifications/unread-count`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadCount {
	#[serde(alias = "unread_count")]
	pub count: u64,
}
