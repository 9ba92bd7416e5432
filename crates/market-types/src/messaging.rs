//! Conversations and direct messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::non_blank;
use crate::UserSummary;

/// Summary of a message thread with another user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
	/// The other participant.
	pub user: UserSummary,
	#[serde(default)]
	pub last_message: Option<String>,
	#[serde(default)]
	pub last_message_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub unread_count: u32,
}

/// A single direct message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
	pub id: u64,
	pub sender_id: u64,
	pub receiver_id: u64,
	pub content: String,
	#[serde(default, alias = "is_read")]
	pub read: bool,
	pub created_at: DateTime<Utc>,
}

impl Message {
	/// Whether this message was sent by the given user.
	pub fn is_from(&self, user_id: u64) -> bool {
		self.sender_id == user_id
	}
}

/// Body for `POST /messages`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewMessage {
	pub receiver_id: u64,
	#[validate(custom(function = "non_blank", message = "Message cannot be empty."))]
	pub content: String,
}
