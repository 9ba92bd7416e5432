//! Social feed types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::non_blank;
use crate::UserSummary;

/// A feed item, independent of gigs and orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
	pub id: u64,
	pub user_id: u64,
	pub content: String,
	#[serde(default)]
	pub images: Vec<String>,
	#[serde(default)]
	pub likes_count: u64,
	#[serde(default)]
	pub comments_count: u64,
	/// Whether the viewer liked this post.
	#[serde(default, alias = "is_liked")]
	pub liked: bool,
	/// Whether the viewer bookmarked this post.
	#[serde(default, alias = "is_bookmarked")]
	pub bookmarked: bool,
	#[serde(default, alias = "user")]
	pub author: Option<UserSummary>,
	pub created_at: DateTime<Utc>,
}

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
	pub id: u64,
	pub post_id: u64,
	pub user_id: u64,
	pub content: String,
	#[serde(default, alias = "user")]
	pub author: Option<UserSummary>,
	pub created_at: DateTime<Utc>,
}

/// Body for `POST /posts`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewPost {
	#[validate(
		custom(function = "non_blank", message = "Post content cannot be empty."),
		length(max = 5000, message = "Posts are limited to 5000 characters.")
	)]
	pub content: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub images: Vec<String>,
}

/// Body for `POST /posts/:id/comment`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewComment {
	#[validate(custom(function = "non_blank", message = "Comment cannot be empty."))]
	pub content: String,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_post_accepts_flag_aliases() {
		let post: Post = serde_json::from_value(json!({
			"id": 5,
			"user_id": 9,
			"content": "Shipped a new gig today",
			"is_liked": true,
			"user": { "id": 9, "name": "Kai" },
			"created_at": "2024-06-01T08:30:00Z"
		}))
		.unwrap();
		assert!(post.liked);
		assert!(!post.bookmarked);
		assert_eq!(post.author.unwrap().id, 9);
	}

	#[test]
	fn test_blank_comment_is_rejected() {
		assert!(NewComment { content: "\t".into() }.validate().is_err());
		assert!(NewComment { content: "Nice".into() }.validate().is_ok());
	}
}
