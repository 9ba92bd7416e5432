//! User, profile and authentication types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::validation::non_blank;
use crate::SecretString;

/// A marketplace account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
	pub id: u64,
	pub name: String,
	#[serde(default)]
	pub username: Option<String>,
	pub email: String,
	#[serde(default)]
	pub avatar: Option<String>,
	#[serde(default)]
	pub role: UserRole,
	#[serde(default)]
	pub created_at: Option<DateTime<Utc>>,
}

impl User {
	/// Name to show in listings: the username when set, otherwise the full name.
	pub fn display_name(&self) -> &str {
		self.username.as_deref().unwrap_or(&self.name)
	}
}

/// Compact user reference embedded in other entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
	pub id: u64,
	pub name: String,
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub avatar: Option<String>,
}

impl From<&User> for UserSummary {
	fn from(user: &User) -> Self {
		Self {
			id: user.id,
			name: user.name.clone(),
			username: user.username.clone(),
			avatar: user.avatar.clone(),
		}
	}
}

/// Account role. Unknown roles from newer servers are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
	Freelancer,
	#[default]
	Client,
	Other(String),
}

impl From<String> for UserRole {
	fn from(value: String) -> Self {
		match value.as_str() {
			"freelancer" | "seller" => UserRole::Freelancer,
			"client" | "buyer" => UserRole::Client,
			_ => UserRole::Other(value),
		}
	}
}

impl From<UserRole> for String {
	fn from(role: UserRole) -> Self {
		role.to_string()
	}
}

impl fmt::Display for UserRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			UserRole::Freelancer => write!(f, "freelancer"),
			UserRole::Client => write!(f, "client"),
			UserRole::Other(role) => write!(f, "{}", role),
		}
	}
}

/// Public profile attached to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
	pub user_id: u64,
	#[serde(default)]
	pub user: Option<UserSummary>,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub bio: Option<String>,
	#[serde(default)]
	pub skills: Vec<String>,
	#[serde(default)]
	pub location: Option<String>,
	#[serde(default)]
	pub website: Option<String>,
	#[serde(default)]
	pub available: bool,
	#[serde(default)]
	pub social_links: Vec<SocialLink>,
	#[serde(default)]
	pub followers_count: u64,
	#[serde(default)]
	pub following_count: u64,
	#[serde(default)]
	pub is_following: bool,
}

/// External profile link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLink {
	pub platform: String,
	pub url: String,
}

/// Fields accepted by `PUT /profile/update`. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
	#[serde(skip_serializing_if = "Option::is_none")]
	#[validate(length(min = 1, max = 255))]
	pub name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	#[validate(length(max = 120))]
	pub title: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	#[validate(length(max = 2000))]
	pub bio: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub skills: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	#[validate(url)]
	pub website: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub available: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub avatar: Option<String>,
}

/// Credentials submitted to `/auth/login`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
	#[validate(email(message = "Please enter a valid email address."))]
	pub email: String,
	#[validate(custom(function = "non_blank", message = "Password is required."))]
	pub password: String,
}

/// Registration form submitted to `/auth/register`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
	#[validate(custom(function = "non_blank", message = "Name is required."))]
	pub name: String,
	#[validate(custom(function = "non_blank", message = "Username is required."))]
	pub username: String,
	#[validate(email(message = "Please enter a valid email address."))]
	pub email: String,
	#[validate(length(min = 8, message = "Password must be at least 8 characters."))]
	pub password: String,
	#[validate(must_match(other = "password", message = "Passwords do not match."))]
	pub password_confirmation: String,
	pub role: UserRole,
}

/// Form submitted to `/auth/change-password`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ChangePasswordRequest {
	#[validate(custom(function = "non_blank", message = "Current password is required."))]
	pub current_password: String,
	#[validate(length(min = 8, message = "Password must be at least 8 characters."))]
	pub new_password: String,
	#[validate(must_match(other = "new_password", message = "Passwords do not match."))]
	pub new_password_confirmation: String,
}

/// Payload returned by login and registration.
///
/// The token field has gone by several names across backend versions.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
	#[serde(alias = "access_token", alias = "auth_token")]
	pub token: SecretString,
	pub user: User,
}
