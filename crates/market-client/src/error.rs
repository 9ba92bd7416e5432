//! The single error type returned by every API call.

use thiserror::Error;

/// Errors that can occur while talking to the marketplace backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
	/// The request never produced an HTTP response (DNS, connect, timeout).
	#[error("Network error: {0}")]
	Network(String),
	/// The server answered with a failure status or `success: false`.
	#[error("API error ({status}): {message}")]
	Api { status: u16, message: String },
	/// The input failed a local check; no request was sent.
	#[error("Validation error: {0}")]
	Validation(String),
	/// The server answered 401: a rejected credential, or failed login
	/// details. Holds the server's message when it sent one.
	#[error("Unauthorized")]
	Unauthorized(Option<String>),
	/// The action is not allowed for the current user.
	#[error("Forbidden: {0}")]
	Forbidden(String),
	/// The response body did not have the expected shape.
	#[error("Failed to decode response: {0}")]
	Decode(String),
	/// The operation needs a logged-in user and the session is empty.
	#[error("Not logged in")]
	NotLoggedIn,
}

impl ClientError {
	/// Text suitable for a toast or inline error banner.
	pub fn user_message(&self) -> String {
		match self {
			ClientError::Network(_) => {
				"Could not reach the server. Check your connection and try again.".to_string()
			},
			ClientError::Api { message, .. } => message.clone(),
			ClientError::Validation(message) => message.clone(),
			ClientError::Unauthorized(Some(message)) => message.clone(),
			ClientError::Unauthorized(None) => {
				"Your session has expired. Please log in again.".to_string()
			},
			ClientError::Forbidden(message) => message.clone(),
			ClientError::Decode(_) => "The server sent an unexpected response.".to_string(),
			ClientError::NotLoggedIn => "Please log in to continue.".to_string(),
		}
	}

	/// Whether the user has to log in (again) before retrying.
	pub fn requires_login(&self) -> bool {
		matches!(self, ClientError::Unauthorized(_) | ClientError::NotLoggedIn)
	}
}

impl From<validator::ValidationErrors> for ClientError {
	fn from(errors: validator::ValidationErrors) -> Self {
		ClientError::Validation(market_types::flatten_validation_errors(&errors))
	}
}
