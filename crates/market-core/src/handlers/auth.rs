//! Login, registration and the rest of the account lifecycle.
//!
//! Unlike the raw [`AuthApi`] calls these keep the session in step with the
//! server: a successful login stores the credential, logout forgets it.

use crate::engine::event_bus::{EventBus, MarketEvent};
use crate::toast::ToastCenter;
use market_client::{AuthApi, ClientError};
use market_session::{SessionError, SessionStore};
use market_types::{ChangePasswordRequest, LoginRequest, RegisterRequest, User};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
	#[error(transparent)]
	Client(#[from] ClientError),
	/// The server call succeeded but the session could not be updated.
	#[error("Session error: {0}")]
	Session(String),
}

impl From<SessionError> for AuthError {
	fn from(err: SessionError) -> Self {
		AuthError::Session(err.to_string())
	}
}

impl AuthError {
	pub fn user_message(&self) -> String {
		match self {
			AuthError::Client(e) => e.user_message(),
			AuthError::Session(_) => "Could not save your session. Please try again.".to_string(),
		}
	}
}

pub struct AuthHandler {
	auth: Arc<dyn AuthApi>,
	session: Arc<SessionStore>,
	event_bus: EventBus,
	toasts: ToastCenter,
}

impl AuthHandler {
	pub fn new(
		auth: Arc<dyn AuthApi>,
		session: Arc<SessionStore>,
		event_bus: EventBus,
		toasts: ToastCenter,
	) -> Self {
		Self {
			auth,
			session,
			event_bus,
			toasts,
		}
	}

	fn announce(&self, user: Option<&User>) {
		self.event_bus
			.publish(MarketEvent::SessionChanged(user.cloned().map(Box::new)))
			.ok();
	}

	pub async fn login(&self, request: &LoginRequest) -> Result<User, AuthError> {
		let payload = self.auth.login(request).await?;
		self.session.establish(&payload.token, &payload.user).await?;
		tracing::info!(user_id = payload.user.id, "Logged in");
		self.toasts
			.success(format!("Welcome back, {}!", payload.user.name));
		self.announce(Some(&payload.user));
		Ok(payload.user)
	}

	pub async fn register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
		let payload = self.auth.register(request).await?;
		self.session.establish(&payload.token, &payload.user).await?;
		tracing::info!(user_id = payload.user.id, role = %payload.user.role, "Registered");
		self.toasts.success("Account created.");
		self.announce(Some(&payload.user));
		Ok(payload.user)
	}

	/// Refreshes the cached user from the server. A rejected credential
	/// clears the session.
	pub async fn me(&self) -> Result<User, AuthError> {
		match self.auth.me().await {
			Ok(user) => {
				self.session.set_current_user(&user).await?;
				Ok(user)
			},
			Err(e @ ClientError::Unauthorized(_)) => {
				tracing::info!("Stored credential rejected, clearing session");
				self.session.clear().await?;
				self.announce(None);
				Err(e.into())
			},
			Err(e) => Err(e.into()),
		}
	}

	/// Logs out on the server and forgets the local session either way.
	pub async fn logout(&self) -> Result<(), AuthError> {
		if let Err(e) = self.auth.logout().await {
			tracing::warn!(error = %e, "Server logout failed, clearing local session anyway");
		}
		self.session.clear().await?;
		self.toasts.info("Logged out.");
		self.announce(None);
		Ok(())
	}

	pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), AuthError> {
		self.auth.change_password(request).await?;
		self.toasts.success("Password changed.");
		Ok(())
	}

	pub async fn delete_account(&self) -> Result<(), AuthError> {
		self.auth.delete_account().await?;
		self.session.clear().await?;
		tracing::info!("Account deleted");
		self.toasts.info("Your account has been deleted.");
		self.announce(None);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use market_client::MockAuthApi;
	use market_session::SessionProvider;
	use market_storage::{implementations::memory::MemoryStorage, StorageService};
	use market_types::{AuthPayload, SecretString, UserRole};
	use std::time::Duration;

	fn user() -> User {
		User {
			id: 3,
			name: "Bo".into(),
			username: Some("bo".into()),
			email: "bo@example.com".into(),
			avatar: None,
			role: UserRole::Client,
			created_at: None,
		}
	}

	fn handler(api: MockAuthApi) -> (AuthHandler, Arc<SessionStore>) {
		let session = Arc::new(SessionStore::new(
			Arc::new(StorageService::new(Box::new(MemoryStorage::new()))),
			"test",
		));
		let bus = EventBus::default();
		let toasts = ToastCenter::new(Duration::from_secs(3), bus.clone());
		(
			AuthHandler::new(Arc::new(api), session.clone(), bus, toasts),
			session,
		)
	}

	fn login_request() -> LoginRequest {
		LoginRequest {
			email: "bo@example.com".into(),
			password: "hunter22".into(),
		}
	}

	#[tokio::test]
	async fn test_login_stores_session() {
		let mut api = MockAuthApi::new();
		api.expect_login().times(1).returning(|_| {
			Ok(AuthPayload {
				token: SecretString::from("tok-1"),
				user: user(),
			})
		});
		let (handler, session) = handler(api);

		let logged_in = handler.login(&login_request()).await.unwrap();
		assert_eq!(logged_in.id, 3);
		assert_eq!(session.credential().await.unwrap().expose_secret(), "tok-1");
		assert_eq!(session.current_user().await.map(|u| u.id), Some(3));
	}

	#[tokio::test]
	async fn test_failed_login_leaves_session_empty() {
		let mut api = MockAuthApi::new();
		api.expect_login().returning(|_| {
			Err(ClientError::Api {
				status: 422,
				message: "Invalid credentials".into(),
			})
		});
		let (handler, session) = handler(api);

		let err = handler.login(&login_request()).await.unwrap_err();
		assert_eq!(err.user_message(), "Invalid credentials");
		assert!(!session.is_logged_in().await);
	}

	#[tokio::test]
	async fn test_logout_clears_even_when_server_fails() {
		let mut api = MockAuthApi::new();
		api.expect_logout()
			.times(1)
			.returning(|| Err(ClientError::Network("offline".into())));
		let (handler, session) = handler(api);
		session
			.establish(&SecretString::from("tok"), &user())
			.await
			.unwrap();

		handler.logout().await.unwrap();
		assert!(!session.is_logged_in().await);
		assert!(session.current_user().await.is_none());
	}

	#[tokio::test]
	async fn test_me_unauthorized_clears_session() {
		let mut api = MockAuthApi::new();
		api.expect_me().returning(|| Err(ClientError::Unauthorized(None)));
		let (handler, session) = handler(api);
		session
			.establish(&SecretString::from("stale"), &user())
			.await
			.unwrap();

		let err = handler.me().await.unwrap_err();
		assert!(matches!(err, AuthError::Client(ClientError::Unauthorized(_))));
		assert!(!session.is_logged_in().await);
	}

	#[tokio::test]
	async fn test_delete_account_failure_keeps_session() {
		let mut api = MockAuthApi::new();
		api.expect_delete_account().returning(|| {
			Err(ClientError::Forbidden("Password confirmation required".into()))
		});
		let (handler, session) = handler(api);
		session
			.establish(&SecretString::from("tok"), &user())
			.await
			.unwrap();

		assert!(handler.delete_account().await.is_err());
		assert!(session.is_logged_in().await);
	}
}
