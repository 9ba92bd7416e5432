//! Authentication endpoints.
//!
//! These calls only talk to the server. Storing or clearing the returned
//! credential is the caller's job (see the auth flow in `market-core`).

use crate::{ClientError, HttpClient};
use async_trait::async_trait;
use market_types::{AuthPayload, ChangePasswordRequest, LoginRequest, RegisterRequest, User};
use reqwest::Method;
use serde::Deserialize;
use validator::Validate;

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
	async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ClientError>;
	async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ClientError>;
	async fn me(&self) -> Result<User, ClientError>;
	async fn logout(&self) -> Result<(), ClientError>;
	async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ClientError>;
	async fn delete_account(&self) -> Result<(), ClientError>;
}

/// `/auth/me` answers with either the user or `{ "user": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MeResponse {
	Wrapped { user: User },
	Bare(User),
}

#[async_trait]
impl AuthApi for HttpClient {
	async fn login(&self, request: &LoginRequest) -> Result<AuthPayload, ClientError> {
		request.validate()?;
		self.post("/auth/login", request).await
	}

	async fn register(&self, request: &RegisterRequest) -> Result<AuthPayload, ClientError> {
		request.validate()?;
		self.post("/auth/register", request).await
	}

	async fn me(&self) -> Result<User, ClientError> {
		if self.session().credential().await.is_none() {
			return Err(ClientError::NotLoggedIn);
		}
		Ok(match self.get::<MeResponse>("/auth/me").await? {
			MeResponse::Wrapped { user } | MeResponse::Bare(user) => user,
		})
	}

	async fn logout(&self) -> Result<(), ClientError> {
		self.execute(Method::POST, "/auth/logout", |r| r).await
	}

	async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ClientError> {
		request.validate()?;
		self.execute(Method::POST, "/auth/change-password", |r| r.json(request))
			.await
	}

	async fn delete_account(&self) -> Result<(), ClientError> {
		self.execute(Method::DELETE, "/auth/delete-account", |r| r)
			.await
	}
}
