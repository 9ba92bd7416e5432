//! Follows and favorites.

use crate::{ClientError, HttpClient};
use async_trait::async_trait;
use market_types::{Gig, ToggleState, UserSummary};

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait SocialApi: Send + Sync {
	/// `POST /follow/:userId`, following if not followed and vice versa.
	async fn toggle_follow(&self, user_id: u64) -> Result<ToggleState, ClientError>;

	/// `POST /favorites/gigs/:id`
	async fn toggle_gig_favorite(&self, gig_id: u64) -> Result<ToggleState, ClientError>;

	/// `POST /favorites/freelancers/:id`
	async fn toggle_freelancer_favorite(&self, user_id: u64) -> Result<ToggleState, ClientError>;

	async fn favorite_gigs(&self) -> Result<Vec<Gig>, ClientError>;
	async fn favorite_freelancers(&self) -> Result<Vec<UserSummary>, ClientError>;
}

#[async_trait]
impl SocialApi for HttpClient {
	async fn toggle_follow(&self, user_id: u64) -> Result<ToggleState, ClientError> {
		self.post_empty(&format!("/follow/{}", user_id)).await
	}

	async fn toggle_gig_favorite(&self, gig_id: u64) -> Result<ToggleState, ClientError> {
		self.post_empty(&format!("/favorites/gigs/{}", gig_id)).await
	}

	async fn toggle_freelancer_favorite(&self, user_id: u64) -> Result<ToggleState, ClientError> {
		self.post_empty(&format!("/favorites/freelancers/{}", user_id))
			.await
	}

	async fn favorite_gigs(&self) -> Result<Vec<Gig>, ClientError> {
		self.get("/favorites/gigs").await
	}

	async fn favorite_freelancers(&self) -> Result<Vec<UserSummary>, ClientError> {
		self.get("/favorites/freelancers").await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::client_for;
	use serde_json::json;
	use wiremock::matchers::{method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[tokio::test]
	async fn test_follow_toggle() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/api/follow/12"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"success": true,
				"data": { "following": true, "followers_count": 31 }
			})))
			.expect(1)
			.mount(&server)
			.await;

		let client = client_for(&server, Some("tok")).await;
		let state = client.toggle_follow(12).await.unwrap();
		assert!(state.active);
		assert_eq!(state.count, Some(31));
	}

	#[tokio::test]
	async fn test_favorite_gig_requires_login() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/api/favorites/gigs/3"))
			.respond_with(ResponseTemplate::new(401))
			.mount(&server)
			.await;

		let client = client_for(&server, None).await;
		let err = client.toggle_gig_favorite(3).await.unwrap_err();
		assert!(err.requires_login());
	}
}
