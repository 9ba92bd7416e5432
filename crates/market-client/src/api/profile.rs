use crate::{ClientError, HttpClient};
use async_trait::async_trait;
use market_types::{Profile, ProfileUpdate};
use validator::Validate;

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait ProfileApi: Send + Sync {
	/// `GET /profile/me`
	async fn my_profile(&self) -> Result<Profile, ClientError>;

	/// `GET /profile/:username`
	async fn profile(&self, username: &str) -> Result<Profile, ClientError>;

	/// `PUT /profile/update`
	async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ClientError>;
}

#[async_trait]
impl ProfileApi for HttpClient {
	async fn my_profile(&self) -> Result<Profile, ClientError> {
		self.get("/profile/me").await
	}

	async fn profile(&self, username: &str) -> Result<Profile, ClientError> {
		let username = username.trim();
		if username.is_empty() || username.contains('/') {
			return Err(ClientError::Validation("Invalid username.".to_string()));
		}
		self.get(&format!("/profile/{}", username)).await
	}

	async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ClientError> {
		update.validate()?;
		self.put("/profile/update", update).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::client_for;
	use serde_json::json;
	use wiremock::matchers::{body_json, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[tokio::test]
	async fn test_update_sends_only_set_fields() {
		let server = MockServer::start().await;
		Mock::given(method("PUT"))
			.and(path("/api/profile/update"))
			.and(body_json(json!({ "bio": "Rust developer" })))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"success": true,
				"data": { "user_id": 4, "bio": "Rust developer" }
			})))
			.expect(1)
			.mount(&server)
			.await;

		let client = client_for(&server, Some("tok")).await;
		let profile = client
			.update_profile(&ProfileUpdate {
				bio: Some("Rust developer".into()),
				..Default::default()
			})
			.await
			.unwrap();
		assert_eq!(profile.user_id, 4);
	}

	#[tokio::test]
	async fn test_profile_by_username() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/api/profile/ana"))
			.respond_with(ResponseTemplate::new(404).set_body_json(json!({
				"success": false,
				"message": "User not found"
			})))
			.mount(&server)
			.await;

		let client = client_for(&server, None).await;
		let err = client.profile("ana").await.unwrap_err();
		assert_eq!(
			err,
			ClientError::Api {
				status: 404,
				message: "User not found".into()
			}
		);
		assert!(matches!(
			client.profile("a/b").await,
			Err(ClientError::Validation(_))
		));
	}
}
