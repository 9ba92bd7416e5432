use crate::{ClientError, HttpClient};
use async_trait::async_trait;
use market_types::{Gig, GigDraft, GigQuery, Page};
use reqwest::Method;
use validator::Validate;

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait GigApi: Send + Sync {
	async fn list_gigs(&self, query: &GigQuery) -> Result<Page<Gig>, ClientError>;
	async fn get_gig(&self, id: u64) -> Result<Gig, ClientError>;
	async fn create_gig(&self, draft: &GigDraft) -> Result<Gig, ClientError>;
	async fn update_gig(&self, id: u64, draft: &GigDraft) -> Result<Gig, ClientError>;
	async fn delete_gig(&self, id: u64) -> Result<(), ClientError>;
}

#[async_trait]
impl GigApi for HttpClient {
	async fn list_gigs(&self, query: &GigQuery) -> Result<Page<Gig>, ClientError> {
		self.get_page("/gigs", query).await
	}

	async fn get_gig(&self, id: u64) -> Result<Gig, ClientError> {
		self.get(&format!("/gigs/{}", id)).await
	}

	async fn create_gig(&self, draft: &GigDraft) -> Result<Gig, ClientError> {
		draft.validate()?;
		self.post("/gigs", draft).await
	}

	async fn update_gig(&self, id: u64, draft: &GigDraft) -> Result<Gig, ClientError> {
		draft.validate()?;
		self.put(&format!("/gigs/{}", id), draft).await
	}

	async fn delete_gig(&self, id: u64) -> Result<(), ClientError> {
		self.execute(Method::DELETE, &format!("/gigs/{}", id), |r| r)
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::client_for;
	use market_types::PackageType;
	use serde_json::json;
	use wiremock::matchers::{method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[tokio::test]
	async fn test_list_gigs_with_envelope_meta() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/api/gigs"))
			.and(query_param("search", "logo"))
			.and(query_param("page", "2"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"success": true,
				"data": [{
					"id": 9,
					"user_id": 20,
					"title": "Logo design",
					"packages": [
						{ "package_type": "basic", "title": "Simple", "price": 15, "delivery_time": 2 },
						{ "package_type": "premium", "title": "Full kit", "price": "120.50", "delivery_time": 7 }
					]
				}],
				"meta": { "current_page": 2, "last_page": 2 }
			})))
			.expect(1)
			.mount(&server)
			.await;

		let client = client_for(&server, None).await;
		let page = client
			.list_gigs(&GigQuery {
				search: Some("logo".into()),
				page: Some(2),
				..Default::default()
			})
			.await
			.unwrap();

		assert!(!page.has_more());
		let gig = &page.items[0];
		assert_eq!(gig.seller_id, 20);
		assert!(gig.package(PackageType::Premium).is_some());
		assert_eq!(gig.starting_price().unwrap().to_string(), "15");
	}

	#[tokio::test]
	async fn test_delete_gig() {
		let server = MockServer::start().await;
		Mock::given(method("DELETE"))
			.and(path("/api/gigs/9"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"success": true,
				"message": "Gig deleted",
				"data": null
			})))
			.expect(1)
			.mount(&server)
			.await;

		let client = client_for(&server, Some("tok")).await;
		client.delete_gig(9).await.unwrap();
	}
}
