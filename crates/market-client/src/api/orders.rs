//! Orders: creation, listing and transition requests.
//!
//! Transition calls only request a status change. Their responses carry no
//! order the caller should trust; callers re-fetch with [`OrderApi::get_order`].

use crate::{ClientError, HttpClient};
use async_trait::async_trait;
use market_types::{NewOrder, Order, OrderQuery, Page, RevisionRequest, StatusUpdate};
use reqwest::Method;
use validator::Validate;

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait OrderApi: Send + Sync {
	/// `GET /orders` filtered by role, status and page.
	async fn list_orders(&self, query: &OrderQuery) -> Result<Page<Order>, ClientError>;

	/// `GET /orders/:id`
	async fn get_order(&self, id: u64) -> Result<Order, ClientError>;

	/// `POST /orders`
	async fn create_order(&self, order: &NewOrder) -> Result<Order, ClientError>;

	/// `PUT /orders/:id/status`
	async fn update_status(&self, id: u64, update: &StatusUpdate) -> Result<(), ClientError>;

	/// `POST /orders/:id/accept`
	async fn accept_delivery(&self, id: u64) -> Result<(), ClientError>;

	/// `POST /orders/:id/revision`
	async fn request_revision(&self, id: u64, request: &RevisionRequest) -> Result<(), ClientError>;
}

#[async_trait]
impl OrderApi for HttpClient {
	async fn list_orders(&self, query: &OrderQuery) -> Result<Page<Order>, ClientError> {
		self.get_page("/orders", query).await
	}

	async fn get_order(&self, id: u64) -> Result<Order, ClientError> {
		self.get(&format!("/orders/{}", id)).await
	}

	async fn create_order(&self, order: &NewOrder) -> Result<Order, ClientError> {
		order.validate()?;
		self.post("/orders", order).await
	}

	async fn update_status(&self, id: u64, update: &StatusUpdate) -> Result<(), ClientError> {
		self.execute(Method::PUT, &format!("/orders/{}/status", id), |r| {
			r.json(update)
		})
		.await
	}

	async fn accept_delivery(&self, id: u64) -> Result<(), ClientError> {
		self.execute(Method::POST, &format!("/orders/{}/accept", id), |r| r)
			.await
	}

	async fn request_revision(&self, id: u64, request: &RevisionRequest) -> Result<(), ClientError> {
		self.execute(Method::POST, &format!("/orders/{}/revision", id), |r| {
			r.json(request)
		})
		.await
	}
}
