use crate::{ClientError, HttpClient};
use async_trait::async_trait;
use market_types::{Notification, Page, UnreadCount};
use reqwest::Method;
use serde::Serialize;

#[derive(Serialize)]
struct PageQuery {
	page: u32,
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait NotificationApi: Send + Sync {
	async fn notifications(&self, page: u32) -> Result<Page<Notification>, ClientError>;

	/// `GET /notifications/unread-count`
	async fn unread_count(&self) -> Result<u64, ClientError>;

	async fn mark_read(&self, id: u64) -> Result<(), ClientError>;
	async fn mark_all_read(&self) -> Result<(), ClientError>;
}

#[async_trait]
impl NotificationApi for HttpClient {
	async fn notifications(&self, page: u32) -> Result<Page<Notification>, ClientError> {
		self.get_page("/notifications", &PageQuery { page }).await
	}

	async fn unread_count(&self) -> Result<u64, ClientError> {
		let count: UnreadCount = self.get("/notifications/unread-count").await?;
		Ok(count.count)
	}

	async fn mark_read(&self, id: u64) -> Result<(), ClientError> {
		self.execute(Method::POST, &format!("/notifications/{}/read", id), |r| r)
			.await
	}

	async fn mark_all_read(&self) -> Result<(), ClientError> {
		self.execute(Method::POST, "/notifications/read-all", |r| r)
			.await
	}
}
