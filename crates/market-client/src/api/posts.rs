use crate::{ClientError, HttpClient};
use async_trait::async_trait;
use market_types::{Comment, NewComment, NewPost, Page, Post, ToggleState};
use reqwest::Method;
use serde::Serialize;
use validator::Validate;

#[derive(Serialize)]
struct PageQuery {
	page: u32,
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait PostApi: Send + Sync {
	async fn create_post(&self, post: &NewPost) -> Result<Post, ClientError>;
	async fn delete_post(&self, id: u64) -> Result<(), ClientError>;

	/// `GET /posts/feed?page=N`, posts from followed users first.
	async fn feed(&self, page: u32) -> Result<Page<Post>, ClientError>;

	/// `GET /posts?page=N`
	async fn list_posts(&self, page: u32) -> Result<Page<Post>, ClientError>;

	async fn toggle_like(&self, id: u64) -> Result<ToggleState, ClientError>;
	async fn toggle_bookmark(&self, id: u64) -> Result<ToggleState, ClientError>;
	async fn comment(&self, id: u64, comment: &NewComment) -> Result<Comment, ClientError>;
	async fn comments(&self, id: u64) -> Result<Vec<Comment>, ClientError>;
}

#[async_trait]
impl PostApi for HttpClient {
	async fn create_post(&self, post: &NewPost) -> Result<Post, ClientError> {
		post.validate()?;
		self.post("/posts", post).await
	}

	async fn delete_post(&self, id: u64) -> Result<(), ClientError> {
		self.execute(Method::DELETE, &format!("/posts/{}", id), |r| r)
			.await
	}

	async fn feed(&self, page: u32) -> Result<Page<Post>, ClientError> {
		self.get_page("/posts/feed", &PageQuery { page }).await
	}

	async fn list_posts(&self, page: u32) -> Result<Page<Post>, ClientError> {
		self.get_page("/posts", &PageQuery { page }).await
	}

	async fn toggle_like(&self, id: u64) -> Result<ToggleState, ClientError> {
		self.post_empty(&format!("/posts/{}/like", id)).await
	}

	async fn toggle_bookmark(&self, id: u64) -> Result<ToggleState, ClientError> {
		self.post_empty(&format!("/posts/{}/bookmark", id)).await
	}

	async fn comment(&self, id: u64, comment: &NewComment) -> Result<Comment, ClientError> {
		comment.validate()?;
		self.post(&format!("/posts/{}/comment", id), comment).await
	}

	async fn comments(&self, id: u64) -> Result<Vec<Comment>, ClientError> {
		self.get(&format!("/posts/{}/comments", id)).await
	}
}
