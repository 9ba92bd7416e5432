use crate::{ClientError, HttpClient};
use async_trait::async_trait;
use market_types::{Conversation, Message, NewMessage};
use validator::Validate;

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait MessageApi: Send + Sync {
	/// `GET /messages`, one entry per conversation partner.
	async fn conversations(&self) -> Result<Vec<Conversation>, ClientError>;

	/// `GET /messages/:userId`, oldest message first.
	async fn thread(&self, user_id: u64) -> Result<Vec<Message>, ClientError>;

	/// `POST /messages`
	async fn send_message(&self, message: &NewMessage) -> Result<Message, ClientError>;
}

#[async_trait]
impl MessageApi for HttpClient {
	async fn conversations(&self) -> Result<Vec<Conversation>, ClientError> {
		self.get("/messages").await
	}

	async fn thread(&self, user_id: u64) -> Result<Vec<Message>, ClientError> {
		let mut messages: Vec<Message> = self.get(&format!("/messages/{}", user_id)).await?;
		messages.sort_by_key(|m| (m.created_at, m.id));
		Ok(messages)
	}

	async fn send_message(&self, message: &NewMessage) -> Result<Message, ClientError> {
		message.validate()?;
		self.post("/messages", message).await
	}
}
