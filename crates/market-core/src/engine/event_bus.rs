//! Broadcast channel connecting handlers and pollers to whatever renders
//! their results.

use crate::toast::Toast;
use market_types::{Message, Order, User};
use tokio::sync::broadcast;

/// Something the presentation layer may want to react to.
#[derive(Debug, Clone)]
pub enum MarketEvent {
	/// An order was re-fetched after a transition request.
	OrderUpdated(Box<Order>),
	/// A toast was raised.
	Toast(Toast),
	/// Latest unread notification count from the poller.
	UnreadCount(u64),
	/// Latest contents of an open message thread.
	ThreadUpdated { user_id: u64, messages: Vec<Message> },
	/// The logged-in user changed; `None` after logout.
	SessionChanged(Option<Box<User>>),
}

/// Cloneable handle to the event channel. Publishing without subscribers is
/// not an error worth reporting, so callers usually `.ok()` the result.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<MarketEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
		self.sender.subscribe()
	}

	pub fn publish(
		&self,
		event: MarketEvent,
	) -> Result<usize, broadcast::error::SendError<MarketEvent>> {
		self.sender.send(event)
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(256)
	}
}
