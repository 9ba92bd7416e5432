//! Polling of the open message thread.

use super::PollerHandle;
use crate::engine::event_bus::{EventBus, MarketEvent};
use market_client::MessageApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Re-fetches the thread with one user while it is open and publishes
/// [`MarketEvent::ThreadUpdated`] with the full thread each time.
///
/// There is no de-duplication: each successful fetch replaces the previous
/// one wholesale.
pub struct ThreadPoller {
	api: Arc<dyn MessageApi>,
	event_bus: EventBus,
	user_id: u64,
	interval: Duration,
}

impl ThreadPoller {
	pub fn new(
		api: Arc<dyn MessageApi>,
		event_bus: EventBus,
		user_id: u64,
		interval: Duration,
	) -> Self {
		Self {
			api,
			event_bus,
			user_id,
			interval,
		}
	}

	pub fn spawn(self) -> PollerHandle {
		tracing::debug!(user_id = self.user_id, "Watching message thread");
		PollerHandle::new(tokio::spawn(async move {
			let mut ticker = tokio::time::interval(self.interval);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				match self.api.thread(self.user_id).await {
					Ok(messages) => {
						self.event_bus
							.publish(MarketEvent::ThreadUpdated {
								user_id: self.user_id,
								messages,
							})
							.ok();
					},
					Err(e) => {
						tracing::warn!(user_id = self.user_id, error = %e, "Failed to poll message thread");
					},
				}
			}
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use market_client::MockMessageApi;
	use market_types::Message;
	use mockall::predicate::eq;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[tokio::test(start_paused = true)]
	async fn test_thread_polled_until_closed() {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		let mut api = MockMessageApi::new();
		api.expect_thread().with(eq(42)).returning(move |_| {
			let n = counter.fetch_add(1, Ordering::SeqCst) as u64;
			Ok(vec![Message {
				id: n,
				sender_id: 42,
				receiver_id: 7,
				content: "hi".into(),
				read: false,
				created_at: Utc::now(),
			}])
		});
		let bus = EventBus::default();
		let mut events = bus.subscribe();

		let handle = ThreadPoller::new(Arc::new(api), bus, 42, Duration::from_secs(5)).spawn();
		// Ticks at 0s, 5s and 10s
		tokio::time::sleep(Duration::from_secs(12)).await;
		assert_eq!(calls.load(Ordering::SeqCst), 3);

		match events.try_recv().unwrap() {
			MarketEvent::ThreadUpdated { user_id, messages } => {
				assert_eq!(user_id, 42);
				assert_eq!(messages.len(), 1);
			},
			other => panic!("unexpected event {:?}", other),
		}

		handle.stop();
		tokio::time::sleep(Duration::from_secs(60)).await;
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}
}
