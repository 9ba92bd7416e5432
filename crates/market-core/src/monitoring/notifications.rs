//! Unread notification count polling.

use super::PollerHandle;
use crate::engine::event_bus::{EventBus, MarketEvent};
use market_client::NotificationApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Polls the unread notification count and publishes
/// [`MarketEvent::UnreadCount`] after every successful fetch.
pub struct NotificationPoller {
	api: Arc<dyn NotificationApi>,
	event_bus: EventBus,
	interval: Duration,
}

impl NotificationPoller {
	pub fn new(api: Arc<dyn NotificationApi>, event_bus: EventBus, interval: Duration) -> Self {
		Self {
			api,
			event_bus,
			interval,
		}
	}

	/// Starts polling. The first fetch happens immediately.
	pub fn spawn(self) -> PollerHandle {
		tracing::debug!(interval_secs = self.interval.as_secs(), "Starting notification poller");
		PollerHandle::new(tokio::spawn(async move {
			let mut ticker = tokio::time::interval(self.interval);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				match self.api.unread_count().await {
					Ok(count) => {
						self.event_bus.publish(MarketEvent::UnreadCount(count)).ok();
					},
					Err(e) => {
						tracing::warn!(error = %e, "Failed to poll unread notifications");
					},
				}
			}
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use market_client::{ClientError, MockNotificationApi};
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn counting_api(calls: Arc<AtomicUsize>) -> MockNotificationApi {
		let mut api = MockNotificationApi::new();
		api.expect_unread_count().returning(move || {
			let n = calls.fetch_add(1, Ordering::SeqCst);
			if n == 1 {
				Err(ClientError::Network("unreachable".into()))
			} else {
				Ok(n as u64)
			}
		});
		api
	}

	#[tokio::test(start_paused = true)]
	async fn test_polls_on_interval_and_survives_errors() {
		let calls = Arc::new(AtomicUsize::new(0));
		let bus = EventBus::default();
		let mut events = bus.subscribe();
		let handle = NotificationPoller::new(
			Arc::new(counting_api(calls.clone())),
			bus,
			Duration::from_secs(30),
		)
		.spawn();

		// Ticks at 0s, 30s and 60s; the second one fails
		tokio::time::sleep(Duration::from_secs(65)).await;
		assert_eq!(calls.load(Ordering::SeqCst), 3);

		let mut counts = Vec::new();
		while let Ok(event) = events.try_recv() {
			if let MarketEvent::UnreadCount(count) = event {
				counts.push(count);
			}
		}
		assert_eq!(counts, vec![0, 2]);
		handle.stop();
	}

	#[tokio::test(start_paused = true)]
	async fn test_dropping_handle_stops_polling() {
		let calls = Arc::new(AtomicUsize::new(0));
		let handle = NotificationPoller::new(
			Arc::new(counting_api(calls.clone())),
			EventBus::default(),
			Duration::from_secs(30),
		)
		.spawn();

		tokio::time::sleep(Duration::from_secs(1)).await;
		assert_eq!(calls.load(Ordering::SeqCst), 1);

		drop(handle);
		tokio::time::sleep(Duration::from_secs(300)).await;
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}
}
