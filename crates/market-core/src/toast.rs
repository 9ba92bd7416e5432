//! Transient user notifications.
//!
//! A toast is shown for a fixed duration and then disappears on its own.
//! [`ToastCenter`] keeps the active ones and announces each new toast on the
//! event bus.

use crate::engine::event_bus::{EventBus, MarketEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
	Success,
	Error,
	Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
	pub id: u64,
	pub level: ToastLevel,
	pub message: String,
	pub duration: Duration,
	pub shown_at: Instant,
}

impl Toast {
	pub fn is_expired(&self, now: Instant) -> bool {
		now.duration_since(self.shown_at) >= self.duration
	}
}

/// Holds the toasts currently on screen.
#[derive(Clone)]
pub struct ToastCenter {
	active: Arc<Mutex<Vec<Toast>>>,
	next_id: Arc<AtomicU64>,
	duration: Duration,
	event_bus: EventBus,
}

impl ToastCenter {
	pub fn new(duration: Duration, event_bus: EventBus) -> Self {
		Self {
			active: Arc::new(Mutex::new(Vec::new())),
			next_id: Arc::new(AtomicU64::new(1)),
			duration,
			event_bus,
		}
	}

	fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
		self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	pub fn push(&self, level: ToastLevel, message: impl Into<String>) -> Toast {
		let toast = Toast {
			id: self.next_id.fetch_add(1, Ordering::Relaxed),
			level,
			message: message.into(),
			duration: self.duration,
			shown_at: Instant::now(),
		};
		self.lock().push(toast.clone());
		self.event_bus.publish(MarketEvent::Toast(toast.clone())).ok();
		toast
	}

	pub fn success(&self, message: impl Into<String>) -> Toast {
		self.push(ToastLevel::Success, message)
	}

	pub fn error(&self, message: impl Into<String>) -> Toast {
		self.push(ToastLevel::Error, message)
	}

	pub fn info(&self, message: impl Into<String>) -> Toast {
		self.push(ToastLevel::Info, message)
	}

	/// Toasts still within their display duration, oldest first.
	pub fn active(&self) -> Vec<Toast> {
		let now = Instant::now();
		let mut active = self.lock();
		active.retain(|toast| !toast.is_expired(now));
		active.clone()
	}

	pub fn dismiss(&self, id: u64) {
		self.lock().retain(|toast| toast.id != id);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn test_toasts_expire_after_duration() {
		let center = ToastCenter::new(Duration::from_secs(3), EventBus::default());
		center.success("Order started");
		tokio::time::advance(Duration::from_secs(2)).await;
		center.error("Could not load feed");

		assert_eq!(center.active().len(), 2);

		tokio::time::advance(Duration::from_secs(1)).await;
		let active = center.active();
		assert_eq!(active.len(), 1);
		assert_eq!(active[0].level, ToastLevel::Error);

		tokio::time::advance(Duration::from_secs(2)).await;
		assert!(center.active().is_empty());
	}

	#[tokio::test]
	async fn test_push_publishes_and_dismiss_removes() {
		let bus = EventBus::default();
		let mut events = bus.subscribe();
		let center = ToastCenter::new(Duration::from_secs(3), bus);

		let toast = center.info("Copied link");
		match events.recv().await.unwrap() {
			MarketEvent::Toast(published) => assert_eq!(published, toast),
			other => panic!("unexpected event {:?}", other),
		}

		center.dismiss(toast.id);
		assert!(center.active().is_empty());
	}
}
