//! Background polling tasks.
//!
//! Each poller runs on its own spawned task and publishes what it fetches on
//! the event bus. A failed poll is logged and the next tick tries again.
//! Polling stops when the returned [`PollerHandle`] is stopped or dropped.

pub mod messages;
pub mod notifications;

pub use messages::ThreadPoller;
pub use notifications::NotificationPoller;

use tokio::task::JoinHandle;

/// Owns a running poller task.
pub struct PollerHandle {
	task: JoinHandle<()>,
}

impl PollerHandle {
	pub(crate) fn new(task: JoinHandle<()>) -> Self {
		Self { task }
	}

	/// Cancels the task. A fetch already in flight is abandoned.
	pub fn stop(&self) {
		self.task.abort();
	}

	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}
}

impl Drop for PollerHandle {
	fn drop(&mut self) {
		self.task.abort();
	}
}
