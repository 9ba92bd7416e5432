//! The assembled marketplace client.
//!
//! [`Marketplace`] owns the transport, the session and the handlers built on
//! them, and hands out the per-page pieces (order panels, feed pagers,
//! pollers) that a front end drives.

pub mod event_bus;

use crate::feed::FeedPager;
use crate::handlers::{AuthHandler, GigHandler, OrderHandler};
use crate::monitoring::{NotificationPoller, PollerHandle, ThreadPoller};
use crate::panel::OrderPanel;
use crate::state::Resource;
use crate::toast::ToastCenter;
use event_bus::EventBus;
use market_client::{
	HttpClient, MessageApi, NotificationApi, PostApi, ProfileApi, SocialApi, UploadApi,
};
use market_config::Config;
use market_session::{SessionProvider, SessionStore};
use market_types::{Gig, Post, Profile, User};
use std::sync::Arc;

/// Everything a front end needs to talk to the marketplace.
#[derive(Clone)]
pub struct Marketplace {
	pub(crate) config: Config,
	pub(crate) session: Arc<SessionStore>,
	pub(crate) client: Arc<HttpClient>,
	pub(crate) event_bus: EventBus,
	pub(crate) toasts: ToastCenter,
	pub(crate) auth: Arc<AuthHandler>,
	pub(crate) orders: Arc<OrderHandler>,
	pub(crate) gigs: Arc<GigHandler>,
}

impl Marketplace {
	pub fn new(config: Config, session: Arc<SessionStore>, client: Arc<HttpClient>) -> Self {
		let event_bus = EventBus::default();
		let toasts = ToastCenter::new(config.ui.toast_duration(), event_bus.clone());
		let auth = Arc::new(AuthHandler::new(
			client.clone(),
			session.clone(),
			event_bus.clone(),
			toasts.clone(),
		));
		let orders = Arc::new(OrderHandler::new(
			client.clone(),
			event_bus.clone(),
			toasts.clone(),
		));
		let gigs = Arc::new(GigHandler::new(client.clone(), session.clone()));

		Self {
			config,
			session,
			client,
			event_bus,
			toasts,
			auth,
			orders,
			gigs,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn session(&self) -> &Arc<SessionStore> {
		&self.session
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	pub fn toasts(&self) -> &ToastCenter {
		&self.toasts
	}

	pub fn auth(&self) -> &AuthHandler {
		&self.auth
	}

	pub fn orders(&self) -> &OrderHandler {
		&self.orders
	}

	pub fn gigs(&self) -> &GigHandler {
		&self.gigs
	}

	pub fn profiles(&self) -> Arc<dyn ProfileApi> {
		self.client.clone()
	}

	pub fn posts(&self) -> Arc<dyn PostApi> {
		self.client.clone()
	}

	pub fn messages(&self) -> Arc<dyn MessageApi> {
		self.client.clone()
	}

	pub fn notifications(&self) -> Arc<dyn NotificationApi> {
		self.client.clone()
	}

	pub fn social(&self) -> Arc<dyn SocialApi> {
		self.client.clone()
	}

	pub fn uploads(&self) -> Arc<dyn UploadApi> {
		self.client.clone()
	}

	/// The cached logged-in user, if any.
	pub async fn current_user(&self) -> Option<User> {
		self.session.current_user().await
	}

	/// A fresh pager over the logged-in user's feed.
	pub fn feed(&self) -> FeedPager<Post> {
		FeedPager::posts(self.posts())
	}

	/// An unloaded panel for order `order_id`, seen by the current user.
	pub async fn order_panel(&self, order_id: u64) -> OrderPanel {
		let viewer_id = self.current_user().await.map(|user| user.id);
		OrderPanel::new(order_id, viewer_id, self.orders.clone())
	}

	/// Gig detail page; `retry` re-fetches after a failure.
	pub fn gig_page(&self, id: u64) -> Resource<Gig> {
		let gigs = self.gigs.clone();
		Resource::new(move || {
			let gigs = gigs.clone();
			async move { gigs.get_gig(id).await }
		})
	}

	/// Profile page of `username`, or of the logged-in user when `None`.
	pub fn profile_page(&self, username: Option<String>) -> Resource<Profile> {
		let profiles = self.profiles();
		Resource::new(move || {
			let profiles = profiles.clone();
			let username = username.clone();
			async move {
				match username {
					Some(username) => profiles.profile(&username).await,
					None => profiles.my_profile().await,
				}
			}
		})
	}

	/// Starts polling the unread notification count.
	pub fn watch_notifications(&self) -> PollerHandle {
		NotificationPoller::new(
			self.notifications(),
			self.event_bus.clone(),
			self.config.polling.notifications_interval(),
		)
		.spawn()
	}

	/// Starts polling the thread with `user_id`; drop the handle when the
	/// thread is closed.
	pub fn watch_thread(&self, user_id: u64) -> PollerHandle {
		ThreadPoller::new(
			self.messages(),
			self.event_bus.clone(),
			user_id,
			self.config.polling.messages_interval(),
		)
		.spawn()
	}
}
