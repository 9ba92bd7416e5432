//! Client-side core of the gig marketplace.
//!
//! Ties the REST client, the session and configuration together into a
//! [`Marketplace`], and holds the logic a front end needs around them: which
//! order actions a viewer may take, how a transition is requested and
//! confirmed, page-by-page feeds, background polling, and toasts.

pub mod builder;
pub mod engine;
pub mod feed;
pub mod handlers;
pub mod monitoring;
pub mod panel;
pub mod state;
pub mod toast;

pub use builder::{BuilderError, MarketBuilder};
pub use engine::event_bus::{EventBus, MarketEvent};
pub use engine::Marketplace;
pub use feed::FeedPager;
pub use handlers::{
	can_edit_gig, AuthError, AuthHandler, GigHandler, OrderAction, OrderActionError,
	OrderHandler,
};
pub use monitoring::PollerHandle;
pub use panel::OrderPanel;
pub use state::{actions_for, available_actions, ActionKind, Loadable, Resource, ViewerRole};
pub use toast::{Toast, ToastCenter, ToastLevel};
