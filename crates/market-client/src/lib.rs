//! REST client for the marketplace backend.
//!
//! One transport ([`HttpClient`]) and one error type ([`ClientError`]) serve
//! every resource. Each resource is exposed as its own trait so callers can
//! depend on exactly the surface they use and tests can substitute mocks
//! (generated with the `testing` feature).

mod error;
mod http;

/// Per-resource API traits and their HTTP implementations.
pub mod api {
	pub mod auth;
	pub mod gigs;
	pub mod messages;
	pub mod notifications;
	pub mod orders;
	pub mod posts;
	pub mod profile;
	pub mod social;
	pub mod upload;
}

pub use api::auth::AuthApi;
pub use api::gigs::GigApi;
pub use api::messages::MessageApi;
pub use api::notifications::NotificationApi;
pub use api::orders::OrderApi;
pub use api::posts::PostApi;
pub use api::profile::ProfileApi;
pub use api::social::SocialApi;
pub use api::upload::{UploadApi, UploadKind, UploadedFile};
pub use error::ClientError;
pub use http::HttpClient;

#[cfg(feature = "testing")]
pub use api::{
	auth::MockAuthApi, gigs::MockGigApi, messages::MockMessageApi,
	notifications::MockNotificationApi, orders::MockOrderApi, posts::MockPostApi,
	profile::MockProfileApi, social::MockSocialApi, upload::MockUploadApi,
};
