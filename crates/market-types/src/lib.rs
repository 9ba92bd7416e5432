//! Common types for the marketplace client.
//!
//! This crate holds the single canonical shape of every entity the backend
//! returns (users, gigs, orders, posts, conversations, notifications), the
//! response envelope every endpoint wraps them in, and the small set of
//! shared primitives (secrets, storage keys, config schemas) used by the
//! other crates. API modules import from here rather than redeclaring.

/// Response envelope, pagination metadata and validation error details.
pub mod api;
/// Gigs and their pricing packages.
pub mod gig;
/// Conversations and direct messages.
pub mod messaging;
/// Notifications and unread counters.
pub mod notification;
/// Orders and their lifecycle status.
pub mod order;
/// Social feed posts and comments.
pub mod post;
/// Registry trait for self-registering backend implementations.
pub mod registry;
/// Redacting wrapper for credentials.
pub mod secret_string;
/// Storage keys for session data.
pub mod storage;
/// Users, profiles and authentication payloads.
pub mod user;
/// Display helpers.
pub mod utils;
/// Configuration schema validation.
pub mod validation;

pub use api::*;
pub use gig::*;
pub use messaging::*;
pub use notification::*;
pub use order::*;
pub use post::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use storage::*;
pub use user::*;
pub use utils::{format_delivery_time, format_price, preview};
pub use validation::*;
