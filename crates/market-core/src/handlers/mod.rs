//! Handlers combining API calls with session, toast and event side effects.
//!
//! Plain reads go straight to the per-resource APIs; the handlers here cover
//! the operations that need more than one call or must keep local state in
//! step with the server.

pub mod auth;
pub mod gig;
pub mod order;

pub use auth::{AuthError, AuthHandler};
pub use gig::{can_edit_gig, GigHandler};
pub use order::{OrderAction, OrderActionError, OrderHandler};
