//! Client-side view state.
//!
//! `order` projects the backend's order lifecycle onto the actions a viewer
//! may request; `loadable` tracks the fetch state of a single surface.

pub mod loadable;
pub mod order;

pub use loadable::{Loadable, Resource};
pub use order::{actions_for, available_actions, ActionKind, ViewerRole};
