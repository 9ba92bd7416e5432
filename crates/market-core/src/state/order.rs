//! Which order actions a viewer may request.
//!
//! The backend owns the order state machine. This module only projects it
//! onto the client: for an order in a given status, which buttons the
//! seller or buyer gets. It never produces a new status.

use market_types::{Order, OrderStatus};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// How the viewing user relates to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerRole {
	Seller,
	Buyer,
	/// Anyone else, including logged-out viewers.
	Observer,
}

impl ViewerRole {
	/// Resolves the role of `viewer_id` on `order`.
	pub fn of(order: &Order, viewer_id: Option<u64>) -> Self {
		match viewer_id {
			Some(id) if id == order.seller_id => ViewerRole::Seller,
			Some(id) if id == order.buyer_id => ViewerRole::Buyer,
			_ => ViewerRole::Observer,
		}
	}
}

/// A transition the client can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
	Start,
	Deliver,
	Redeliver,
	Accept,
	RequestRevision,
}

impl ActionKind {
	/// Button label.
	pub fn label(&self) -> &'static str {
		match self {
			ActionKind::Start => "Start Order",
			ActionKind::Deliver => "Deliver Order",
			ActionKind::Redeliver => "Re-deliver Order",
			ActionKind::Accept => "Accept Delivery",
			ActionKind::RequestRevision => "Request Revision",
		}
	}

	/// Status the request asks for. The server may answer with another one.
	pub fn requested_status(&self) -> OrderStatus {
		match self {
			ActionKind::Start => OrderStatus::InProgress,
			ActionKind::Deliver | ActionKind::Redeliver => OrderStatus::Delivered,
			ActionKind::Accept => OrderStatus::Completed,
			ActionKind::RequestRevision => OrderStatus::Revision,
		}
	}

	/// Whether the action carries a delivery note.
	pub fn requires_note(&self) -> bool {
		matches!(self, ActionKind::Deliver | ActionKind::Redeliver)
	}

	/// Whether the action carries a revision reason.
	pub fn requires_reason(&self) -> bool {
		matches!(self, ActionKind::RequestRevision)
	}
}

impl fmt::Display for ActionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

static ACTIONS: Lazy<HashMap<(OrderStatus, ViewerRole), Vec<ActionKind>>> = Lazy::new(|| {
	HashMap::from([
		(
			(OrderStatus::Pending, ViewerRole::Seller),
			vec![ActionKind::Start],
		),
		(
			(OrderStatus::InProgress, ViewerRole::Seller),
			vec![ActionKind::Deliver],
		),
		(
			(OrderStatus::Revision, ViewerRole::Seller),
			vec![ActionKind::Redeliver],
		),
		(
			(OrderStatus::Delivered, ViewerRole::Buyer),
			vec![ActionKind::Accept, ActionKind::RequestRevision],
		),
	])
});

/// Actions available for an order status and role, in display order.
pub fn actions_for(status: OrderStatus, role: ViewerRole) -> &'static [ActionKind] {
	ACTIONS
		.get(&(status, role))
		.map(Vec::as_slice)
		.unwrap_or(&[])
}

/// Actions the viewer may request on `order`.
pub fn available_actions(order: &Order, viewer_id: Option<u64>) -> Vec<ActionKind> {
	actions_for(order.status, ViewerRole::of(order, viewer_id)).to_vec()
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use market_types::PackageType;

	const BUYER: u64 = 10;
	const SELLER: u64 = 20;

	fn order(status: OrderStatus) -> Order {
		Order {
			id: 1,
			gig_id: Some(2),
			buyer_id: BUYER,
			seller_id: SELLER,
			package_type: PackageType::Basic,
			price: Default::default(),
			delivery_time: 3,
			status,
			requirements: None,
			delivery_note: None,
			delivery_files: Vec::new(),
			revision_reason: None,
			created_at: Utc::now(),
			updated_at: Utc::now(),
			completed_at: None,
			gig: None,
			buyer: None,
			seller: None,
		}
	}

	#[test]
	fn test_pending_only_seller_can_start() {
		let pending = order(OrderStatus::Pending);
		assert_eq!(
			available_actions(&pending, Some(SELLER)),
			vec![ActionKind::Start]
		);
		assert!(available_actions(&pending, Some(BUYER)).is_empty());
		assert!(available_actions(&pending, Some(99)).is_empty());
		assert!(available_actions(&pending, None).is_empty());
	}

	#[test]
	fn test_delivered_only_buyer_can_respond() {
		let delivered = order(OrderStatus::Delivered);
		let labels: Vec<_> = available_actions(&delivered, Some(BUYER))
			.iter()
			.map(ActionKind::label)
			.collect();
		assert_eq!(labels, vec!["Accept Delivery", "Request Revision"]);
		assert!(available_actions(&delivered, Some(SELLER)).is_empty());
	}

	#[test]
	fn test_seller_delivery_actions() {
		assert_eq!(
			available_actions(&order(OrderStatus::InProgress), Some(SELLER)),
			vec![ActionKind::Deliver]
		);
		assert_eq!(
			available_actions(&order(OrderStatus::Revision), Some(SELLER)),
			vec![ActionKind::Redeliver]
		);
		assert!(available_actions(&order(OrderStatus::Revision), Some(BUYER)).is_empty());
	}

	#[test]
	fn test_terminal_statuses_have_no_actions() {
		for status in [OrderStatus::Completed, OrderStatus::Cancelled] {
			for role in [ViewerRole::Seller, ViewerRole::Buyer, ViewerRole::Observer] {
				assert!(actions_for(status, role).is_empty());
			}
		}
	}

	#[test]
	fn test_action_payload_requirements() {
		assert!(ActionKind::Deliver.requires_note());
		assert!(ActionKind::Redeliver.requires_note());
		assert!(ActionKind::RequestRevision.requires_reason());
		assert!(!ActionKind::Accept.requires_note());
		assert_eq!(
			ActionKind::Redeliver.requested_status(),
			OrderStatus::Delivered
		);
	}
}
