//! The order detail page.
//!
//! Holds the order as last fetched and the viewer it is shown to. An action
//! replaces the held order only when the request and the re-fetch both
//! succeed; on any failure the previous state stays as it was.

use crate::handlers::{OrderAction, OrderActionError, OrderHandler};
use crate::state::{available_actions, ActionKind, Loadable};
use market_types::Order;
use std::sync::Arc;

pub struct OrderPanel {
	order_id: u64,
	viewer_id: Option<u64>,
	state: Loadable<Order>,
	handler: Arc<OrderHandler>,
}

impl OrderPanel {
	pub fn new(order_id: u64, viewer_id: Option<u64>, handler: Arc<OrderHandler>) -> Self {
		Self {
			order_id,
			viewer_id,
			state: Loadable::Idle,
			handler,
		}
	}

	pub fn order_id(&self) -> u64 {
		self.order_id
	}

	pub fn state(&self) -> &Loadable<Order> {
		&self.state
	}

	pub fn order(&self) -> Option<&Order> {
		self.state.value()
	}

	/// Fetches the order. Also serves as "try again" after a failed load.
	pub async fn load(&mut self) -> &Loadable<Order> {
		let handler = self.handler.clone();
		let id = self.order_id;
		self.state.load(|| async move { handler.get_order(id).await }).await
	}

	/// Actions to render for the loaded order; none while not loaded.
	pub fn actions(&self) -> Vec<ActionKind> {
		self.order()
			.map(|order| available_actions(order, self.viewer_id))
			.unwrap_or_default()
	}

	/// Requests `action` if the viewer is offered it, then swaps in the
	/// re-fetched order.
	pub async fn perform(&mut self, action: OrderAction) -> Result<&Order, OrderActionError> {
		if let Some(order) = self.order() {
			let kind = action.kind(order.status);
			if !self.actions().contains(&kind) {
				return Err(OrderActionError::NotAvailable(kind));
			}
		}

		let updated = self.handler.dispatch(self.order_id, action).await?;
		self.state = Loadable::Loaded(updated);
		self.order()
			.ok_or_else(|| OrderActionError::Validation("Order is not loaded.".to_string()))
	}
}
