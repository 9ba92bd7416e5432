//! Order handler: listing, creation and transition requests.
//!
//! A transition is requested, never applied. After the backend accepts a
//! request the order is fetched again and whatever status the server now
//! reports is what the caller gets, even if it is not the one requested.

use crate::engine::event_bus::{EventBus, MarketEvent};
use crate::state::ActionKind;
use crate::toast::ToastCenter;
use market_client::{ClientError, OrderApi};
use market_types::{
	NewOrder, Order, OrderQuery, OrderRoleFilter, OrderStatus, PackageType, Page, RevisionRequest,
	StatusUpdate,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// A transition request and its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
	Start,
	/// Deliver, or re-deliver after a revision request.
	Deliver { note: String, files: Vec<String> },
	Accept,
	RequestRevision { reason: String },
}

impl OrderAction {
	pub fn name(&self) -> &'static str {
		match self {
			OrderAction::Start => "start",
			OrderAction::Deliver { .. } => "deliver",
			OrderAction::Accept => "accept",
			OrderAction::RequestRevision { .. } => "request_revision",
		}
	}

	/// The action kind this request corresponds to for an order currently
	/// in `status`.
	pub fn kind(&self, status: OrderStatus) -> ActionKind {
		match self {
			OrderAction::Start => ActionKind::Start,
			OrderAction::Deliver { .. } if status == OrderStatus::Revision => ActionKind::Redeliver,
			OrderAction::Deliver { .. } => ActionKind::Deliver,
			OrderAction::Accept => ActionKind::Accept,
			OrderAction::RequestRevision { .. } => ActionKind::RequestRevision,
		}
	}

	fn success_message(&self) -> &'static str {
		match self {
			OrderAction::Start => "Order started.",
			OrderAction::Deliver { .. } => "Order delivered.",
			OrderAction::Accept => "Delivery accepted. Order completed.",
			OrderAction::RequestRevision { .. } => "Revision requested.",
		}
	}
}

/// Errors that can occur while requesting an order transition.
#[derive(Debug, Error)]
pub enum OrderActionError {
	/// The payload failed a local check; nothing was sent.
	#[error("Validation error: {0}")]
	Validation(String),
	/// The action is not offered to this viewer for the order's status.
	#[error("{0} is not available for this order")]
	NotAvailable(ActionKind),
	/// The backend rejected the request or could not be reached.
	#[error("Request failed: {0}")]
	Request(ClientError),
	/// The request succeeded but the order could not be fetched again.
	#[error("Order updated but could not be reloaded: {0}")]
	Refetch(ClientError),
}

impl OrderActionError {
	pub fn user_message(&self) -> String {
		match self {
			OrderActionError::Validation(message) => message.clone(),
			OrderActionError::NotAvailable(kind) => {
				format!("\"{}\" is not available for this order.", kind.label())
			},
			OrderActionError::Request(e) => e.user_message(),
			OrderActionError::Refetch(e) => format!(
				"The order was updated, but reloading it failed: {}",
				e.user_message()
			),
		}
	}
}

fn require_text(value: &str, message: &str) -> Result<String, OrderActionError> {
	let trimmed = value.trim();
	if trimmed.is_empty() {
		return Err(OrderActionError::Validation(message.to_string()));
	}
	Ok(trimmed.to_string())
}

/// Handler for order operations.
pub struct OrderHandler {
	orders: Arc<dyn OrderApi>,
	event_bus: EventBus,
	toasts: ToastCenter,
}

impl OrderHandler {
	pub fn new(orders: Arc<dyn OrderApi>, event_bus: EventBus, toasts: ToastCenter) -> Self {
		Self {
			orders,
			event_bus,
			toasts,
		}
	}

	pub async fn get_order(&self, id: u64) -> Result<Order, ClientError> {
		self.orders.get_order(id).await
	}

	pub async fn list_orders(
		&self,
		role: OrderRoleFilter,
		status: Option<OrderStatus>,
		page: Option<u32>,
	) -> Result<Page<Order>, ClientError> {
		self.orders
			.list_orders(&OrderQuery {
				role: Some(role),
				status,
				page,
			})
			.await
	}

	/// Places an order for one package of a gig.
	pub async fn create_order(
		&self,
		gig_id: u64,
		package_type: PackageType,
		requirements: &str,
	) -> Result<Order, ClientError> {
		let requirements = requirements.trim();
		if requirements.is_empty() {
			return Err(ClientError::Validation(
				"Please describe your requirements.".to_string(),
			));
		}

		let order = self
			.orders
			.create_order(&NewOrder {
				gig_id,
				package_type,
				requirements: requirements.to_string(),
			})
			.await?;
		tracing::info!(order_id = order.id, gig_id, package = %package_type, "Order placed");
		self.toasts.success("Order placed.");
		Ok(order)
	}

	/// Requests a transition and returns the order as the server reports it
	/// afterwards. Failures are toasted and returned; nothing is retried.
	#[instrument(skip_all, fields(order_id = order_id, action = action.name()))]
	pub async fn dispatch(&self, order_id: u64, action: OrderAction) -> Result<Order, OrderActionError> {
		let result = self.request(order_id, &action).await;
		let order = match result {
			Ok(()) => self
				.orders
				.get_order(order_id)
				.await
				.map_err(OrderActionError::Refetch),
			Err(e) => Err(e),
		};

		match order {
			Ok(order) => {
				tracing::info!(status = %order.status.as_str(), "Order action completed");
				self.toasts.success(action.success_message());
				self.event_bus
					.publish(MarketEvent::OrderUpdated(Box::new(order.clone())))
					.ok();
				Ok(order)
			},
			Err(e) => {
				tracing::warn!(error = %e, "Order action failed");
				self.toasts.error(e.user_message());
				Err(e)
			},
		}
	}

	/// Validates the payload and sends the transition request.
	async fn request(&self, order_id: u64, action: &OrderAction) -> Result<(), OrderActionError> {
		let sent = match action {
			OrderAction::Start => {
				self.orders
					.update_status(
						order_id,
						&StatusUpdate {
							status: OrderStatus::InProgress,
							delivery_note: None,
							delivery_files: Vec::new(),
						},
					)
					.await
			},
			OrderAction::Deliver { note, files } => {
				let note = require_text(note, "Please add a delivery note.")?;
				self.orders
					.update_status(
						order_id,
						&StatusUpdate {
							status: OrderStatus::Delivered,
							delivery_note: Some(note),
							delivery_files: files.clone(),
						},
					)
					.await
			},
			OrderAction::Accept => self.orders.accept_delivery(order_id).await,
			OrderAction::RequestRevision { reason } => {
				let reason = require_text(reason, "Please explain what needs to change.")?;
				self.orders
					.request_revision(order_id, &RevisionRequest { reason })
					.await
			},
		};
		sent.map_err(OrderActionError::Request)
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use chrono::Utc;
	use market_client::MockOrderApi;
	use mockall::predicate::eq;
	use std::time::Duration;

	pub(crate) const BUYER: u64 = 10;
	pub(crate) const SELLER: u64 = 20;

	pub(crate) fn order(status: OrderStatus) -> Order {
		Order {
			id: 5,
			gig_id: Some(2),
			buyer_id: BUYER,
			seller_id: SELLER,
			package_type: PackageType::Standard,
			price: Default::default(),
			delivery_time: 3,
			status,
			requirements: Some("A logo".into()),
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

	fn handler(api: MockOrderApi) -> (OrderHandler, EventBus, ToastCenter) {
		let bus = EventBus::default();
		let toasts = ToastCenter::new(Duration::from_secs(3), bus.clone());
		(
			OrderHandler::new(Arc::new(api), bus.clone(), toasts.clone()),
			bus,
			toasts,
		)
	}

	#[tokio::test]
	async fn test_blank_note_sends_nothing() {
		let mut api = MockOrderApi::new();
		api.expect_update_status().never();
		api.expect_get_order().never();
		let (handler, _, toasts) = handler(api);

		let err = handler
			.dispatch(
				5,
				OrderAction::Deliver {
					note: "  \n".into(),
					files: vec![],
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, OrderActionError::Validation(_)));
		assert_eq!(toasts.active()[0].message, "Please add a delivery note.");
	}

	#[tokio::test]
	async fn test_blank_reason_sends_nothing() {
		let mut api = MockOrderApi::new();
		api.expect_request_revision().never();
		api.expect_get_order().never();
		let (handler, _, _) = handler(api);

		let err = handler
			.dispatch(
				5,
				OrderAction::RequestRevision {
					reason: String::new(),
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, OrderActionError::Validation(_)));
	}

	#[tokio::test]
	async fn test_success_returns_server_status() {
		let mut api = MockOrderApi::new();
		api.expect_update_status()
			.withf(|id, update| {
				*id == 5
					&& update.status == OrderStatus::Delivered
					&& update.delivery_note.as_deref() == Some("Files attached")
			})
			.times(1)
			.returning(|_, _| Ok(()));
		// Server auto-completed the order instead of leaving it delivered
		api.expect_get_order()
			.with(eq(5))
			.times(1)
			.returning(|_| Ok(order(OrderStatus::Completed)));
		let (handler, bus, toasts) = handler(api);
		let mut events = bus.subscribe();

		let updated = handler
			.dispatch(
				5,
				OrderAction::Deliver {
					note: " Files attached ".into(),
					files: vec![],
				},
			)
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::Completed);
		assert_eq!(toasts.active()[0].message, "Order delivered.");

		let mut saw_update = false;
		while let Ok(event) = events.try_recv() {
			if let MarketEvent::OrderUpdated(order) = event {
				assert_eq!(order.status, OrderStatus::Completed);
				saw_update = true;
			}
		}
		assert!(saw_update);
	}

	#[tokio::test]
	async fn test_failure_is_toasted_and_not_retried() {
		let mut api = MockOrderApi::new();
		api.expect_accept_delivery()
			.with(eq(5))
			.times(1)
			.returning(|_| {
				Err(ClientError::Api {
					status: 200,
					message: "X".into(),
				})
			});
		api.expect_get_order().never();
		let (handler, _, toasts) = handler(api);

		let err = handler.dispatch(5, OrderAction::Accept).await.unwrap_err();
		assert_eq!(err.user_message(), "X");
		assert_eq!(toasts.active()[0].message, "X");
	}

	#[tokio::test]
	async fn test_refetch_failure_is_distinct() {
		let mut api = MockOrderApi::new();
		api.expect_update_status().returning(|_, _| Ok(()));
		api.expect_get_order()
			.returning(|_| Err(ClientError::Network("reset".into())));
		let (handler, _, _) = handler(api);

		let err = handler.dispatch(5, OrderAction::Start).await.unwrap_err();
		assert!(matches!(err, OrderActionError::Refetch(_)));
	}

	#[tokio::test]
	async fn test_create_order_requires_requirements() {
		let mut api = MockOrderApi::new();
		api.expect_create_order().never();
		let (handler, _, _) = handler(api);

		let err = handler
			.create_order(2, PackageType::Basic, " ")
			.await
			.unwrap_err();
		assert!(matches!(err, ClientError::Validation(_)));
	}

	#[tokio::test]
	async fn test_list_orders_passes_role() {
		let mut api = MockOrderApi::new();
		api.expect_list_orders()
			.withf(|query| query.role == Some(OrderRoleFilter::Buying) && query.status.is_none())
			.returning(|_| {
				Ok(Page {
					items: vec![order(OrderStatus::Pending)],
					meta: None,
				})
			});
		let (handler, _, _) = handler(api);

		let page = handler
			.list_orders(OrderRoleFilter::Buying, None, None)
			.await
			.unwrap();
		assert_eq!(page.items.len(), 1);
	}

	#[test]
	fn test_deliver_maps_to_redeliver_after_revision() {
		let deliver = OrderAction::Deliver {
			note: "v2".into(),
			files: vec![],
		};
		assert_eq!(deliver.kind(OrderStatus::InProgress), ActionKind::Deliver);
		assert_eq!(deliver.kind(OrderStatus::Revision), ActionKind::Redeliver);
	}
}
