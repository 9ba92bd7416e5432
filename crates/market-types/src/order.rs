//! Order types for the marketplace client.
//!
//! An order is a buyer's purchase of one gig package. Its status is owned by
//! the backend: the client renders whatever status the server last reported
//! and only ever requests transitions, it never assigns a status itself.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::validation::non_blank;
use crate::{GigSummary, PackageType, UserSummary};

/// A purchase of a gig package, tracked through its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: u64,
	/// Gig the package was bought from.
	#[serde(default)]
	pub gig_id: Option<u64>,
	/// User who placed the order.
	pub buyer_id: u64,
	/// User who fulfils the order.
	pub seller_id: u64,
	/// Purchased tier.
	pub package_type: PackageType,
	/// Agreed price. Zero for free packages.
	#[serde(default)]
	pub price: Decimal,
	/// Agreed delivery time in days.
	pub delivery_time: u32,
	/// Current status as last reported by the server.
	pub status: OrderStatus,
	/// Buyer-supplied instructions.
	#[serde(default)]
	pub requirements: Option<String>,
	/// Seller note attached to the latest delivery.
	#[serde(default)]
	pub delivery_note: Option<String>,
	/// Files attached to the latest delivery.
	#[serde(default, deserialize_with = "null_as_empty")]
	pub delivery_files: Vec<String>,
	/// Reason given with the latest revision request.
	#[serde(default)]
	pub revision_reason: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[serde(default)]
	pub completed_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub gig: Option<GigSummary>,
	#[serde(default)]
	pub buyer: Option<UserSummary>,
	#[serde(default)]
	pub seller: Option<UserSummary>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: serde::Deserializer<'de>,
{
	Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Status of an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Placed by the buyer, not yet started by the seller.
	Pending,
	/// Seller is working on it.
	InProgress,
	/// Seller has delivered; awaiting buyer review.
	Delivered,
	/// Buyer asked for changes after a delivery.
	Revision,
	/// Buyer accepted the delivery.
	Completed,
	/// Cancelled by the backend.
	Cancelled,
}

impl OrderStatus {
	/// Wire representation.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::InProgress => "in_progress",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Revision => "revision",
			OrderStatus::Completed => "completed",
			OrderStatus::Cancelled => "cancelled",
		}
	}

	/// Human-readable label.
	pub fn label(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "Pending",
			OrderStatus::InProgress => "In Progress",
			OrderStatus::Delivered => "Delivered",
			OrderStatus::Revision => "Revision Requested",
			OrderStatus::Completed => "Completed",
			OrderStatus::Cancelled => "Cancelled",
		}
	}

	/// Whether no further actions exist for this status.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

impl FromStr for OrderStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(Self::Pending),
			"in_progress" | "in-progress" => Ok(Self::InProgress),
			"delivered" => Ok(Self::Delivered),
			"revision" => Ok(Self::Revision),
			"completed" => Ok(Self::Completed),
			"cancelled" | "canceled" => Ok(Self::Cancelled),
			other => Err(format!("unknown order status '{}'", other)),
		}
	}
}

/// Body for `POST /orders`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewOrder {
	pub gig_id: u64,
	pub package_type: PackageType,
	#[validate(custom(function = "non_blank", message = "Please describe your requirements."))]
	pub requirements: String,
}

/// Body for `PUT /orders/:id/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
	pub status: OrderStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivery_note: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub delivery_files: Vec<String>,
}

/// Body for `POST /orders/:id/revision`.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionRequest {
	pub reason: String,
}

/// Which side of the orders list to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderRoleFilter {
	/// Orders the viewer placed.
	Buying,
	/// Orders the viewer has to fulfil.
	Selling,
}

impl OrderRoleFilter {
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderRoleFilter::Buying => "buying",
			OrderRoleFilter::Selling => "selling",
		}
	}
}

/// Query for `GET /orders`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderQuery {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub role: Option<OrderRoleFilter>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<OrderStatus>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_order_decoding() {
		let order: Order = serde_json::from_value(json!({
			"id": 42,
			"gig_id": 7,
			"buyer_id": 1,
			"seller_id": 2,
			"package_type": "standard",
			"price": "0.00",
			"delivery_time": 3,
			"status": "in_progress",
			"requirements": null,
			"delivery_files": null,
			"created_at": "2024-05-01T10:00:00.000000Z",
			"updated_at": "2024-05-02T10:00:00Z"
		}))
		.unwrap();

		assert_eq!(order.status, OrderStatus::InProgress);
		assert!(order.price.is_zero());
		assert!(order.delivery_files.is_empty());
		assert!(order.completed_at.is_none());
		assert_eq!(order.requirements, None);
	}

	#[test]
	fn test_status_wire_names() {
		for status in [
			OrderStatus::Pending,
			OrderStatus::InProgress,
			OrderStatus::Delivered,
			OrderStatus::Revision,
			OrderStatus::Completed,
			OrderStatus::Cancelled,
		] {
			assert_eq!(serde_json::to_value(status).unwrap(), json!(status.as_str()));
			assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
		}
		assert!(OrderStatus::Completed.is_terminal());
		assert!(OrderStatus::Cancelled.is_terminal());
		assert!(!OrderStatus::Revision.is_terminal());
	}

	#[test]
	fn test_status_update_omits_empty_delivery() {
		let start = StatusUpdate {
			status: OrderStatus::InProgress,
			delivery_note: None,
			delivery_files: vec![],
		};
		assert_eq!(serde_json::to_value(&start).unwrap(), json!({ "status": "in_progress" }));
	}

	#[test]
	fn test_new_order_requires_requirements() {
		let order = NewOrder {
			gig_id: 1,
			package_type: PackageType::Basic,
			requirements: " \n".into(),
		};
		assert!(order.validate().is_err());
	}
}
