//! Gig listings and pricing packages.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::validation::non_blank;
use crate::UserSummary;

/// Pricing tier of a gig package.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
	Basic,
	Standard,
	Premium,
}

impl PackageType {
	pub fn as_str(&self) -> &'static str {
		match self {
			PackageType::Basic => "basic",
			PackageType::Standard => "standard",
			PackageType::Premium => "premium",
		}
	}

	/// All tiers in ascending order.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::Basic, Self::Standard, Self::Premium].into_iter()
	}
}

impl fmt::Display for PackageType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for PackageType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"basic" => Ok(Self::Basic),
			"standard" => Ok(Self::Standard),
			"premium" => Ok(Self::Premium),
			other => Err(format!("unknown package type '{}'", other)),
		}
	}
}

/// One pricing tier of a gig.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct GigPackage {
	pub package_type: PackageType,
	#[validate(custom(function = "non_blank", message = "Package title is required."))]
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub price: Decimal,
	/// Delivery time in days.
	#[validate(range(min = 1, max = 365, message = "Delivery time must be between 1 and 365 days."))]
	pub delivery_time: u32,
	#[serde(default)]
	pub revisions: u32,
}

/// A service listed by a seller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Gig {
	pub id: u64,
	#[serde(alias = "user_id")]
	pub seller_id: u64,
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub category: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub images: Vec<String>,
	#[serde(default)]
	pub packages: Vec<GigPackage>,
	#[serde(default)]
	pub rating: Option<f32>,
	#[serde(default)]
	pub reviews_count: u64,
	#[serde(default)]
	pub is_favorited: bool,
	#[serde(default)]
	pub seller: Option<UserSummary>,
	#[serde(default)]
	pub created_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub updated_at: Option<DateTime<Utc>>,
}

impl Gig {
	/// Returns the package of the given tier, if the seller offers it.
	pub fn package(&self, package_type: PackageType) -> Option<&GigPackage> {
		self.packages
			.iter()
			.find(|p| p.package_type == package_type)
	}

	/// Lowest package price, used as the "starting at" figure.
	pub fn starting_price(&self) -> Option<Decimal> {
		self.packages.iter().map(|p| p.price).min()
	}
}

/// Compact gig reference embedded in orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GigSummary {
	pub id: u64,
	pub title: String,
	#[serde(default)]
	pub image: Option<String>,
}

/// Body for creating or updating a gig.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GigDraft {
	#[validate(
		custom(function = "non_blank", message = "Title is required."),
		length(max = 120, message = "Title must be at most 120 characters.")
	)]
	pub title: String,
	#[validate(custom(function = "non_blank", message = "Description is required."))]
	pub description: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub images: Vec<String>,
	#[validate(
		length(min = 1, max = 3, message = "A gig needs between one and three packages."),
		nested
	)]
	pub packages: Vec<GigPackage>,
}

/// Filters for `GET /gigs`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GigQuery {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub search: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub seller_id: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn dec(value: &str) -> Decimal {
		value.parse().unwrap()
	}

	fn package(package_type: PackageType, price: &str) -> GigPackage {
		GigPackage {
			package_type,
			title: package_type.to_string(),
			description: None,
			price: price.parse().unwrap(),
			delivery_time: 3,
			revisions: 1,
		}
	}

	#[test]
	fn test_gig_decodes_string_and_numeric_prices() {
		let gig: Gig = serde_json::from_value(json!({
			"id": 10,
			"user_id": 2,
			"title": "Logo design",
			"packages": [
				{ "package_type": "basic", "title": "Basic", "price": "15.50", "delivery_time": 2 },
				{ "package_type": "premium", "title": "Premium", "price": 80, "delivery_time": 5 }
			]
		}))
		.unwrap();

		assert_eq!(gig.seller_id, 2);
		assert_eq!(gig.package(PackageType::Basic).unwrap().price, dec("15.50"));
		assert!(gig.package(PackageType::Standard).is_none());
		assert_eq!(gig.starting_price(), Some(dec("15.50")));
	}

	#[test]
	fn test_gig_draft_requires_packages() {
		let mut draft = GigDraft {
			title: "Landing page".into(),
			description: "A responsive landing page".into(),
			category: None,
			tags: vec![],
			images: vec![],
			packages: vec![],
		};
		assert!(draft.validate().is_err());

		draft.packages.push(package(PackageType::Basic, "0"));
		assert!(draft.validate().is_ok());

		draft.packages[0].delivery_time = 0;
		assert!(draft.validate().is_err());
	}

	#[test]
	fn test_package_type_parsing() {
		assert_eq!("Premium".parse::<PackageType>().unwrap(), PackageType::Premium);
		assert!("gold".parse::<PackageType>().is_err());
		assert_eq!(PackageType::all().count(), 3);
	}
}
