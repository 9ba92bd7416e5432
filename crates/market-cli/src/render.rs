//! Text rendering of marketplace entities for the terminal.

use market_core::ActionKind;
use market_types::{
	format_delivery_time, format_price, preview, Conversation, Gig, Message, Notification, Order,
	Post, Profile, User,
};
use serde::Serialize;

/// Where results go: plain text or pretty JSON on stdout.
pub struct Output {
	json: bool,
}

impl Output {
	pub fn new(json: bool) -> Self {
		Self { json }
	}

	pub fn is_json(&self) -> bool {
		self.json
	}

	/// Prints `value` as JSON, or the text produced by `text` otherwise.
	pub fn emit<T, F>(&self, value: &T, text: F)
	where
		T: Serialize + ?Sized,
		F: FnOnce(&T) -> String,
	{
		if self.json {
			match serde_json::to_string_pretty(value) {
				Ok(json) => println!("{}", json),
				Err(e) => tracing::error!(error = %e, "Failed to serialize output"),
			}
		} else {
			println!("{}", text(value));
		}
	}

	/// Prints a status line. Suppressed in JSON mode so stdout stays parseable.
	pub fn note(&self, message: &str) {
		if !self.json {
			println!("{}", message);
		}
	}
}

pub fn user_line(user: &User) -> String {
	format!(
		"{} <{}> #{} ({})",
		user.display_name(),
		user.email,
		user.id,
		user.role
	)
}

pub fn order_row(order: &Order) -> String {
	let title = order
		.gig
		.as_ref()
		.map(|gig| preview(&gig.title, 40))
		.unwrap_or_else(|| "(gig removed)".to_string());
	format!(
		"#{:<6} {:<20} {:<9} {:>10}  {}",
		order.id,
		order.status.label(),
		order.package_type.as_str(),
		format_price(order.price),
		title
	)
}

/// Full order view followed by the actions offered to the viewer.
pub fn order_detail(order: &Order, actions: &[ActionKind]) -> String {
	let mut lines = vec![format!("Order #{}  [{}]", order.id, order.status.label())];
	if let Some(gig) = &order.gig {
		lines.push(format!("Gig:          {}", gig.title));
	}
	lines.push(format!(
		"Package:      {} · {} · {}",
		order.package_type,
		format_price(order.price),
		format_delivery_time(order.delivery_time)
	));
	let party = |name: Option<&str>, id: u64| match name {
		Some(name) => format!("{} (#{})", name, id),
		None => format!("#{}", id),
	};
	lines.push(format!(
		"Buyer:        {}",
		party(order.buyer.as_ref().map(|u| u.name.as_str()), order.buyer_id)
	));
	lines.push(format!(
		"Seller:       {}",
		party(order.seller.as_ref().map(|u| u.name.as_str()), order.seller_id)
	));
	if let Some(requirements) = &order.requirements {
		lines.push(format!("Requirements: {}", requirements));
	}
	if let Some(note) = &order.delivery_note {
		lines.push(format!("Delivery:     {}", note));
	}
	for file in &order.delivery_files {
		lines.push(format!("  - {}", file));
	}
	if let Some(reason) = &order.revision_reason {
		lines.push(format!("Revision:     {}", reason));
	}

	if actions.is_empty() {
		lines.push("No actions available.".to_string());
	} else {
		let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
		lines.push(format!("Actions:      {}", labels.join(", ")));
	}
	lines.join("\n")
}

pub fn profile_detail(profile: &Profile) -> String {
	let name = profile
		.user
		.as_ref()
		.map(|u| format!("{} (#{})", u.name, u.id))
		.unwrap_or_else(|| format!("#{}", profile.user_id));
	let mut lines = vec![name];
	if let Some(title) = &profile.title {
		lines.push(title.clone());
	}
	if let Some(location) = &profile.location {
		lines.push(format!("Location:  {}", location));
	}
	if !profile.skills.is_empty() {
		lines.push(format!("Skills:    {}", profile.skills.join(", ")));
	}
	lines.push(format!(
		"Followers: {}  Following: {}{}",
		profile.followers_count,
		profile.following_count,
		if profile.available { "  (available for work)" } else { "" }
	));
	if let Some(bio) = &profile.bio {
		lines.push(String::new());
		lines.push(bio.clone());
	}
	lines.join("\n")
}

pub fn gig_row(gig: &Gig) -> String {
	let price = gig
		.starting_price()
		.map(|p| format!("from {}", format_price(p)))
		.unwrap_or_else(|| "no packages".to_string());
	format!("#{:<6} {:<50} {}", gig.id, preview(&gig.title, 50), price)
}

pub fn gig_detail(gig: &Gig) -> String {
	let mut lines = vec![format!("{} (#{})", gig.title, gig.id)];
	if let Some(seller) = &gig.seller {
		lines.push(format!("by {}", seller.name));
	}
	if let Some(rating) = gig.rating {
		lines.push(format!("Rating: {:.1} ({} reviews)", rating, gig.reviews_count));
	}
	if !gig.description.is_empty() {
		lines.push(String::new());
		lines.push(gig.description.clone());
	}
	for package in &gig.packages {
		lines.push(format!(
			"  [{}] {}: {} · {} · {} revisions",
			package.package_type,
			package.title,
			format_price(package.price),
			format_delivery_time(package.delivery_time),
			package.revisions
		));
	}
	lines.join("\n")
}

pub fn post_row(post: &Post) -> String {
	let author = post
		.author
		.as_ref()
		.map(|a| a.name.clone())
		.unwrap_or_else(|| format!("user #{}", post.user_id));
	format!(
		"[{}] {}: {}  ({} likes, {} comments)",
		post.created_at.format("%Y-%m-%d %H:%M"),
		author,
		preview(&post.content, 80),
		post.likes_count,
		post.comments_count
	)
}

pub fn notification_row(notification: &Notification) -> String {
	let marker = if notification.is_read() { " " } else { "*" };
	let title = notification.title.as_deref().unwrap_or(&notification.kind);
	format!(
		"{} #{:<6} {}: {}",
		marker,
		notification.id,
		title,
		preview(&notification.message, 80)
	)
}

pub fn conversation_row(conversation: &Conversation) -> String {
	let unread = if conversation.unread_count > 0 {
		format!(" ({} unread)", conversation.unread_count)
	} else {
		String::new()
	};
	format!(
		"#{:<6} {}{}: {}",
		conversation.user.id,
		conversation.user.name,
		unread,
		conversation
			.last_message
			.as_deref()
			.map(|m| preview(m, 60))
			.unwrap_or_default()
	)
}

/// One thread line; messages from `me` are marked as such.
pub fn message_line(message: &Message, me: Option<u64>) -> String {
	let who = match me {
		Some(id) if message.is_from(id) => "me".to_string(),
		_ => format!("#{}", message.sender_id),
	};
	format!(
		"[{}] {}: {}",
		message.created_at.format("%H:%M"),
		who,
		message.content
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{TimeZone, Utc};
	use market_types::{GigSummary, OrderStatus, PackageType};
	use rust_decimal::Decimal;

	fn order(status: OrderStatus) -> Order {
		Order {
			id: 5,
			gig_id: Some(2),
			buyer_id: 10,
			seller_id: 20,
			package_type: PackageType::Premium,
			price: Decimal::new(4900, 2),
			delivery_time: 1,
			status,
			requirements: Some("Vector logo".into()),
			delivery_note: None,
			delivery_files: Vec::new(),
			revision_reason: None,
			created_at: Utc::now(),
			updated_at: Utc::now(),
			completed_at: None,
			gig: Some(GigSummary {
				id: 2,
				title: "Logo design".into(),
				image: None,
			}),
			buyer: None,
			seller: None,
		}
	}

	#[test]
	fn test_order_detail_lists_actions() {
		let text = order_detail(
			&order(OrderStatus::Delivered),
			&[ActionKind::Accept, ActionKind::RequestRevision],
		);
		assert!(text.starts_with("Order #5  [Delivered]"));
		assert!(text.contains("Gig:          Logo design"));
		assert!(text.contains("$49.00"));
		assert!(text.contains("1 day"));
		assert!(text.ends_with("Actions:      Accept Delivery, Request Revision"));
	}

	#[test]
	fn test_order_detail_without_actions() {
		let mut revised = order(OrderStatus::Revision);
		revised.revision_reason = Some("Bigger font".into());
		let text = order_detail(&revised, &[]);
		assert!(text.contains("Revision:     Bigger font"));
		assert!(text.ends_with("No actions available."));
	}

	#[test]
	fn test_profile_detail() {
		let profile = Profile {
			user_id: 3,
			user: None,
			title: Some("Illustrator".into()),
			bio: None,
			skills: vec!["logos".into(), "icons".into()],
			location: None,
			website: None,
			available: true,
			social_links: Vec::new(),
			followers_count: 12,
			following_count: 4,
			is_following: false,
		};
		assert_eq!(
			profile_detail(&profile),
			"#3\nIllustrator\nSkills:    logos, icons\nFollowers: 12  Following: 4  (available for work)"
		);
	}

	#[test]
	fn test_message_line_marks_own_messages() {
		let message = Message {
			id: 1,
			sender_id: 7,
			receiver_id: 8,
			content: "Draft attached".into(),
			read: true,
			created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
		};
		assert_eq!(message_line(&message, Some(7)), "[09:30] me: Draft attached");
		assert_eq!(message_line(&message, Some(8)), "[09:30] #7: Draft attached");
	}
}
