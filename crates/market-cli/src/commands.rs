//! Subcommands and their execution.

use crate::render::{self, Output};
use clap::{Args, Subcommand, ValueEnum};
use market_client::ClientError;
use market_core::{
	AuthError, Loadable, MarketEvent, Marketplace, OrderAction, OrderActionError, OrderPanel,
};
use market_types::{
	GigQuery, LoginRequest, NewMessage, OrderRoleFilter, OrderStatus, PackageType,
	RegisterRequest, UserRole,
};
use serde_json::json;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug, Error)]
pub enum CommandError {
	#[error("{}", .0.user_message())]
	Client(#[from] ClientError),
	#[error("{}", .0.user_message())]
	Auth(#[from] AuthError),
	#[error("{}", .0.user_message())]
	Order(#[from] OrderActionError),
	/// Loading a page failed; holds the message already shown to users.
	#[error("{0}")]
	Load(String),
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Log in and remember the session
	Login {
		#[arg(long)]
		email: String,
		#[arg(long, env = "GIGMARKET_PASSWORD", hide_env_values = true)]
		password: String,
	},
	/// Create an account and log in
	Register(RegisterArgs),
	/// Log out and forget the session
	Logout,
	/// Show the logged-in user
	Me,
	/// Show a profile (yours when no username is given)
	Profile { username: Option<String> },
	/// Place, inspect and progress orders
	#[command(subcommand)]
	Orders(OrdersCommand),
	/// Browse gigs
	#[command(subcommand)]
	Gigs(GigsCommand),
	/// Show the social feed
	Feed {
		/// Number of pages to load
		#[arg(long, default_value_t = 1)]
		pages: u32,
	},
	/// List notifications, or keep watching the unread count
	Notifications {
		#[arg(long)]
		watch: bool,
	},
	/// Conversations and direct messages
	#[command(subcommand)]
	Messages(MessagesCommand),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
	#[arg(long)]
	name: String,
	#[arg(long)]
	username: String,
	#[arg(long)]
	email: String,
	#[arg(long, env = "GIGMARKET_PASSWORD", hide_env_values = true)]
	password: String,
	#[arg(long, value_enum, default_value_t = RoleArg::Client)]
	role: RoleArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RoleArg {
	Freelancer,
	Client,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SideArg {
	Buying,
	Selling,
}

impl From<SideArg> for OrderRoleFilter {
	fn from(side: SideArg) -> Self {
		match side {
			SideArg::Buying => OrderRoleFilter::Buying,
			SideArg::Selling => OrderRoleFilter::Selling,
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum OrdersCommand {
	/// List orders you placed or have to fulfil
	List {
		#[arg(long, value_enum, default_value_t = SideArg::Buying)]
		side: SideArg,
		/// Only orders in this status (e.g. pending, in_progress)
		#[arg(long)]
		status: Option<OrderStatus>,
		#[arg(long)]
		page: Option<u32>,
	},
	/// Show an order and the actions available to you
	Show { id: u64 },
	/// Order a package of a gig
	Create {
		gig_id: u64,
		#[arg(long, default_value = "basic")]
		package: PackageType,
		#[arg(long)]
		requirements: String,
	},
	/// Start working on a pending order (seller)
	Start { id: u64 },
	/// Deliver or re-deliver an order (seller)
	Deliver {
		id: u64,
		#[arg(long)]
		note: String,
		/// URL of an uploaded delivery file; repeatable
		#[arg(long = "file")]
		files: Vec<String>,
	},
	/// Accept a delivery (buyer)
	Accept { id: u64 },
	/// Ask for changes to a delivery (buyer)
	Revise {
		id: u64,
		#[arg(long)]
		reason: String,
	},
}

#[derive(Subcommand, Debug)]
pub enum GigsCommand {
	List {
		#[arg(long)]
		search: Option<String>,
		#[arg(long)]
		category: Option<String>,
		#[arg(long)]
		page: Option<u32>,
	},
	Show { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum MessagesCommand {
	/// List conversations
	List,
	/// Show the thread with a user
	Thread {
		user_id: u64,
		/// Keep polling for new messages until interrupted
		#[arg(long)]
		watch: bool,
	},
	/// Send a direct message
	Send { user_id: u64, content: String },
}

pub async fn run(market: &Marketplace, command: Command, out: &Output) -> Result<(), CommandError> {
	match command {
		Command::Login { email, password } => {
			let user = market
				.auth()
				.login(&LoginRequest { email, password })
				.await?;
			out.emit(&user, |u| format!("Logged in as {}", render::user_line(u)));
		},
		Command::Register(args) => {
			let request = RegisterRequest {
				name: args.name,
				username: args.username,
				email: args.email,
				password_confirmation: args.password.clone(),
				password: args.password,
				role: match args.role {
					RoleArg::Freelancer => UserRole::Freelancer,
					RoleArg::Client => UserRole::Client,
				},
			};
			let user = market.auth().register(&request).await?;
			out.emit(&user, |u| format!("Registered {}", render::user_line(u)));
		},
		Command::Logout => {
			market.auth().logout().await?;
			out.note("Logged out.");
		},
		Command::Me => {
			let user = market.auth().me().await?;
			out.emit(&user, render::user_line);
		},
		Command::Orders(command) => run_orders(market, command, out).await?,
		Command::Gigs(GigsCommand::List {
			search,
			category,
			page,
		}) => {
			let gigs = market
				.gigs()
				.list_gigs(&GigQuery {
					search,
					category,
					seller_id: None,
					page,
				})
				.await?;
			out.emit(&gigs, |page| {
				page.items
					.iter()
					.map(render::gig_row)
					.collect::<Vec<_>>()
					.join("\n")
			});
		},
		Command::Gigs(GigsCommand::Show { id }) => {
			let mut page = market.gig_page(id);
			let gig = loaded(page.load().await)?;
			out.emit(gig, render::gig_detail);
		},
		Command::Profile { username } => {
			let mut page = market.profile_page(username);
			let profile = loaded(page.load().await)?;
			out.emit(profile, render::profile_detail);
		},
		Command::Feed { pages } => {
			let mut feed = market.feed();
			for _ in 0..pages.max(1) {
				if !feed.has_more() {
					break;
				}
				feed.load_next().await?;
			}
			out.emit(feed.items(), |posts| {
				posts.iter().map(render::post_row).collect::<Vec<_>>().join("\n")
			});
			if feed.has_more() {
				out.note("(more available, use --pages to load further)");
			}
		},
		Command::Notifications { watch: false } => {
			let page = market.notifications().notifications(1).await?;
			out.emit(&page, |page| {
				page.items
					.iter()
					.map(render::notification_row)
					.collect::<Vec<_>>()
					.join("\n")
			});
		},
		Command::Notifications { watch: true } => watch_notifications(market, out).await,
		Command::Messages(command) => run_messages(market, command, out).await?,
	}
	Ok(())
}

async fn run_orders(
	market: &Marketplace,
	command: OrdersCommand,
	out: &Output,
) -> Result<(), CommandError> {
	let (id, action) = match command {
		OrdersCommand::List { side, status, page } => {
			let orders = market.orders().list_orders(side.into(), status, page).await?;
			out.emit(&orders, |page| {
				page.items
					.iter()
					.map(render::order_row)
					.collect::<Vec<_>>()
					.join("\n")
			});
			return Ok(());
		},
		OrdersCommand::Show { id } => {
			let panel = loaded_panel(market, id).await?;
			show_panel(&panel, out);
			return Ok(());
		},
		OrdersCommand::Create {
			gig_id,
			package,
			requirements,
		} => {
			let order = market
				.orders()
				.create_order(gig_id, package, &requirements)
				.await?;
			out.emit(&order, render::order_row);
			return Ok(());
		},
		OrdersCommand::Start { id } => (id, OrderAction::Start),
		OrdersCommand::Deliver { id, note, files } => (id, OrderAction::Deliver { note, files }),
		OrdersCommand::Accept { id } => (id, OrderAction::Accept),
		OrdersCommand::Revise { id, reason } => (id, OrderAction::RequestRevision { reason }),
	};

	let mut panel = loaded_panel(market, id).await?;
	panel.perform(action).await?;
	if let Some(toast) = market.toasts().active().last() {
		out.note(&toast.message);
	}
	show_panel(&panel, out);
	Ok(())
}

async fn loaded_panel(market: &Marketplace, id: u64) -> Result<OrderPanel, CommandError> {
	let mut panel = market.order_panel(id).await;
	if let Some(message) = panel.load().await.error() {
		return Err(CommandError::Load(message.to_string()));
	}
	Ok(panel)
}

fn loaded<T>(state: &Loadable<T>) -> Result<&T, CommandError> {
	match state {
		Loadable::Loaded(value) => Ok(value),
		Loadable::Failed(message) => Err(CommandError::Load(message.clone())),
		Loadable::Idle | Loadable::Loading => Err(CommandError::Load("Nothing loaded.".to_string())),
	}
}

fn show_panel(panel: &OrderPanel, out: &Output) {
	let Some(order) = panel.order() else {
		return;
	};
	let actions = panel.actions();
	if out.is_json() {
		let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
		out.emit(&json!({ "order": order, "actions": labels }), |_| String::new());
	} else {
		println!("{}", render::order_detail(order, &actions));
	}
}

async fn run_messages(
	market: &Marketplace,
	command: MessagesCommand,
	out: &Output,
) -> Result<(), CommandError> {
	let me = market.current_user().await.map(|user| user.id);
	match command {
		MessagesCommand::List => {
			let conversations = market.messages().conversations().await?;
			out.emit(&conversations, |list| {
				list.iter()
					.map(render::conversation_row)
					.collect::<Vec<_>>()
					.join("\n")
			});
		},
		MessagesCommand::Thread {
			user_id,
			watch: false,
		} => {
			let thread = market.messages().thread(user_id).await?;
			out.emit(&thread, |messages| {
				messages
					.iter()
					.map(|m| render::message_line(m, me))
					.collect::<Vec<_>>()
					.join("\n")
			});
		},
		MessagesCommand::Thread {
			user_id,
			watch: true,
		} => watch_thread(market, user_id, me, out).await,
		MessagesCommand::Send { user_id, content } => {
			let message = market
				.messages()
				.send_message(&NewMessage {
					receiver_id: user_id,
					content,
				})
				.await?;
			out.emit(&message, |m| render::message_line(m, me));
		},
	}
	Ok(())
}

/// Prints the unread count whenever the poller reports a change, until
/// interrupted.
async fn watch_notifications(market: &Marketplace, out: &Output) {
	let mut events = market.event_bus().subscribe();
	let _poller = market.watch_notifications();
	let mut last = None;

	loop {
		tokio::select! {
			event = events.recv() => match event {
				Ok(MarketEvent::UnreadCount(count)) if last != Some(count) => {
					last = Some(count);
					out.emit(&json!({ "unread": count }), |_| format!("{} unread notifications", count));
				},
				Ok(_) => {},
				Err(RecvError::Lagged(skipped)) => {
					tracing::debug!(skipped, "Event receiver lagged");
				},
				Err(RecvError::Closed) => break,
			},
			_ = tokio::signal::ctrl_c() => break,
		}
	}
}

/// Prints messages as they appear in the thread, until interrupted.
async fn watch_thread(market: &Marketplace, user_id: u64, me: Option<u64>, out: &Output) {
	let mut events = market.event_bus().subscribe();
	let _poller = market.watch_thread(user_id);
	let mut last_seen = None;

	loop {
		tokio::select! {
			event = events.recv() => match event {
				Ok(MarketEvent::ThreadUpdated { user_id: thread, messages }) if thread == user_id => {
					for message in messages.iter().filter(|m| last_seen.is_none_or(|seen| m.id > seen)) {
						out.emit(message, |m| render::message_line(m, me));
					}
					if let Some(newest) = messages.iter().map(|m| m.id).max() {
						last_seen = Some(newest);
					}
				},
				Ok(_) => {},
				Err(RecvError::Lagged(skipped)) => {
					tracing::debug!(skipped, "Event receiver lagged");
				},
				Err(RecvError::Closed) => break,
			},
			_ = tokio::signal::ctrl_c() => break,
		}
	}
}
