//! Gig listing and seller-side gig management.

use market_client::{ClientError, GigApi};
use market_session::SessionProvider;
use market_types::{Gig, GigDraft, GigQuery, Page, User};
use std::sync::Arc;

/// Whether `user` may edit or delete `gig`. The server has the final say;
/// this only decides whether to offer the controls.
pub fn can_edit_gig(gig: &Gig, user: Option<&User>) -> bool {
	user.is_some_and(|user| user.id == gig.seller_id)
}

pub struct GigHandler {
	gigs: Arc<dyn GigApi>,
	session: Arc<dyn SessionProvider>,
}

impl GigHandler {
	pub fn new(gigs: Arc<dyn GigApi>, session: Arc<dyn SessionProvider>) -> Self {
		Self { gigs, session }
	}

	pub async fn list_gigs(&self, query: &GigQuery) -> Result<Page<Gig>, ClientError> {
		self.gigs.list_gigs(query).await
	}

	pub async fn get_gig(&self, id: u64) -> Result<Gig, ClientError> {
		self.gigs.get_gig(id).await
	}

	pub async fn create_gig(&self, draft: &GigDraft) -> Result<Gig, ClientError> {
		let gig = self.gigs.create_gig(draft).await?;
		tracing::info!(gig_id = gig.id, "Gig created");
		Ok(gig)
	}

	pub async fn update_gig(&self, id: u64, draft: &GigDraft) -> Result<Gig, ClientError> {
		self.ensure_owner(id).await?;
		self.gigs.update_gig(id, draft).await
	}

	pub async fn delete_gig(&self, id: u64) -> Result<(), ClientError> {
		self.ensure_owner(id).await?;
		self.gigs.delete_gig(id).await?;
		tracing::info!(gig_id = id, "Gig deleted");
		Ok(())
	}

	async fn ensure_owner(&self, id: u64) -> Result<(), ClientError> {
		let user = self
			.session
			.current_user()
			.await
			.ok_or(ClientError::NotLoggedIn)?;
		let gig = self.gigs.get_gig(id).await?;
		if !can_edit_gig(&gig, Some(&user)) {
			return Err(ClientError::Forbidden(
				"You can only edit your own gigs.".to_string(),
			));
		}
		Ok(())
	}
}
