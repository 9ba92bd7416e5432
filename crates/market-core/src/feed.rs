//! Page-by-page loading of paginated lists.

use market_client::{ClientError, PostApi};
use market_types::{Page, PageMeta, Post};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type PageFetch<T> = Arc<
	dyn Fn(u32) -> Pin<Box<dyn Future<Output = Result<Page<T>, ClientError>> + Send>>
		+ Send
		+ Sync,
>;

/// Accumulates the pages of a list in server order.
///
/// Before the first page is loaded there is assumed to be more. After that
/// the last page's metadata decides; a response without metadata is the
/// whole list.
pub struct FeedPager<T> {
	fetch: PageFetch<T>,
	items: Vec<T>,
	meta: Option<PageMeta>,
	loaded_any: bool,
}

impl<T: Send + 'static> FeedPager<T> {
	pub fn new<F, Fut>(fetch: F) -> Self
	where
		F: Fn(u32) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Page<T>, ClientError>> + Send + 'static,
	{
		let fetch: PageFetch<T> = Arc::new(
			move |page| -> Pin<Box<dyn Future<Output = Result<Page<T>, ClientError>> + Send>> {
				Box::pin(fetch(page))
			},
		);
		Self {
			fetch,
			items: Vec::new(),
			meta: None,
			loaded_any: false,
		}
	}

	pub fn items(&self) -> &[T] {
		&self.items
	}

	pub fn meta(&self) -> Option<&PageMeta> {
		self.meta.as_ref()
	}

	pub fn has_more(&self) -> bool {
		!self.loaded_any || self.meta.is_some_and(|meta| meta.has_more())
	}

	fn next_page(&self) -> u32 {
		self.meta
			.and_then(|meta| meta.next_page())
			.unwrap_or(1)
	}

	/// Fetches and appends the next page, returning how many items it added.
	///
	/// Once exhausted no request is made and `Ok(0)` is returned. On error
	/// the items and metadata already held are kept.
	pub async fn load_next(&mut self) -> Result<usize, ClientError> {
		if !self.has_more() {
			return Ok(0);
		}

		let page_number = self.next_page();
		let page = (self.fetch)(page_number).await?;
		let added = page.items.len();
		tracing::debug!(page = page_number, added, "Loaded page");

		self.items.extend(page.items);
		self.meta = page.meta;
		self.loaded_any = true;
		Ok(added)
	}

	/// Drops everything loaded so the next call starts from page one.
	pub fn reset(&mut self) {
		self.items.clear();
		self.meta = None;
		self.loaded_any = false;
	}
}

impl FeedPager<Post> {
	/// The logged-in user's social feed.
	pub fn posts(api: Arc<dyn PostApi>) -> Self {
		Self::new(move |page| {
			let api = api.clone();
			async move { api.feed(page).await }
		})
	}
}
