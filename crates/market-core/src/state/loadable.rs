use market_client::ClientError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Fetch state of one surface (a profile, an order, a gig page).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
	#[default]
	Idle,
	Loading,
	Loaded(T),
	/// User-facing message of the last failure.
	Failed(String),
}

impl<T> Loadable<T> {
	pub fn value(&self) -> Option<&T> {
		match self {
			Loadable::Loaded(value) => Some(value),
			_ => None,
		}
	}

	pub fn error(&self) -> Option<&str> {
		match self {
			Loadable::Failed(message) => Some(message),
			_ => None,
		}
	}

	pub fn is_loading(&self) -> bool {
		matches!(self, Loadable::Loading)
	}

	/// Runs `fetch` and stores its outcome.
	pub async fn load<F, Fut>(&mut self, fetch: F) -> &Loadable<T>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, ClientError>>,
	{
		*self = Loadable::Loading;
		*self = match fetch().await {
			Ok(value) => Loadable::Loaded(value),
			Err(e) => {
				tracing::debug!(error = %e, "Load failed");
				Loadable::Failed(e.user_message())
			},
		};
		self
	}
}

type BoxedFetch<T> = Arc<
	dyn Fn() -> Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send>> + Send + Sync,
>;

/// A [`Loadable`] that remembers how it is fetched, so a failed load can be
/// retried with the same request.
pub struct Resource<T> {
	state: Loadable<T>,
	fetch: BoxedFetch<T>,
}

impl<T: 'static> Resource<T> {
	pub fn new<F, Fut>(fetch: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
	{
		let fetch: BoxedFetch<T> = Arc::new(
			move || -> Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send>> {
				Box::pin(fetch())
			},
		);
		Self {
			state: Loadable::Idle,
			fetch,
		}
	}

	pub fn state(&self) -> &Loadable<T> {
		&self.state
	}

	pub async fn load(&mut self) -> &Loadable<T> {
		let fetch = self.fetch.clone();
		self.state.load(|| fetch()).await
	}

	/// "Try again": re-issues the same fetch.
	pub async fn retry(&mut self) -> &Loadable<T> {
		self.load().await
	}
}
