//! HTTP transport shared by every resource API.
//!
//! Every call goes through [`HttpClient::send`]: the path is joined under the
//! configured base URL, the session credential (if any) is attached as a
//! bearer token, and the response body is decoded as an [`Envelope`]. A
//! non-2xx status or `success: false` becomes a [`ClientError`] carrying
//! the most useful message the server gave, 401 included.

use crate::ClientError;
use market_config::ClientConfig;
use market_session::SessionProvider;
use market_types::{Envelope, Page, PageMeta};
use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

/// REST client for the marketplace backend.
///
/// Cheap to clone; clones share the connection pool and the session.
#[derive(Clone)]
pub struct HttpClient {
	client: reqwest::Client,
	base_url: String,
	session: Arc<dyn SessionProvider>,
}

impl HttpClient {
	pub fn new(config: &ClientConfig, session: Arc<dyn SessionProvider>) -> Result<Self, ClientError> {
		let mut headers = header::HeaderMap::new();
		headers.insert(
			header::ACCEPT,
			header::HeaderValue::from_static("application/json"),
		);

		let client = reqwest::Client::builder()
			.user_agent(config.user_agent.clone())
			.timeout(config.timeout())
			.default_headers(headers)
			.build()
			.map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: config.base_url.trim_end_matches('/').to_string(),
			session,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn session(&self) -> &Arc<dyn SessionProvider> {
		&self.session
	}

	fn url(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path.trim_start_matches('/'))
	}

	/// Sends a request and decodes the envelope.
	///
	/// `build` adds the body or query to the prepared request.
	pub(crate) async fn send<T, F>(
		&self,
		method: Method,
		path: &str,
		build: F,
	) -> Result<Envelope<T>, ClientError>
	where
		T: DeserializeOwned,
		F: FnOnce(RequestBuilder) -> RequestBuilder,
	{
		let mut request = self.client.request(method.clone(), self.url(path));
		if let Some(token) = self.session.credential().await {
			request = request.bearer_auth(token.expose_secret());
		}
		let request = build(request);

		tracing::debug!(method = %method, path, "Sending request");
		let response = request.send().await.map_err(|e| {
			if e.is_timeout() {
				ClientError::Network("Request timed out".to_string())
			} else {
				ClientError::Network(e.to_string())
			}
		})?;

		let status = response.status();
		let body = response
			.bytes()
			.await
			.map_err(|e| ClientError::Network(e.to_string()))?;
		tracing::debug!(method = %method, path, status = status.as_u16(), "Received response");

		decode_envelope(status, &body)
	}

	pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
		require_data(self.send(Method::GET, path, |r| r).await?)
	}

	/// Fetches a list endpoint, accepting either a bare array with envelope
	/// `meta` or a paginator object in `data`.
	pub(crate) async fn get_page<T, Q>(&self, path: &str, query: &Q) -> Result<Page<T>, ClientError>
	where
		T: DeserializeOwned,
		Q: Serialize + ?Sized,
	{
		let envelope: Envelope<PageData<T>> =
			self.send(Method::GET, path, |r| r.query(query)).await?;
		let meta = envelope.meta;
		Ok(match envelope.data {
			Some(PageData::Items(items)) => Page { items, meta },
			Some(PageData::Paginated {
				data,
				current_page,
				last_page,
				per_page,
				total,
			}) => Page {
				items: data,
				meta: meta.or(Some(PageMeta {
					current_page,
					last_page,
					per_page,
					total,
				})),
			},
			None => Page {
				items: Vec::new(),
				meta,
			},
		})
	}

	pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
	where
		T: DeserializeOwned,
		B: Serialize + ?Sized,
	{
		require_data(self.send(Method::POST, path, |r| r.json(body)).await?)
	}

	/// POST without a body, for toggles and acknowledgements that return data.
	pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
		require_data(self.send(Method::POST, path, |r| r).await?)
	}

	pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
	where
		T: DeserializeOwned,
		B: Serialize + ?Sized,
	{
		require_data(self.send(Method::PUT, path, |r| r.json(body)).await?)
	}

	/// Sends a request whose response payload is not needed.
	pub(crate) async fn execute<F>(&self, method: Method, path: &str, build: F) -> Result<(), ClientError>
	where
		F: FnOnce(RequestBuilder) -> RequestBuilder,
	{
		self.send::<serde_json::Value, _>(method, path, build)
			.await
			.map(|_| ())
	}
}

/// List payload shapes the backend uses.
#[derive(Deserialize)]
#[serde(untagged)]
enum PageData<T> {
	Items(Vec<T>),
	Paginated {
		data: Vec<T>,
		current_page: u32,
		last_page: u32,
		#[serde(default)]
		per_page: Option<u32>,
		#[serde(default)]
		total: Option<u64>,
	},
}

fn canonical_text(status: StatusCode) -> String {
	status
		.canonical_reason()
		.map(str::to_string)
		.unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}

/// Turns a raw response into an envelope or the matching error.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
	status: StatusCode,
	body: &[u8],
) -> Result<Envelope<T>, ClientError> {
	if !status.is_success() {
		let server_message = serde_json::from_slice::<Envelope<serde_json::Value>>(body)
			.ok()
			.and_then(|envelope| envelope.error_message());
		if status == StatusCode::UNAUTHORIZED {
			tracing::debug!(status = 401, message = ?server_message, "Request unauthorized");
			return Err(ClientError::Unauthorized(server_message));
		}
		let message = server_message.unwrap_or_else(|| canonical_text(status));
		tracing::debug!(status = status.as_u16(), %message, "Request failed");
		return Err(match status {
			StatusCode::FORBIDDEN => ClientError::Forbidden(message),
			_ => ClientError::Api {
				status: status.as_u16(),
				message,
			},
		});
	}

	let envelope: Envelope<T> =
		serde_json::from_slice(body).map_err(|e| ClientError::Decode(e.to_string()))?;

	if !envelope.success {
		return Err(ClientError::Api {
			status: status.as_u16(),
			message: envelope
				.error_message()
				.unwrap_or_else(|| "The request could not be completed.".to_string()),
		});
	}

	Ok(envelope)
}

fn require_data<T>(envelope: Envelope<T>) -> Result<T, ClientError> {
	envelope
		.data
		.ok_or_else(|| ClientError::Decode("response has no data".to_string()))
}
