//! Transport primitives: one HTTP exchange per call, no interpretation beyond status.
//!
//! [`HttpTransport`] is the crate's only seam onto an HTTP stack. It performs exactly one
//! attempt and reports non-success statuses as [`TransportError::Status`]; every retry or
//! refresh decision belongs to the layers above.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, endpoint::HttpMethod, error::TransportError};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Fully resolved request handed to a transport: absolute URL, final headers, raw body.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Absolute request URL, query included.
	pub url: Url,
	/// Final header pairs, Content-Type included when a body exists.
	pub headers: Vec<(String, String)>,
	/// Encoded request body, if any.
	pub body: Option<Vec<u8>>,
}

/// Successful (2xx) HTTP response.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body bytes; may be empty.
	pub body: Vec<u8>,
}

/// Abstraction over HTTP stacks capable of executing one prepared request.
///
/// Implementations must be `Send + Sync` so the gateway and the refresh coordinator can
/// share one instance behind an `Arc`. The returned future owns whatever state it needs;
/// the transfer layer boxes its own futures on top of it.
pub trait HttpTransport
where
	Self: Send + Sync,
{
	/// Executes one request and returns the raw 2xx response.
	///
	/// Non-2xx statuses resolve to [`TransportError::Status`] with the body preserved,
	/// connectivity problems to [`TransportError::NotConnected`], and everything else
	/// below HTTP to [`TransportError::Network`] or [`TransportError::Io`].
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_, RawResponse>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: PreparedRequest) -> TransportFuture<'_, RawResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
				HttpMethod::Patch => reqwest::Method::PATCH,
				HttpMethod::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url);

			for (name, value) in &request.headers {
				builder = builder.header(name, value);
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			if !status.is_success() {
				return Err(TransportError::Status { code: status.as_u16(), body });
			}

			Ok(RawResponse { status: status.as_u16(), body })
		})
	}
}
