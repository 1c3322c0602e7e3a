//! Data transfer layer: prepares descriptors, decodes bodies, classifies failures.
//!
//! [`DataTransferService`] is a pure translation layer between descriptors and the
//! transport. It owns no retry logic and no shared state; its one policy decision is
//! delegated to the pluggable [`TransferErrorResolver`], which turns raw transport
//! failures into the [`DataTransferError`] taxonomy the gateway acts on.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::ApiConfig,
	endpoint::{AuthRequirement, BodyEncoding, DecodeStrategy, Endpoint},
	error::{DataTransferError, TransportError},
	transport::{HttpTransport, PreparedRequest, RawResponse},
};

/// Descriptor misuse caught before any traffic is sent.
///
/// These are caller bugs, not server failures; they surface as
/// [`DataTransferError::Unknown`] with this error as the source.
#[derive(Clone, Copy, Debug, ThisError)]
pub enum DescriptorError {
	/// A typed request was issued for a descriptor that discards its body.
	#[error("Descriptor discards its response body; use the discarding request surface.")]
	DiscardedBody,
	/// The descriptor requires an access token but carries no bearer header.
	#[error("Descriptor requires an access token but no bearer header is attached.")]
	MissingBearer,
}

/// Maps raw transport failures into the transfer-layer taxonomy.
pub trait TransferErrorResolver
where
	Self: Send + Sync,
{
	/// Classifies one transport failure.
	fn resolve(&self, error: TransportError) -> DataTransferError;
}

/// Default resolver implementing the backend's status contract.
///
/// 400 means the request was malformed, 401 means the access token expired, 404 means
/// the resource is gone; everything else is an unknown server failure. Failures without
/// a status are connectivity problems.
#[derive(Clone, Debug, Default)]
pub struct DefaultTransferErrorResolver;
impl TransferErrorResolver for DefaultTransferErrorResolver {
	fn resolve(&self, error: TransportError) -> DataTransferError {
		match error {
			TransportError::Status { code: 400, .. } => DataTransferError::BadRequest,
			TransportError::Status { code: 401, .. } => DataTransferError::ExpiredToken,
			TransportError::Status { code: 404, .. } => DataTransferError::NoResponse,
			TransportError::Status { code, .. } => DataTransferError::unknown_status(code),
			err => DataTransferError::NetworkFailure(err),
		}
	}
}

/// Executes descriptors against the transport and decodes their responses.
#[derive(Clone)]
pub struct DataTransferService {
	config: ApiConfig,
	transport: Arc<dyn HttpTransport>,
	resolver: Arc<dyn TransferErrorResolver>,
}
impl DataTransferService {
	/// Creates a transfer service over the provided transport and resolver.
	pub fn new(
		config: ApiConfig,
		transport: Arc<dyn HttpTransport>,
		resolver: Arc<dyn TransferErrorResolver>,
	) -> Self {
		Self { config, transport, resolver }
	}

	/// Returns the client configuration backing this service.
	pub fn config(&self) -> &ApiConfig {
		&self.config
	}

	/// Executes a descriptor and decodes the JSON response body into `T`.
	///
	/// An empty body where a value was expected resolves to
	/// [`DataTransferError::NoResponse`]. Descriptors marked
	/// [`DecodeStrategy::Discard`] are rejected here; they carry no decodable value and
	/// belong on [`DataTransferService::request_discarding`].
	pub async fn request<T>(&self, endpoint: &Endpoint<T>) -> Result<T, DataTransferError>
	where
		T: DeserializeOwned,
	{
		if endpoint.decode == DecodeStrategy::Discard {
			return Err(DataTransferError::unknown(DescriptorError::DiscardedBody));
		}

		let response = self.execute(endpoint).await?;

		if response.body.is_empty() {
			return Err(DataTransferError::NoResponse);
		}

		Self::decode(&response.body)
	}

	/// Executes a descriptor whose response body carries no information.
	pub async fn request_discarding(
		&self,
		endpoint: &Endpoint<()>,
	) -> Result<(), DataTransferError> {
		self.execute(endpoint).await.map(|_| ())
	}

	async fn execute<T>(&self, endpoint: &Endpoint<T>) -> Result<RawResponse, DataTransferError> {
		let prepared = self.prepare(endpoint)?;

		self.transport.execute(prepared).await.map_err(|err| self.resolver.resolve(err))
	}

	fn prepare<T>(&self, endpoint: &Endpoint<T>) -> Result<PreparedRequest, DataTransferError> {
		if endpoint.auth == AuthRequirement::AccessToken
			&& !endpoint.headers.iter().any(|(name, _)| name.eq_ignore_ascii_case("authorization"))
		{
			return Err(DataTransferError::unknown(DescriptorError::MissingBearer));
		}

		let mut url =
			self.config.endpoint_url(&endpoint.path).map_err(DataTransferError::unknown)?;

		if !endpoint.query.is_empty() {
			let mut pairs = url.query_pairs_mut();

			for (name, value) in &endpoint.query {
				pairs.append_pair(name, value);
			}
		}

		let mut headers = endpoint.headers.clone();
		let body = match &endpoint.body {
			BodyEncoding::None => None,
			BodyEncoding::Json(value) => {
				headers.push(("Content-Type".into(), "application/json".into()));

				Some(serde_json::to_vec(value).map_err(DataTransferError::unknown)?)
			},
			BodyEncoding::Multipart(multipart) => {
				headers.push((
					"Content-Type".into(),
					format!("multipart/form-data; boundary={}", multipart.boundary()),
				));

				Some(multipart.encode())
			},
		};

		Ok(PreparedRequest { method: endpoint.method, url, headers, body })
	}

	fn decode<T>(body: &[u8]) -> Result<T, DataTransferError>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			#[cfg(feature = "tracing")]
			tracing::debug!(path = %source.path(), "response body failed to decode");

			DataTransferError::Parsing { source }
		})
	}
}
impl Debug for DataTransferService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DataTransferService").field("config", &self.config).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::transport::TransportFuture;

	struct FixedTransport {
		response: fn() -> Result<RawResponse, TransportError>,
		seen: Mutex<Vec<PreparedRequest>>,
	}
	impl FixedTransport {
		fn new(response: fn() -> Result<RawResponse, TransportError>) -> Arc<Self> {
			Arc::new(Self { response, seen: Mutex::new(Vec::new()) })
		}
	}
	impl HttpTransport for FixedTransport {
		fn execute(&self, request: PreparedRequest) -> TransportFuture<'_, RawResponse> {
			self.seen.lock().push(request);

			let response = (self.response)();

			Box::pin(async move { response })
		}
	}

	fn service(transport: Arc<FixedTransport>) -> DataTransferService {
		let config = ApiConfig::new("https://api.example.com").expect("Config fixture is valid.");

		DataTransferService::new(config, transport, Arc::new(DefaultTransferErrorResolver))
	}

	#[test]
	fn resolver_implements_the_status_table() {
		let resolver = DefaultTransferErrorResolver;
		let status = |code| TransportError::Status { code, body: Vec::new() };

		assert!(matches!(resolver.resolve(status(400)), DataTransferError::BadRequest));
		assert!(matches!(resolver.resolve(status(401)), DataTransferError::ExpiredToken));
		assert!(matches!(resolver.resolve(status(404)), DataTransferError::NoResponse));
		assert!(matches!(
			resolver.resolve(status(500)),
			DataTransferError::Unknown { status: Some(500), .. },
		));
		assert!(matches!(
			resolver.resolve(TransportError::Io(std::io::Error::other("reset"))),
			DataTransferError::NetworkFailure(_),
		));
	}

	#[tokio::test]
	async fn typed_requests_reject_discard_descriptors() {
		let transport = FixedTransport::new(|| Ok(RawResponse { status: 200, body: b"[]".to_vec() }));
		let service = service(transport.clone());
		let endpoint = Endpoint::<Vec<String>>::get("meet/list").discarding();
		let err = service
			.request(&endpoint)
			.await
			.expect_err("Discard descriptors carry no decodable value.");

		assert!(matches!(err, DataTransferError::Unknown { status: None, source: Some(_) }));
		assert!(
			transport.seen.lock().is_empty(),
			"Descriptor misuse must be caught before any traffic is sent.",
		);
	}

	#[tokio::test]
	async fn bearer_requirement_is_enforced_before_sending() {
		let transport = FixedTransport::new(|| Ok(RawResponse { status: 200, body: b"[]".to_vec() }));
		let service = service(transport.clone());
		let mut endpoint = Endpoint::<Vec<String>>::get("meet/list");

		endpoint.auth = AuthRequirement::AccessToken;

		let err = service
			.request(&endpoint)
			.await
			.expect_err("A descriptor requiring an access token must carry its bearer header.");

		assert!(matches!(err, DataTransferError::Unknown { status: None, source: Some(_) }));
		assert!(transport.seen.lock().is_empty());
	}

	#[tokio::test]
	async fn empty_body_is_no_response_when_a_value_was_expected() {
		let transport = FixedTransport::new(|| Ok(RawResponse { status: 200, body: Vec::new() }));
		let service = service(transport);
		let endpoint = Endpoint::<Vec<String>>::get("meet/list");
		let err = service
			.request(&endpoint)
			.await
			.expect_err("Empty bodies must not decode into values.");

		assert!(matches!(err, DataTransferError::NoResponse));
	}

	#[tokio::test]
	async fn malformed_body_is_a_parsing_failure() {
		let transport =
			FixedTransport::new(|| Ok(RawResponse { status: 200, body: b"{broken".to_vec() }));
		let service = service(transport);
		let endpoint = Endpoint::<Vec<String>>::get("meet/list");
		let err = service
			.request(&endpoint)
			.await
			.expect_err("Malformed bodies must surface as parsing failures.");

		assert!(matches!(err, DataTransferError::Parsing { .. }));
	}

	#[tokio::test]
	async fn discarding_requests_ignore_the_body() {
		let transport =
			FixedTransport::new(|| Ok(RawResponse { status: 200, body: b"ignored".to_vec() }));
		let service = service(transport);
		let endpoint = Endpoint::<()>::post("plan/join/1").discarding();

		service
			.request_discarding(&endpoint)
			.await
			.expect("Status-only requests should succeed regardless of body content.");
	}

	#[tokio::test]
	async fn prepare_derives_content_type_from_the_body() {
		let transport = FixedTransport::new(|| Ok(RawResponse { status: 200, body: Vec::new() }));
		let service = service(transport.clone());
		let endpoint = Endpoint::<()>::post("comment/1")
			.json_body(&serde_json::json!({ "contents": "hello" }))
			.expect("JSON body fixture should serialize.")
			.discarding();

		service.request_discarding(&endpoint).await.expect("Request fixture should succeed.");

		let seen = transport.seen.lock();
		let prepared = seen.first().expect("Transport should have observed one request.");

		assert!(
			prepared
				.headers
				.iter()
				.any(|(name, value)| name == "Content-Type" && value == "application/json"),
			"JSON bodies should carry an application/json content type.",
		);
		assert_eq!(prepared.url.as_str(), "https://api.example.com/comment/1");
	}
}
