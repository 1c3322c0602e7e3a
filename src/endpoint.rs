//! Immutable endpoint descriptors consumed by the transfer layer.
//!
//! An [`Endpoint`] captures everything one logical API call needs: path, method, headers,
//! body encoding, authentication requirement, and how the response should be decoded.
//! Descriptors are cheap values built right before sending; authenticated calls build them
//! through a factory so the bearer header always reflects the token current at send time.

/// Catalog of concrete API endpoints and their response models.
pub mod api;

// std
use std::marker::PhantomData;
// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// HTTP methods used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// HTTP GET.
	Get,
	/// HTTP POST.
	Post,
	/// HTTP PATCH.
	Patch,
	/// HTTP DELETE.
	Delete,
}
impl HttpMethod {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Patch => "PATCH",
			HttpMethod::Delete => "DELETE",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Authentication a descriptor requires at send time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthRequirement {
	/// No credentials travel with the request.
	#[default]
	None,
	/// The access token rides in the `Authorization: Bearer` header.
	AccessToken,
	/// The refresh token rides in the request body (reissue calls only).
	RefreshToken,
}

/// How the response body should be interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodeStrategy {
	/// Decode the body as JSON into the descriptor's response type.
	#[default]
	Json,
	/// Ignore the body; the call only cares about the status code.
	Discard,
}

/// Request body encodings supported by the API.
#[derive(Clone, Debug, Default)]
pub enum BodyEncoding {
	/// No body.
	#[default]
	None,
	/// JSON object, serialized once at descriptor build time.
	Json(serde_json::Value),
	/// `multipart/form-data` payload with a generated boundary.
	Multipart(MultipartBody),
}

/// Domain resource kinds used to make 404 responses actionable for callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
	/// A meet group.
	Meet,
	/// A scheduled plan.
	Plan,
	/// A post-event review.
	Review,
	/// A comment on a post.
	Comment,
	/// The signed-in user's profile.
	User,
}

/// Reference to the domain resource a descriptor addresses.
///
/// Returned inside [`crate::error::RequestError::NoResponse`] so a caller can, for
/// example, remove a server-deleted plan from its list instead of alerting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceRef {
	/// Kind of resource being addressed.
	pub kind: ResourceKind,
	/// Identifier of the resource, when the call targets a single one.
	pub id: Option<i64>,
}
impl ResourceRef {
	/// Builds a reference to one identified resource.
	pub fn new(kind: ResourceKind, id: i64) -> Self {
		Self { kind, id: Some(id) }
	}
}

/// Failures raised while constructing a descriptor.
#[derive(Debug, ThisError)]
pub enum EndpointError {
	/// The request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	Body(#[from] serde_json::Error),
}

/// Immutable description of one API call with response type `T`.
#[derive(Clone, Debug)]
pub struct Endpoint<T> {
	/// Path relative to the API base URL.
	pub path: String,
	/// HTTP method.
	pub method: HttpMethod,
	/// Header pairs sent with the request (Content-Type is derived from the body).
	pub headers: Vec<(String, String)>,
	/// Query string pairs.
	pub query: Vec<(String, String)>,
	/// Request body encoding.
	pub body: BodyEncoding,
	/// Authentication this call requires.
	pub auth: AuthRequirement,
	/// Response decode strategy.
	pub decode: DecodeStrategy,
	/// Resource the call addresses, used to classify 404 responses.
	pub resource: Option<ResourceRef>,
	_marker: PhantomData<fn() -> T>,
}
impl<T> Endpoint<T> {
	fn new(path: impl Into<String>, method: HttpMethod) -> Self {
		Self {
			path: path.into(),
			method,
			headers: vec![("Accept".into(), "application/json".into())],
			query: Vec::new(),
			body: BodyEncoding::None,
			auth: AuthRequirement::default(),
			decode: DecodeStrategy::default(),
			resource: None,
			_marker: PhantomData,
		}
	}

	/// Starts a GET descriptor.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(path, HttpMethod::Get)
	}

	/// Starts a POST descriptor.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(path, HttpMethod::Post)
	}

	/// Starts a PATCH descriptor.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(path, HttpMethod::Patch)
	}

	/// Starts a DELETE descriptor.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(path, HttpMethod::Delete)
	}

	/// Replaces the default `Accept: application/json` with `Accept: */*`.
	pub fn accept_all(mut self) -> Self {
		for (name, value) in &mut self.headers {
			if name.eq_ignore_ascii_case("accept") {
				*value = "*/*".into();
			}
		}

		self
	}

	/// Appends a query string pair.
	pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Serializes `body` as the JSON request body.
	pub fn json_body(mut self, body: &impl Serialize) -> Result<Self, EndpointError> {
		self.body = BodyEncoding::Json(serde_json::to_value(body)?);

		Ok(self)
	}

	/// Attaches a multipart form body.
	pub fn multipart_body(mut self, body: MultipartBody) -> Self {
		self.body = BodyEncoding::Multipart(body);

		self
	}

	/// Attaches the access token as a bearer header and marks the auth requirement.
	pub fn bearer(mut self, token: &TokenSecret) -> Self {
		self.headers.push(("Authorization".into(), format!("Bearer {}", token.expose())));
		self.auth = AuthRequirement::AccessToken;

		self
	}

	/// Marks the descriptor as authenticated by the refresh token in its body.
	pub fn refresh_auth(mut self) -> Self {
		self.auth = AuthRequirement::RefreshToken;

		self
	}

	/// Declares the resource this call addresses.
	pub fn resource(mut self, kind: ResourceKind, id: i64) -> Self {
		self.resource = Some(ResourceRef::new(kind, id));

		self
	}

	/// Switches the decode strategy to [`DecodeStrategy::Discard`].
	pub fn discarding(mut self) -> Self {
		self.decode = DecodeStrategy::Discard;

		self
	}
}

/// `multipart/form-data` body with a random alphanumeric boundary.
#[derive(Clone, Debug)]
pub struct MultipartBody {
	boundary: String,
	parts: Vec<MultipartPart>,
}

#[derive(Clone, Debug)]
struct MultipartPart {
	name: String,
	filename: Option<String>,
	content_type: Option<String>,
	data: Vec<u8>,
}

impl MultipartBody {
	const BOUNDARY_LEN: usize = 24;

	/// Creates an empty body with a freshly generated boundary.
	pub fn new() -> Self {
		let boundary: String = rand::rng()
			.sample_iter(&Alphanumeric)
			.take(Self::BOUNDARY_LEN)
			.map(char::from)
			.collect();

		Self { boundary, parts: Vec::new() }
	}

	/// Returns the boundary token used between parts.
	pub fn boundary(&self) -> &str {
		&self.boundary
	}

	/// Appends a plain text field.
	pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.parts.push(MultipartPart {
			name: name.into(),
			filename: None,
			content_type: None,
			data: value.into().into_bytes(),
		});

		self
	}

	/// Appends a binary file field.
	pub fn file(
		mut self,
		name: impl Into<String>,
		filename: impl Into<String>,
		content_type: impl Into<String>,
		data: Vec<u8>,
	) -> Self {
		self.parts.push(MultipartPart {
			name: name.into(),
			filename: Some(filename.into()),
			content_type: Some(content_type.into()),
			data,
		});

		self
	}

	/// Encodes all parts into the final request body.
	pub fn encode(&self) -> Vec<u8> {
		let mut buf = Vec::new();

		for part in &self.parts {
			buf.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
			buf.extend_from_slice(
				format!("Content-Disposition: form-data; name=\"{}\"", part.name).as_bytes(),
			);

			if let Some(filename) = &part.filename {
				buf.extend_from_slice(format!("; filename=\"{filename}\"").as_bytes());
			}

			buf.extend_from_slice(b"\r\n");

			if let Some(content_type) = &part.content_type {
				buf.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
			}

			buf.extend_from_slice(b"\r\n");
			buf.extend_from_slice(&part.data);
			buf.extend_from_slice(b"\r\n");
		}

		buf.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());

		buf
	}
}
impl Default for MultipartBody {
	fn default() -> Self {
		Self::new()
	}
}
