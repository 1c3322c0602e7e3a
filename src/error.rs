//! Layered error taxonomy shared by the transport, transfer, and gateway layers.
//!
//! Errors climb three levels: [`TransportError`] is produced by a single HTTP attempt,
//! [`DataTransferError`] is the transfer layer's classification of that attempt (this is
//! where a 401 becomes [`DataTransferError::ExpiredToken`]), and [`RequestError`] is what
//! gateway callers see after central handling. [`RequestError::Handled`] means an alert
//! was already emitted on the caller's behalf; surfacing a second message is a bug.

// self
use crate::{_prelude::*, endpoint::ResourceRef};

/// Crate-wide result type alias returning [`RequestError`] by default.
pub type Result<T, E = RequestError> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised by a single HTTP exchange. No retry logic interprets these; the
/// transfer layer's resolver does.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The device has no usable network path to the server.
	#[error("No network connection is available.")]
	NotConnected {
		/// Transport-specific connectivity failure.
		#[source]
		source: BoxError,
	},
	/// The server answered with a non-success status code.
	#[error("Server responded with HTTP {code}.")]
	Status {
		/// HTTP status code of the response.
		code: u16,
		/// Raw response body, kept for server-supplied error envelopes.
		body: Vec<u8>,
	},
	/// The transport failed below the HTTP layer (DNS, TLS, connection reset).
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific connectivity failure.
	pub fn not_connected(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::NotConnected { source: Box::new(src) }
	}

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_connect() || e.is_timeout() { Self::not_connected(e) } else { Self::network(e) }
	}
}

/// Transfer-layer classification of a failed request.
///
/// Produced by [`crate::transfer::DataTransferService`] from raw transport failures via the
/// configured [`crate::transfer::TransferErrorResolver`]; consumed by the gateway, which
/// decides between refresh-and-retry, central alerting, and raw passthrough.
#[derive(Debug, ThisError)]
pub enum DataTransferError {
	/// Response body could not be decoded into the expected type.
	#[error("Response body could not be decoded.")]
	Parsing {
		/// Structured decode failure with the path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The request never produced a usable HTTP response.
	#[error(transparent)]
	NetworkFailure(#[from] TransportError),
	/// The access token was rejected (HTTP 401); a reissue may recover the call.
	#[error("Access token has expired.")]
	ExpiredToken,
	/// The resource does not exist (HTTP 404), or an expected body was empty.
	#[error("Server returned no response for the requested resource.")]
	NoResponse,
	/// The server rejected the request as malformed (HTTP 400).
	#[error("Server rejected the request as malformed.")]
	BadRequest,
	/// Anything the resolver could not classify.
	#[error("Unexpected API failure{}.", status.map(|c| format!(" (HTTP {c})")).unwrap_or_default())]
	Unknown {
		/// HTTP status code, when the failure came from a response.
		status: Option<u16>,
		/// Underlying cause, when one exists.
		#[source]
		source: Option<BoxError>,
	},
}
impl DataTransferError {
	/// Builds an [`DataTransferError::Unknown`] from an unclassified status code.
	pub fn unknown_status(code: u16) -> Self {
		Self::Unknown { status: Some(code), source: None }
	}

	/// Wraps an unclassified failure raised before or after the HTTP exchange.
	pub fn unknown(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Unknown { status: None, source: Some(Box::new(src)) }
	}
}

/// Gateway-level error returned to callers after central classification.
///
/// Only [`RequestError::NoResponse`] carries actionable context; the other variants exist
/// so callers know whether messaging already happened.
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// The failure was already surfaced to the user; do not show another message.
	#[error("Request failed and was already reported to the user.")]
	Handled,
	/// The failure could not be classified and was not alerted.
	#[error("Request failed for an unknown reason.")]
	Unknown,
	/// The server no longer has the requested resource (HTTP 404).
	///
	/// Deliberately not alerted centrally: the correct reaction is contextual, e.g.
	/// silently dropping a deleted plan from a list instead of interrupting the user.
	#[error("Requested resource no longer exists.")]
	NoResponse {
		/// Resource the descriptor was addressing, when declared.
		resource: Option<ResourceRef>,
	},
}
