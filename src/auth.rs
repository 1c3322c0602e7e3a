//! Token material: the redacting secret wrapper and the access/refresh pair.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Borrow<str> for TokenSecret {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Access/refresh token pair issued by the backend.
///
/// The pair is owned by the credential store and only ever replaced as a unit; no code
/// path updates one half without the other. Wire names are camelCase to match the
/// backend's JSON envelope (`accessToken`/`refreshToken`), which is also the shape the
/// reissue endpoint returns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
	/// Short-lived bearer token attached to authenticated requests.
	pub access_token: TokenSecret,
	/// Long-lived token exchanged for a fresh pair at the reissue endpoint.
	pub refresh_token: TokenSecret,
}
impl TokenPair {
	/// Builds a pair from raw secret strings.
	pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
		Self { access_token: TokenSecret::new(access), refresh_token: TokenSecret::new(refresh) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn pair_uses_camel_case_wire_names() {
		let pair = TokenPair::new("access-1", "refresh-1");
		let payload = serde_json::to_string(&pair).expect("Token pair should serialize to JSON.");

		assert_eq!(payload, "{\"accessToken\":\"access-1\",\"refreshToken\":\"refresh-1\"}");

		let round_trip: TokenPair = serde_json::from_str(&payload)
			.expect("Serialized token pair should deserialize from JSON.");

		assert_eq!(round_trip, pair);
	}
}
