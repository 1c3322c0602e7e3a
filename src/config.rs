//! Client configuration: the validated API base URL.

// self
use crate::_prelude::*;

/// Validated configuration consumed by the transfer layer.
///
/// The base URL is normalized with a trailing slash so [`Url::join`] preserves any path
/// prefix the deployment mounts the API under (`https://host/api/` + `meet/list`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
	base_url: Url,
}
impl ApiConfig {
	/// Parses and validates the API base URL.
	pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
		let raw = base_url.as_ref();
		let mut url = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		if !matches!(url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { scheme: url.scheme().to_owned() });
		}
		if url.cannot_be_a_base() {
			return Err(ConfigError::NotABase { url: raw.to_owned() });
		}
		if !url.path().ends_with('/') {
			let path = format!("{}/", url.path());

			url.set_path(&path);
		}

		Ok(Self { base_url: url })
	}

	/// Returns the normalized base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Resolves a relative endpoint path against the base URL.
	pub fn endpoint_url(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidBaseUrl { source })
	}
}

/// Configuration validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The base URL could not be parsed.
	#[error("API base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The base URL uses a scheme other than http(s).
	#[error("API base URL scheme `{scheme}` is not supported.")]
	UnsupportedScheme {
		/// Rejected scheme.
		scheme: String,
	},
	/// The base URL cannot serve as a join base (e.g. `data:` style URLs).
	#[error("API base URL `{url}` cannot be used as a base.")]
	NotABase {
		/// Rejected URL string.
		url: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn base_url_gains_trailing_slash() {
		let config =
			ApiConfig::new("https://api.example.com/v1").expect("Base URL fixture should parse.");

		assert_eq!(config.base_url().as_str(), "https://api.example.com/v1/");

		let joined = config
			.endpoint_url("meet/list")
			.expect("Relative endpoint path should join onto the base.");

		assert_eq!(joined.as_str(), "https://api.example.com/v1/meet/list");
	}

	#[test]
	fn leading_slashes_do_not_escape_the_prefix() {
		let config =
			ApiConfig::new("https://api.example.com/v1/").expect("Base URL fixture should parse.");
		let joined = config
			.endpoint_url("/plan/view")
			.expect("Leading slash should be treated as relative.");

		assert_eq!(joined.as_str(), "https://api.example.com/v1/plan/view");
	}

	#[test]
	fn non_http_schemes_are_rejected() {
		assert!(matches!(
			ApiConfig::new("ftp://api.example.com"),
			Err(ConfigError::UnsupportedScheme { .. }),
		));
		assert!(matches!(ApiConfig::new("not a url"), Err(ConfigError::InvalidBaseUrl { .. })));
	}
}
