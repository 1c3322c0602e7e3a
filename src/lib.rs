//! Async client for the Gather social planning API—an authenticated request gateway with
//! single-flight token reissue, bounded refresh-retry, and de-duplicated user-facing alerts.
//!
//! The crate is organized bottom-up: [`transport`] performs one HTTP exchange, [`transfer`]
//! decodes bodies and maps transport failures into [`error::DataTransferError`], [`refresh`]
//! coalesces concurrent token reissues into a single shared operation, and [`gateway`] wires
//! everything together behind [`gateway::Gateway::authenticated_request`]. Failures that need
//! user attention flow into [`alert::AlertService`], which guarantees at most one visible alert
//! and broadcasts a session-expired event when authentication is beyond recovery.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod alert;
pub mod auth;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod obs;
pub mod refresh;
pub mod store;
pub mod transfer;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use tokio::sync::mpsc::UnboundedReceiver;
	// self
	use crate::{
		alert::{AlertService, UserAlert},
		auth::TokenPair,
		config::ApiConfig,
		gateway::Gateway,
		store::{CredentialStore, MemoryCredentialStore},
		transfer::DefaultTransferErrorResolver,
		transport::ReqwestTransport,
	};

	/// Constructs a [`Gateway`] against a mock server base URL, backed by an in-memory
	/// credential store seeded with the provided token pair.
	///
	/// Returns the gateway, the store backend (for post-hoc inspection), and the alert
	/// stream the UI would normally consume.
	pub fn build_reqwest_test_gateway(
		base_url: &str,
		seed: Option<TokenPair>,
	) -> (Gateway, Arc<MemoryCredentialStore>, UnboundedReceiver<UserAlert>) {
		let config = ApiConfig::new(base_url).expect("Test base URL should be valid.");
		let store_backend = Arc::new(MemoryCredentialStore::default());

		if let Some(pair) = seed {
			store_backend.seed(pair);
		}

		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let (alerts, alert_rx) = AlertService::new();
		let gateway = Gateway::with_transport(
			config,
			Arc::new(ReqwestTransport::default()),
			Arc::new(DefaultTransferErrorResolver),
			store,
			Arc::new(alerts),
		);

		(gateway, store_backend, alert_rx)
	}

	/// Token pair fixture used by most integration tests.
	pub fn seed_pair(access: &str, refresh: &str) -> TokenPair {
		TokenPair::new(access, refresh)
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{RequestError, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
