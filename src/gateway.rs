//! Authenticated request gateway with transparent token refresh.
//!
//! [`Gateway`] is the single entry point application code talks to. Authenticated calls
//! go through a descriptor factory so the bearer header is rebuilt from whatever pair the
//! credential store holds at send time; when the backend answers 401 the gateway joins
//! the coalesced reissue in [`crate::refresh::RefreshCoordinator`] and resends the
//! original request exactly once with the fresh token. Every failure is classified
//! centrally: alert-worthy ones are reported to [`AlertService`] and collapse into
//! [`RequestError::Handled`], 404s pass through as [`RequestError::NoResponse`] so the
//! caller can react contextually.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	alert::{AlertService, UserAlert},
	auth::TokenPair,
	config::ApiConfig,
	endpoint::{Endpoint, EndpointError, ResourceRef},
	error::{DataTransferError, TransportError},
	obs::{self, RequestKind, RequestOutcome, RequestSpan},
	refresh::{RefreshCoordinator, RefreshMetrics},
	store::CredentialStore,
	transfer::{DataTransferService, TransferErrorResolver},
	transport::HttpTransport,
};
#[cfg(feature = "reqwest")] use crate::{
	transfer::DefaultTransferErrorResolver, transport::ReqwestTransport,
};

/// Entry point for all API traffic; owns refresh-and-retry and central error handling.
pub struct Gateway {
	transfer: Arc<DataTransferService>,
	store: Arc<dyn CredentialStore>,
	refresh: RefreshCoordinator,
	alerts: Arc<AlertService>,
}
impl Gateway {
	/// Creates a gateway over the default [`ReqwestTransport`] and error resolver.
	#[cfg(feature = "reqwest")]
	pub fn new(
		config: ApiConfig,
		store: Arc<dyn CredentialStore>,
		alerts: Arc<AlertService>,
	) -> Self {
		Self::with_transport(
			config,
			Arc::new(ReqwestTransport::default()),
			Arc::new(DefaultTransferErrorResolver),
			store,
			alerts,
		)
	}

	/// Creates a gateway over an explicit transport and resolver.
	pub fn with_transport(
		config: ApiConfig,
		transport: Arc<dyn HttpTransport>,
		resolver: Arc<dyn TransferErrorResolver>,
		store: Arc<dyn CredentialStore>,
		alerts: Arc<AlertService>,
	) -> Self {
		let transfer = Arc::new(DataTransferService::new(config, transport, resolver));
		let refresh = RefreshCoordinator::new(transfer.clone(), store.clone());

		Self { transfer, store, refresh, alerts }
	}

	/// Returns the alert service failures are reported to.
	pub fn alerts(&self) -> &Arc<AlertService> {
		&self.alerts
	}

	/// Returns the reissue counters maintained by the refresh coordinator.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		self.refresh.metrics()
	}

	/// Sends an unauthenticated request and decodes the JSON response.
	///
	/// No refresh is attempted: a 401 on a call that carries no token cannot be repaired
	/// by reissuing one, so it is reported as a generic failure.
	pub async fn basic_request<T>(&self, endpoint: &Endpoint<T>) -> Result<T>
	where
		T: DeserializeOwned,
	{
		const KIND: RequestKind = RequestKind::Basic;

		let span = RequestSpan::new(KIND, "basic_request");

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);

		let result = span
			.instrument(async {
				self.transfer
					.request(endpoint)
					.await
					.map_err(|e| self.classify(KIND, e, endpoint.resource))
			})
			.await;

		Self::record_settled(KIND, &result);

		result
	}

	/// Sends an authenticated request, refreshing and retrying once on token expiry.
	///
	/// `descriptor` is invoked with the currently stored token pair before every attempt,
	/// so the retry after a successful reissue carries the fresh access token rather than
	/// the one that just expired.
	pub async fn authenticated_request<T, F>(&self, descriptor: F) -> Result<T>
	where
		T: DeserializeOwned,
		F: Fn(&TokenPair) -> Result<Endpoint<T>, EndpointError>,
	{
		const KIND: RequestKind = RequestKind::Authenticated;

		let span = RequestSpan::new(KIND, "authenticated_request");

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);

		let result = span
			.instrument(async {
				let mut retried = false;

				loop {
					let pair = self.load_pair().await?;
					let endpoint = self.build(descriptor(&pair))?;

					match self.transfer.request(&endpoint).await {
						Ok(value) => return Ok(value),
						Err(DataTransferError::ExpiredToken) if !retried => {
							retried = true;

							self.refresh(&pair).await?;
						},
						Err(e) => return Err(self.classify(KIND, e, endpoint.resource)),
					}
				}
			})
			.await;

		Self::record_settled(KIND, &result);

		result
	}

	/// Sends an authenticated request whose response body is ignored.
	///
	/// Same refresh-and-retry policy as [`Gateway::authenticated_request`]; used by calls
	/// like join/leave where only the status code matters.
	pub async fn authenticated_request_discarding<F>(&self, descriptor: F) -> Result<()>
	where
		F: Fn(&TokenPair) -> Result<Endpoint<()>, EndpointError>,
	{
		const KIND: RequestKind = RequestKind::Authenticated;

		let span = RequestSpan::new(KIND, "authenticated_request_discarding");

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);

		let result = span
			.instrument(async {
				let mut retried = false;

				loop {
					let pair = self.load_pair().await?;
					let endpoint = self.build(descriptor(&pair))?;

					match self.transfer.request_discarding(&endpoint).await {
						Ok(()) => return Ok(()),
						Err(DataTransferError::ExpiredToken) if !retried => {
							retried = true;

							self.refresh(&pair).await?;
						},
						Err(e) => return Err(self.classify(KIND, e, endpoint.resource)),
					}
				}
			})
			.await;

		Self::record_settled(KIND, &result);

		result
	}

	// Loaded fresh before every attempt; caching the pair across an await would let a
	// retry reuse a token another task already replaced.
	async fn load_pair(&self) -> Result<TokenPair> {
		match self.store.load().await {
			Ok(Some(pair)) => Ok(pair),
			Ok(None) => Err(self.expire_session()),
			Err(_e) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(error = %_e, "credential store failed while preparing a request");

				self.alerts.report(UserAlert::Unknown);

				Err(RequestError::Handled)
			},
		}
	}

	fn build<T>(&self, built: Result<Endpoint<T>, EndpointError>) -> Result<Endpoint<T>> {
		built.map_err(|_e| {
			#[cfg(feature = "tracing")]
			tracing::warn!(error = %_e, "endpoint descriptor could not be built");

			RequestError::Unknown
		})
	}

	async fn refresh(&self, observed: &TokenPair) -> Result<()> {
		self.refresh.refresh(observed).await.map_err(|_| self.expire_session())
	}

	fn expire_session(&self) -> RequestError {
		self.alerts.report(UserAlert::SessionExpired);

		RequestError::Handled
	}

	fn classify(
		&self,
		kind: RequestKind,
		error: DataTransferError,
		resource: Option<ResourceRef>,
	) -> RequestError {
		#[cfg(feature = "tracing")]
		tracing::warn!(kind = %kind, error = %error, "request failed");

		match error {
			DataTransferError::ExpiredToken =>
				if kind == RequestKind::Authenticated {
					// A second 401 right after a successful reissue means the session is
					// not recoverable by refreshing again.
					self.expire_session()
				} else {
					self.alerts.report(UserAlert::Unknown);

					RequestError::Handled
				},
			DataTransferError::NetworkFailure(TransportError::NotConnected { .. }) => {
				self.alerts.report(UserAlert::NetworkUnavailable);

				RequestError::Handled
			},
			DataTransferError::NetworkFailure(_) => {
				self.alerts.report(UserAlert::ServerUnavailable);

				RequestError::Handled
			},
			DataTransferError::NoResponse => RequestError::NoResponse { resource },
			DataTransferError::Parsing { .. }
			| DataTransferError::BadRequest
			| DataTransferError::Unknown { .. } => {
				self.alerts.report(UserAlert::Unknown);

				RequestError::Handled
			},
		}
	}

	fn record_settled<T>(kind: RequestKind, result: &Result<T>) {
		match result {
			Ok(_) => obs::record_request_outcome(kind, RequestOutcome::Success),
			Err(_) => obs::record_request_outcome(kind, RequestOutcome::Failure),
		}
	}
}
impl Debug for Gateway {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("transfer", &self.transfer)
			.field("refresh", &self.refresh)
			.finish()
	}
}
