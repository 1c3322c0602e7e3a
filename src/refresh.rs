//! Token reissue orchestration with single-flight coalescing.
//!
//! Any number of requests can discover an expired access token in the same instant; the
//! coordinator guarantees the backend sees exactly one reissue call. Two mechanisms work
//! together. The in-flight operation lives in an atomic slot as a joinable shared future:
//! the first caller creates it, every concurrent caller clones the same handle, and each
//! waiter clears the slot only after observing the settled outcome, so the handle stays
//! joinable for the whole window in which the expiry was discovered. Callers whose 401
//! arrives after that window closes are caught by a stale-pair guard: the reissue first
//! compares the stored pair against the pair the caller failed with, and if another task
//! already rotated it the caller piggybacks on that rotation without touching the network.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use futures::{
	FutureExt,
	future::{BoxFuture, Shared},
};
// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	endpoint::api,
	obs::{self, RequestKind, RequestOutcome, RequestSpan},
	store::CredentialStore,
	transfer::DataTransferService,
};

type SharedRefresh = Shared<BoxFuture<'static, Result<(), RefreshFailure>>>;
type RefreshSlot = Arc<Mutex<Option<SharedRefresh>>>;

/// Terminal refresh failure fanned out to every waiter.
///
/// Clone-able because the shared future replays the single outcome to all of them. A
/// failed reissue leaves no token to retry with, so waiters must propagate session
/// expiry instead of resending their original requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshFailure {
	/// The refresh token is missing, rejected, or unreachable; the user must sign in again.
	#[error("Session has expired; the user must sign in again.")]
	SessionExpired,
}

/// Coalesces concurrent token reissues into one shared operation.
#[derive(Clone)]
pub struct RefreshCoordinator {
	transfer: Arc<DataTransferService>,
	store: Arc<dyn CredentialStore>,
	slot: RefreshSlot,
	metrics: Arc<RefreshMetrics>,
}
impl RefreshCoordinator {
	/// Creates a coordinator over the shared transfer service and credential store.
	pub fn new(transfer: Arc<DataTransferService>, store: Arc<dyn CredentialStore>) -> Self {
		Self { transfer, store, slot: Default::default(), metrics: Default::default() }
	}

	/// Returns the shared reissue counters.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Joins the in-flight reissue, creating one if none exists.
	///
	/// `observed` is the pair the caller's rejected request was built with. If the store
	/// already holds a different pair by the time the reissue runs, another task rotated
	/// the credentials in the meantime and this call succeeds without network traffic;
	/// reissuing again would burn the freshly minted refresh token.
	///
	/// Existence check and creation happen under a single lock acquisition, so two
	/// callers racing on the same expiry can never start two reissue calls. Every caller
	/// awaits the same settled outcome; the slot is cleared by the waiters themselves,
	/// and only when it still holds the handle they awaited.
	pub async fn refresh(&self, observed: &TokenPair) -> Result<(), RefreshFailure> {
		let shared = {
			let mut slot = self.slot.lock();

			match slot.as_ref() {
				Some(inflight) => inflight.clone(),
				None => {
					let inflight = Self::reissue(
						self.transfer.clone(),
						self.store.clone(),
						observed.clone(),
						self.metrics.clone(),
					)
					.boxed()
					.shared();

					*slot = Some(inflight.clone());

					inflight
				},
			}
		};
		let result = shared.clone().await;

		// Cleared waiter-side, after the outcome is observed. Clearing inside the
		// operation would empty the slot before late same-window callers joined it,
		// and each of them would start a reissue of its own.
		{
			let mut slot = self.slot.lock();

			if slot.as_ref().is_some_and(|inflight| inflight.ptr_eq(&shared)) {
				*slot = None;
			}
		}

		result
	}

	async fn reissue(
		transfer: Arc<DataTransferService>,
		store: Arc<dyn CredentialStore>,
		observed: TokenPair,
		metrics: Arc<RefreshMetrics>,
	) -> Result<(), RefreshFailure> {
		const KIND: RequestKind = RequestKind::Reissue;

		let pair = store
			.load()
			.await
			.map_err(|_err| {
				#[cfg(feature = "tracing")]
				tracing::warn!(error = %_err, "credential store failed during reissue");

				RefreshFailure::SessionExpired
			})?
			.ok_or(RefreshFailure::SessionExpired)?;

		// Stale-pair guard: a completed rotation supersedes this reissue entirely.
		if pair != observed {
			return Ok(());
		}

		let span = RequestSpan::new(KIND, "reissue");

		obs::record_request_outcome(KIND, RequestOutcome::Attempt);
		metrics.record_attempt();

		let result = span.instrument(Self::perform(transfer, store, pair)).await;

		match &result {
			Ok(()) => {
				metrics.record_success();
				obs::record_request_outcome(KIND, RequestOutcome::Success);
			},
			Err(_) => {
				metrics.record_failure();
				obs::record_request_outcome(KIND, RequestOutcome::Failure);
			},
		}

		result
	}

	async fn perform(
		transfer: Arc<DataTransferService>,
		store: Arc<dyn CredentialStore>,
		pair: TokenPair,
	) -> Result<(), RefreshFailure> {
		let endpoint = api::reissue_token(&pair.refresh_token)
			.map_err(|_| RefreshFailure::SessionExpired)?;
		let fresh: TokenPair = transfer.request(&endpoint).await.map_err(|_err| {
			#[cfg(feature = "tracing")]
			tracing::warn!(error = %_err, "token reissue call failed");

			RefreshFailure::SessionExpired
		})?;

		store.replace(fresh).await.map_err(|_| RefreshFailure::SessionExpired)?;

		Ok(())
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("inflight", &self.slot.lock().is_some())
			.finish()
	}
}

/// Thread-safe counters for reissue attempts.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the total number of reissue calls that reached the network.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of successful reissue calls.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed reissue calls.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		sync::atomic::{AtomicU64, Ordering},
		time::Duration,
	};
	// self
	use super::*;
	use crate::{
		config::ApiConfig,
		error::TransportError,
		store::MemoryCredentialStore,
		transfer::DefaultTransferErrorResolver,
		transport::{HttpTransport, PreparedRequest, RawResponse, TransportFuture},
	};

	struct CountingTransport {
		calls: AtomicU64,
		status: u16,
		delay: Duration,
	}
	impl CountingTransport {
		fn new(status: u16) -> Arc<Self> {
			Self::delayed(status, Duration::ZERO)
		}

		// A non-zero delay keeps the reissue in flight long enough for joined callers
		// to find it in the slot instead of racing past a settled one.
		fn delayed(status: u16, delay: Duration) -> Arc<Self> {
			Arc::new(Self { calls: AtomicU64::new(0), status, delay })
		}
	}
	impl HttpTransport for CountingTransport {
		fn execute(&self, _request: PreparedRequest) -> TransportFuture<'_, RawResponse> {
			let call = self.calls.fetch_add(1, Ordering::SeqCst);
			let status = self.status;
			let delay = self.delay;

			Box::pin(async move {
				if !delay.is_zero() {
					tokio::time::sleep(delay).await;
				}
				if status != 200 {
					return Err(TransportError::Status { code: status, body: Vec::new() });
				}

				let body = format!(
					"{{\"accessToken\":\"access-{call}\",\"refreshToken\":\"refresh-{call}\"}}"
				);

				Ok(RawResponse { status, body: body.into_bytes() })
			})
		}
	}

	fn stale_pair() -> TokenPair {
		TokenPair::new("access-stale", "refresh-stale")
	}

	fn coordinator(
		transport: Arc<CountingTransport>,
	) -> (RefreshCoordinator, Arc<MemoryCredentialStore>) {
		let config = ApiConfig::new("https://api.example.com").expect("Config fixture is valid.");
		let transfer = Arc::new(DataTransferService::new(
			config,
			transport,
			Arc::new(DefaultTransferErrorResolver),
		));
		let store = Arc::new(MemoryCredentialStore::default());

		store.seed(stale_pair());

		let coordinator = RefreshCoordinator::new(transfer, store.clone());

		(coordinator, store)
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_reissue() {
		let transport = CountingTransport::delayed(200, Duration::from_millis(20));
		let (coordinator, store) = coordinator(transport.clone());
		let observed = stale_pair();
		let (a, b, c) = tokio::join!(
			coordinator.refresh(&observed),
			coordinator.refresh(&observed),
			coordinator.refresh(&observed),
		);

		a.expect("First waiter should observe the shared success.");
		b.expect("Second waiter should observe the shared success.");
		c.expect("Third waiter should observe the shared success.");

		assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
		assert_eq!(coordinator.metrics().attempts(), 1);

		let pair = store.snapshot().expect("Refreshed pair should be stored.");

		assert_eq!(pair.access_token.expose(), "access-0");
	}

	#[tokio::test]
	async fn late_observers_of_a_rotated_pair_skip_the_network() {
		let transport = CountingTransport::new(200);
		let (coordinator, store) = coordinator(transport.clone());
		let observed = stale_pair();

		coordinator.refresh(&observed).await.expect("First reissue should succeed.");

		assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

		// The shared handle has settled and the slot is empty again, but the store
		// already holds the rotated pair; a caller still acting on the stale one must
		// not burn the fresh refresh token with a second reissue.
		coordinator.refresh(&observed).await.expect("Late observer should reuse the rotation.");

		assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
		assert_eq!(coordinator.metrics().attempts(), 1);

		let rotated = store.snapshot().expect("Rotated pair should be stored.");

		assert_eq!(rotated.access_token.expose(), "access-0");

		// A genuine new expiry of the rotated pair reissues again.
		coordinator.refresh(&rotated).await.expect("New expiry should start a fresh reissue.");

		assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn settled_failures_do_not_poison_the_slot() {
		let transport = CountingTransport::delayed(500, Duration::from_millis(20));
		let (coordinator, store) = coordinator(transport.clone());
		let observed = stale_pair();
		let (a, b) = tokio::join!(coordinator.refresh(&observed), coordinator.refresh(&observed));

		assert_eq!(a, Err(RefreshFailure::SessionExpired));
		assert_eq!(b, Err(RefreshFailure::SessionExpired));
		assert_eq!(
			transport.calls.load(Ordering::SeqCst),
			1,
			"Concurrent waiters must share the failed reissue as well.",
		);

		let later = coordinator.refresh(&observed).await;

		assert_eq!(later, Err(RefreshFailure::SessionExpired));
		assert_eq!(
			transport.calls.load(Ordering::SeqCst),
			2,
			"A settled slot must allow a fresh reissue attempt.",
		);
		assert_eq!(coordinator.metrics().failures(), 2);
		assert_eq!(
			store.snapshot().expect("Stale pair should remain stored.").access_token.expose(),
			"access-stale",
			"A failed reissue must not touch the stored pair.",
		);
	}

	#[tokio::test]
	async fn missing_credentials_fail_without_a_network_call() {
		let transport = CountingTransport::new(200);
		let (coordinator, store) = coordinator(transport.clone());

		store.clear().await.expect("Memory clear should never fail.");

		assert_eq!(coordinator.refresh(&stale_pair()).await, Err(RefreshFailure::SessionExpired));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
	}
}
