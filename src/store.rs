//! Storage contracts and built-in credential store implementations.

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

// self
use crate::{_prelude::*, auth::TokenPair};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the token pair.
///
/// The store owns the pair exclusively. Writers replace it as a unit via
/// [`CredentialStore::replace`]; a partially updated pair must never be observable.
/// Readers re-load at every descriptor build instead of caching across await points,
/// which is what makes the post-refresh retry pick up the fresh token.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the current pair, if the user is signed in.
	fn load(&self) -> StoreFuture<'_, Option<TokenPair>>;

	/// Atomically replaces the stored pair.
	fn replace(&self, pair: TokenPair) -> StoreFuture<'_, ()>;

	/// Removes the stored pair (sign-out).
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
