//! Thread-safe in-memory [`CredentialStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	store::{CredentialStore, StoreFuture},
};

type Slot = Arc<RwLock<Option<TokenPair>>>;

/// Keeps the token pair in-process; nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore(Slot);
impl MemoryCredentialStore {
	/// Synchronously installs a pair, bypassing the async contract. Test setup helper.
	pub fn seed(&self, pair: TokenPair) {
		*self.0.write() = Some(pair);
	}

	/// Synchronously reads the pair. Test inspection helper.
	pub fn snapshot(&self) -> Option<TokenPair> {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryCredentialStore {
	fn load(&self) -> StoreFuture<'_, Option<TokenPair>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn replace(&self, pair: TokenPair) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(pair);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = None;

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn replace_swaps_the_whole_pair() {
		let store = MemoryCredentialStore::default();

		assert_eq!(
			store.load().await.expect("Memory load should never fail."),
			None,
			"A fresh store should hold no credentials.",
		);

		store
			.replace(TokenPair::new("access-1", "refresh-1"))
			.await
			.expect("Memory replace should never fail.");
		store
			.replace(TokenPair::new("access-2", "refresh-2"))
			.await
			.expect("Memory replace should never fail.");

		let pair = store
			.load()
			.await
			.expect("Memory load should never fail.")
			.expect("Replaced pair should be present.");

		assert_eq!(pair.access_token.expose(), "access-2");
		assert_eq!(pair.refresh_token.expose(), "refresh-2");

		store.clear().await.expect("Memory clear should never fail.");

		assert_eq!(store.snapshot(), None);
	}
}
