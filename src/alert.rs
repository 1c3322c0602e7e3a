//! Central user-facing error handling with alert de-duplication.
//!
//! The gateway funnels every failure that needs user attention into one
//! [`AlertService`]. The service enforces a single visible alert at a time: while one is
//! showing, further reports are dropped silently, which keeps a burst of concurrently
//! failing requests from stacking messages. The embedding UI consumes alerts from the
//! stream returned by [`AlertService::new`] and calls [`AlertService::dismiss`] when the
//! user closes the dialog; dismissing a session-expiry alert additionally broadcasts the
//! payload-less session-expired event the navigation layer uses to force sign-out.

// crates.io
use tokio::sync::{
	broadcast,
	mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};
// self
use crate::_prelude::*;

const SESSION_EVENT_CAPACITY: usize = 8;

/// User-facing alert classifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserAlert {
	/// The device is offline.
	NetworkUnavailable,
	/// The server could not be reached or answered erratically.
	ServerUnavailable,
	/// An unclassified failure.
	Unknown,
	/// Authentication is beyond recovery; the user must sign in again.
	SessionExpired,
}
impl UserAlert {
	/// Returns the alert title shown to the user.
	pub const fn title(self) -> &'static str {
		match self {
			UserAlert::NetworkUnavailable => "No network connection",
			UserAlert::ServerUnavailable => "Server is unavailable",
			UserAlert::Unknown => "Something went wrong",
			UserAlert::SessionExpired => "Session expired",
		}
	}

	/// Returns the supporting detail line shown under the title.
	pub const fn detail(self) -> &'static str {
		match self {
			UserAlert::NetworkUnavailable => "Check your connection and try again.",
			UserAlert::ServerUnavailable => "Please try again in a moment.",
			UserAlert::Unknown => "Please try again.",
			UserAlert::SessionExpired => "Please sign in again to continue.",
		}
	}
}
impl Display for UserAlert {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.title())
	}
}

/// De-duplicating dispatcher for user-facing alerts and the session-expired event.
pub struct AlertService {
	showing: Mutex<Option<UserAlert>>,
	alert_tx: UnboundedSender<UserAlert>,
	session_tx: broadcast::Sender<()>,
}
impl AlertService {
	/// Creates the service and the alert stream the embedding UI should consume.
	pub fn new() -> (Self, UnboundedReceiver<UserAlert>) {
		let (alert_tx, alert_rx) = unbounded_channel();
		let (session_tx, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
		let service = Self { showing: Mutex::new(None), alert_tx, session_tx };

		(service, alert_rx)
	}

	/// Reports a failure that requires user notification.
	///
	/// Dropped silently while another alert is visible; the suppression window closes
	/// when [`AlertService::dismiss`] runs.
	pub fn report(&self, alert: UserAlert) {
		let mut showing = self.showing.lock();

		if showing.is_some() {
			#[cfg(feature = "tracing")]
			tracing::debug!(alert = %alert, "alert suppressed; another alert is visible");

			return;
		}

		*showing = Some(alert);

		// The UI side may have shut down; suppression state stays consistent either way.
		let _ = self.alert_tx.send(alert);
	}

	/// Marks the visible alert as dismissed by the user.
	///
	/// Dismissing a [`UserAlert::SessionExpired`] alert broadcasts the session-expired
	/// event; because only one such alert can ever be visible, the event fires at most
	/// once per expiry no matter how many requests failed concurrently.
	pub fn dismiss(&self) {
		let dismissed = self.showing.lock().take();

		if matches!(dismissed, Some(UserAlert::SessionExpired)) {
			let _ = self.session_tx.send(());
		}
	}

	/// Returns whether an alert is currently visible.
	pub fn is_showing(&self) -> bool {
		self.showing.lock().is_some()
	}

	/// Subscribes to the process-wide session-expired broadcast.
	pub fn subscribe_session_expired(&self) -> broadcast::Receiver<()> {
		self.session_tx.subscribe()
	}
}
impl Debug for AlertService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AlertService").field("showing", &*self.showing.lock()).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn concurrent_reports_collapse_into_one_alert() {
		let (service, mut alerts) = AlertService::new();

		service.report(UserAlert::Unknown);
		service.report(UserAlert::ServerUnavailable);
		service.report(UserAlert::NetworkUnavailable);

		assert_eq!(alerts.try_recv(), Ok(UserAlert::Unknown));
		assert!(alerts.try_recv().is_err(), "Suppressed alerts must not reach the UI stream.");
		assert!(service.is_showing());

		service.dismiss();
		service.report(UserAlert::NetworkUnavailable);

		assert_eq!(
			alerts.try_recv(),
			Ok(UserAlert::NetworkUnavailable),
			"Dismissal should reopen the suppression window.",
		);
	}

	#[test]
	fn session_expiry_broadcasts_once_on_dismissal() {
		let (service, mut alerts) = AlertService::new();
		let mut session = service.subscribe_session_expired();

		service.report(UserAlert::SessionExpired);
		service.report(UserAlert::SessionExpired);
		service.report(UserAlert::Unknown);

		assert_eq!(alerts.try_recv(), Ok(UserAlert::SessionExpired));
		assert!(
			session.try_recv().is_err(),
			"The event must not fire before the user dismisses the alert.",
		);

		service.dismiss();

		assert!(session.try_recv().is_ok());
		assert!(
			session.try_recv().is_err(),
			"Concurrent failures must not produce extra session events.",
		);
	}

	#[test]
	fn generic_dismissal_does_not_broadcast() {
		let (service, _alerts) = AlertService::new();
		let mut session = service.subscribe_session_expired();

		service.report(UserAlert::ServerUnavailable);
		service.dismiss();

		assert!(session.try_recv().is_err());
	}
}
