// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Publish/subscribe channel for active-locale changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::debug;

use crate::error::LocaleError;

type Handler = Arc<dyn Fn(&str) -> Result<(), LocaleError> + Send + Sync>;

#[derive(Default)]
struct Registry {
	next_id: AtomicU64,
	handlers: Mutex<Vec<(u64, Handler)>>,
}

impl Registry {
	fn handlers(&self) -> MutexGuard<'_, Vec<(u64, Handler)>> {
		self.handlers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn remove(&self, id: u64) {
		self.handlers().retain(|(handler_id, _)| *handler_id != id);
	}
}

/// Emits locale codes to subscribed handlers.
///
/// Handlers run synchronously on the publishing thread, in subscription
/// order. Cloning the notifier yields another handle to the same channel.
#[derive(Clone, Default)]
pub struct LanguageChangeNotifier {
	registry: Arc<Registry>,
}

impl std::fmt::Debug for LanguageChangeNotifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LanguageChangeNotifier")
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

impl LanguageChangeNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `handler` for future notifications.
	///
	/// Delivery stops when the returned [`Subscription`] is dropped or
	/// explicitly unsubscribed.
	pub fn subscribe<F>(&self, handler: F) -> Subscription
	where
		F: Fn(&str) -> Result<(), LocaleError> + Send + Sync + 'static,
	{
		let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
		self.registry.handlers().push((id, Arc::new(handler)));
		debug!(subscription_id = id, "language change handler subscribed");

		Subscription {
			id: Some(id),
			registry: Arc::downgrade(&self.registry),
		}
	}

	/// Deliver `code` to every live handler.
	///
	/// All handlers are invoked even if one fails; the first failure is
	/// returned. Handlers may subscribe or unsubscribe while being notified;
	/// such changes take effect from the next publish.
	pub fn publish(&self, code: &str) -> Result<(), LocaleError> {
		let snapshot: Vec<Handler> = self
			.registry
			.handlers()
			.iter()
			.map(|(_, handler)| Arc::clone(handler))
			.collect();

		debug!(locale = %code, subscribers = snapshot.len(), "publishing language change");

		let mut first_error = None;
		for handler in snapshot {
			if let Err(e) = handler(code) {
				first_error.get_or_insert(e);
			}
		}

		match first_error {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}

	pub fn subscriber_count(&self) -> usize {
		self.registry.handlers().len()
	}
}

/// Handle to a registered language change handler.
///
/// Dropping the handle unsubscribes. Use [`Subscription::detach`] to keep the
/// handler registered for the notifier's whole lifetime.
#[must_use = "dropping a Subscription immediately unsubscribes its handler"]
#[derive(Debug)]
pub struct Subscription {
	id: Option<u64>,
	registry: Weak<Registry>,
}

impl Subscription {
	/// Stop receiving notifications. Already-persisted state is unaffected.
	pub fn unsubscribe(mut self) {
		self.release();
	}

	/// Keep the handler registered without holding the handle.
	pub fn detach(mut self) {
		self.id = None;
	}

	pub fn is_active(&self) -> bool {
		match (self.id, self.registry.upgrade()) {
			(Some(id), Some(registry)) => registry.handlers().iter().any(|(h, _)| *h == id),
			_ => false,
		}
	}

	fn release(&mut self) {
		if let (Some(id), Some(registry)) = (self.id.take(), self.registry.upgrade()) {
			registry.remove(id);
			debug!(subscription_id = id, "language change handler unsubscribed");
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.release();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex as StdMutex;

	fn recorder() -> (
		Arc<StdMutex<Vec<String>>>,
		impl Fn(&str) -> Result<(), LocaleError> + Send + Sync + 'static,
	) {
		let seen = Arc::new(StdMutex::new(Vec::new()));
		let sink = Arc::clone(&seen);
		let handler = move |code: &str| {
			sink.lock().unwrap().push(code.to_string());
			Ok(())
		};
		(seen, handler)
	}

	#[test]
	fn test_publish_reaches_subscribers_in_order() {
		let notifier = LanguageChangeNotifier::new();
		let order = Arc::new(StdMutex::new(Vec::new()));

		let first = Arc::clone(&order);
		let _a = notifier.subscribe(move |code| {
			first.lock().unwrap().push(format!("a:{code}"));
			Ok(())
		});
		let second = Arc::clone(&order);
		let _b = notifier.subscribe(move |code| {
			second.lock().unwrap().push(format!("b:{code}"));
			Ok(())
		});

		notifier.publish("hi").unwrap();
		assert_eq!(*order.lock().unwrap(), vec!["a:hi", "b:hi"]);
	}

	#[test]
	fn test_unsubscribe_stops_delivery() {
		let notifier = LanguageChangeNotifier::new();
		let (seen, handler) = recorder();
		let subscription = notifier.subscribe(handler);

		notifier.publish("hi").unwrap();
		assert!(subscription.is_active());
		subscription.unsubscribe();
		notifier.publish("mr").unwrap();

		assert_eq!(*seen.lock().unwrap(), vec!["hi"]);
		assert_eq!(notifier.subscriber_count(), 0);
	}

	#[test]
	fn test_drop_unsubscribes() {
		let notifier = LanguageChangeNotifier::new();
		let (seen, handler) = recorder();
		{
			let _subscription = notifier.subscribe(handler);
			assert_eq!(notifier.subscriber_count(), 1);
		}
		notifier.publish("hi").unwrap();
		assert!(seen.lock().unwrap().is_empty());
	}

	#[test]
	fn test_detach_keeps_handler() {
		let notifier = LanguageChangeNotifier::new();
		let (seen, handler) = recorder();
		notifier.subscribe(handler).detach();

		notifier.publish("mr").unwrap();
		assert_eq!(*seen.lock().unwrap(), vec!["mr"]);
	}

	#[test]
	fn test_first_error_returned_and_all_handlers_run() {
		let notifier = LanguageChangeNotifier::new();
		let _failing = notifier.subscribe(|code| Err(LocaleError::unsupported(code, &[])));
		let (seen, handler) = recorder();
		let _ok = notifier.subscribe(handler);

		let err = notifier.publish("fr").unwrap_err();
		assert!(matches!(err, LocaleError::UnsupportedLocale { code, .. } if code == "fr"));
		assert_eq!(*seen.lock().unwrap(), vec!["fr"]);
	}

	#[test]
	fn test_subscription_outlives_notifier() {
		let notifier = LanguageChangeNotifier::new();
		let subscription = notifier.subscribe(|_| Ok(()));
		drop(notifier);

		assert!(!subscription.is_active());
		subscription.unsubscribe();
	}

	#[test]
	fn test_handler_may_unsubscribe_during_publish() {
		let notifier = LanguageChangeNotifier::new();
		let slot: Arc<StdMutex<Option<Subscription>>> = Arc::new(StdMutex::new(None));

		let inner = Arc::clone(&slot);
		let subscription = notifier.subscribe(move |_| {
			inner.lock().unwrap().take();
			Ok(())
		});
		*slot.lock().unwrap() = Some(subscription);

		notifier.publish("hi").unwrap();
		assert_eq!(notifier.subscriber_count(), 0);
	}
}
