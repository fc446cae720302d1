//! Navigation state.
//!
//! A [`Navigator`] owns the current path, records transitions into a
//! [`History`] and notifies subscribers after every change. It is a cheap
//! `Rc` handle: clones share the same state.
//!
//! Transitions requested while subscribers are being notified are queued and
//! applied in order once the running notification cycle has finished, so a
//! subscriber always observes one complete cycle per transition.
//!
//! ```
//! use std::rc::Rc;
//! use waypoint_router::{MemoryHistory, Navigator};
//!
//! let history = Rc::new(MemoryHistory::new("/"));
//! let navigator = Navigator::from_history(Rc::clone(&history));
//!
//! navigator.navigate("/about");
//! history.back();
//! assert_eq!(navigator.current_path(), "/");
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::RouterResult;
use crate::history::{History, ListenerId, MemoryHistory};
use crate::params::ParamMap;
use crate::pattern::PathPattern;
use crate::route::{RouteMatch, Router};
use crate::settings::{DuplicateParamPolicy, RouterSettings};

/// How the current path was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationType {
	/// A new history entry was pushed.
	Push,
	/// The current history entry was replaced.
	Replace,
	/// The host moved back or forward.
	Pop,
}

/// Handle returned by [`Navigator::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<dyn Fn(&str)>;

struct Transition {
	path: String,
	kind: NavigationType,
}

struct NavigatorInner {
	current: RefCell<String>,
	history: Rc<dyn History>,
	subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
	next_id: Cell<u64>,
	pending: RefCell<VecDeque<Transition>>,
	notifying: Cell<bool>,
	pop_listener: Cell<Option<ListenerId>>,
	duplicate_params: DuplicateParamPolicy,
}

impl Drop for NavigatorInner {
	fn drop(&mut self) {
		if let Some(id) = self.pop_listener.take() {
			self.history.unlisten(id);
		}
	}
}

/// Ends a notification cycle. Queued transitions are discarded if a
/// subscriber panicked.
struct NotifyingGuard<'a>(&'a NavigatorInner);

impl Drop for NotifyingGuard<'_> {
	fn drop(&mut self) {
		if std::thread::panicking() {
			self.0.pending.borrow_mut().clear();
		}
		self.0.notifying.set(false);
	}
}

/// Shared navigation state handle.
#[derive(Clone)]
pub struct Navigator {
	inner: Rc<NavigatorInner>,
}

impl fmt::Debug for Navigator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Navigator")
			.field("current_path", &*self.inner.current.borrow())
			.field("subscribers", &self.inner.subscribers.borrow().len())
			.field("pending", &self.inner.pending.borrow().len())
			.finish()
	}
}

impl Navigator {
	/// Creates a navigator at `initial_path` backed by a [`MemoryHistory`].
	pub fn new(initial_path: impl Into<String>) -> Self {
		let initial_path = initial_path.into();
		let history = Rc::new(MemoryHistory::new(initial_path.clone()));
		Self::with_history(history, initial_path, DuplicateParamPolicy::default())
	}

	/// Creates a navigator starting at the history's current location.
	///
	/// Falls back to `/` when the history does not know its location.
	pub fn from_history<H: History + 'static>(history: Rc<H>) -> Self {
		let initial_path = history.current_path().unwrap_or_else(|| "/".to_string());
		Self::with_history(history, initial_path, DuplicateParamPolicy::default())
	}

	/// Creates a navigator at the configured initial path.
	///
	/// [`navigate_to`](Self::navigate_to) compiles patterns with the
	/// configured duplicate parameter policy.
	pub fn from_settings(settings: &RouterSettings) -> Self {
		let history = Rc::new(MemoryHistory::new(settings.initial_path.clone()));
		Self::with_history(
			history,
			settings.initial_path.clone(),
			settings.duplicate_params,
		)
	}

	/// Creates a navigator over `history` using `settings`.
	///
	/// Starts at the history's current location, falling back to the
	/// configured initial path.
	pub fn from_history_with_settings<H: History + 'static>(
		history: Rc<H>,
		settings: &RouterSettings,
	) -> Self {
		let initial_path = history
			.current_path()
			.unwrap_or_else(|| settings.initial_path.clone());
		Self::with_history(history, initial_path, settings.duplicate_params)
	}

	fn with_history(
		history: Rc<dyn History>,
		initial_path: String,
		duplicate_params: DuplicateParamPolicy,
	) -> Self {
		let inner = Rc::new(NavigatorInner {
			current: RefCell::new(initial_path),
			history: Rc::clone(&history),
			subscribers: RefCell::new(Vec::new()),
			next_id: Cell::new(0),
			pending: RefCell::new(VecDeque::new()),
			notifying: Cell::new(false),
			pop_listener: Cell::new(None),
			duplicate_params,
		});

		let weak: Weak<NavigatorInner> = Rc::downgrade(&inner);
		let id = history.listen(Box::new(move |path| {
			if let Some(inner) = weak.upgrade() {
				Navigator { inner }.on_history_pop(path);
			}
		}));
		inner.pop_listener.set(Some(id));

		Self { inner }
	}

	/// Returns the current path.
	pub fn current_path(&self) -> String {
		self.inner.current.borrow().clone()
	}

	/// Navigates to `path`, pushing a history entry.
	///
	/// Unroutable paths are accepted; resolution decides what to render.
	pub fn navigate(&self, path: &str) {
		self.transition(path, NavigationType::Push);
	}

	/// Navigates to `path`, replacing the current history entry.
	pub fn replace(&self, path: &str) {
		self.transition(path, NavigationType::Replace);
	}

	/// Applies a back/forward traversal reported by the host.
	///
	/// Updates the current path and notifies subscribers without writing to
	/// history.
	pub fn on_history_pop(&self, path: &str) {
		self.transition(path, NavigationType::Pop);
	}

	/// Builds a path from `pattern` and navigates to it.
	///
	/// The pattern is compiled with the duplicate parameter policy this
	/// navigator was configured with.
	///
	/// # Errors
	///
	/// Returns the compiler's or builder's error; nothing is navigated in
	/// that case.
	pub fn navigate_to(&self, pattern: &str, params: &ParamMap) -> RouterResult<()> {
		let path = PathPattern::with_policy(pattern, self.inner.duplicate_params)?.build(params)?;
		self.navigate(&path);
		Ok(())
	}

	/// Reverses the named route and navigates to it.
	///
	/// # Errors
	///
	/// Returns the reverse error; nothing is navigated in that case.
	pub fn navigate_named<H>(&self, router: &Router<H>, name: &str, params: &ParamMap) -> RouterResult<()> {
		let path = router.reverse(name, params)?;
		self.navigate(&path);
		Ok(())
	}

	/// Resolves the current path against `router`.
	pub fn resolve<'r, H>(&self, router: &'r Router<H>) -> Option<RouteMatch<'r, H>> {
		router.resolve(&self.current_path())
	}

	/// Registers a listener called with the new path after every transition.
	pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
	where
		F: Fn(&str) + 'static,
	{
		let id = SubscriptionId(self.inner.next_id.get());
		self.inner.next_id.set(id.0 + 1);
		self.inner
			.subscribers
			.borrow_mut()
			.push((id, Rc::new(listener)));
		id
	}

	/// Removes a listener. Returns `false` if `id` was not subscribed.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut subscribers = self.inner.subscribers.borrow_mut();
		let before = subscribers.len();
		subscribers.retain(|(sid, _)| *sid != id);
		subscribers.len() != before
	}

	/// Returns the number of active subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.inner.subscribers.borrow().len()
	}

	fn transition(&self, path: &str, kind: NavigationType) {
		self.inner.pending.borrow_mut().push_back(Transition {
			path: path.to_string(),
			kind,
		});

		if self.inner.notifying.get() {
			tracing::debug!(path, kind = ?kind, "navigation queued during notification");
			return;
		}

		self.inner.notifying.set(true);
		let _guard = NotifyingGuard(&self.inner);

		loop {
			let next = self.inner.pending.borrow_mut().pop_front();
			let Some(transition) = next else {
				break;
			};
			self.apply(transition);
		}
	}

	fn apply(&self, Transition { path, kind }: Transition) {
		tracing::debug!(path = %path, kind = ?kind, "navigation");

		let recorded = match kind {
			NavigationType::Push => self.inner.history.push(&path),
			NavigationType::Replace => self.inner.history.replace(&path),
			NavigationType::Pop => Ok(()),
		};
		if let Err(err) = recorded {
			tracing::warn!(path = %path, error = %err, "history backend rejected entry");
		}

		*self.inner.current.borrow_mut() = path.clone();

		let subscribers: Vec<Subscriber> = self
			.inner
			.subscribers
			.borrow()
			.iter()
			.map(|(_, s)| Rc::clone(s))
			.collect();
		for subscriber in subscribers {
			subscriber(&path);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::HistoryError;
	use rstest::rstest;

	struct RejectingHistory;

	impl History for RejectingHistory {
		fn push(&self, path: &str) -> Result<(), HistoryError> {
			Err(HistoryError::Rejected {
				path: path.to_string(),
				reason: "quota".to_string(),
			})
		}

		fn replace(&self, _path: &str) -> Result<(), HistoryError> {
			Err(HistoryError::Unavailable("detached".to_string()))
		}

		fn current_path(&self) -> Option<String> {
			None
		}

		fn listen(&self, _listener: crate::history::PopListener) -> ListenerId {
			ListenerId(0)
		}

		fn unlisten(&self, _id: ListenerId) {}
	}

	fn recorder(navigator: &Navigator) -> Rc<RefCell<Vec<String>>> {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		navigator.subscribe(move |path| sink.borrow_mut().push(path.to_string()));
		seen
	}

	#[rstest]
	fn test_new_starts_at_initial_path() {
		let navigator = Navigator::new("/start");
		assert_eq!(navigator.current_path(), "/start");
	}

	#[rstest]
	fn test_from_settings() {
		let settings = RouterSettings::new().with_initial_path("/dashboard");
		assert_eq!(Navigator::from_settings(&settings).current_path(), "/dashboard");
	}

	#[rstest]
	fn test_from_history_falls_back_to_root() {
		let navigator = Navigator::from_history(Rc::new(RejectingHistory));
		assert_eq!(navigator.current_path(), "/");
	}

	#[rstest]
	fn test_navigate_notifies_subscribers() {
		let navigator = Navigator::new("/");
		let seen = recorder(&navigator);

		navigator.navigate("/about");
		navigator.replace("/contact");

		assert_eq!(navigator.current_path(), "/contact");
		assert_eq!(*seen.borrow(), vec!["/about", "/contact"]);
	}

	#[rstest]
	fn test_history_failure_does_not_block_navigation() {
		let navigator = Navigator::from_history(Rc::new(RejectingHistory));
		let seen = recorder(&navigator);

		navigator.navigate("/about");
		navigator.replace("/home");

		assert_eq!(navigator.current_path(), "/home");
		assert_eq!(seen.borrow().len(), 2);
	}

	#[rstest]
	fn test_pop_does_not_push() {
		let history = Rc::new(MemoryHistory::new("/"));
		let navigator = Navigator::from_history(Rc::clone(&history));

		navigator.on_history_pop("/elsewhere");

		assert_eq!(navigator.current_path(), "/elsewhere");
		assert_eq!(history.len(), 1);
	}

	#[rstest]
	fn test_unsubscribe() {
		let navigator = Navigator::new("/");
		let count = Rc::new(Cell::new(0));
		let counter = Rc::clone(&count);
		let id = navigator.subscribe(move |_| counter.set(counter.get() + 1));

		navigator.navigate("/a");
		assert!(navigator.unsubscribe(id));
		assert!(!navigator.unsubscribe(id));
		navigator.navigate("/b");

		assert_eq!(count.get(), 1);
		assert_eq!(navigator.subscriber_count(), 0);
	}

	#[rstest]
	fn test_reentrant_navigation_is_queued() {
		let navigator = Navigator::new("/");
		let log = Rc::new(RefCell::new(Vec::new()));

		let first = Rc::clone(&log);
		let handle = navigator.clone();
		navigator.subscribe(move |path| {
			first.borrow_mut().push(format!("a:{}", path));
			if path == "/login" {
				handle.navigate("/dashboard");
				first
					.borrow_mut()
					.push(format!("a:after:{}", handle.current_path()));
			}
		});
		let second = Rc::clone(&log);
		navigator.subscribe(move |path| second.borrow_mut().push(format!("b:{}", path)));

		navigator.navigate("/login");

		assert_eq!(
			*log.borrow(),
			vec![
				"a:/login",
				"a:after:/login",
				"b:/login",
				"a:/dashboard",
				"b:/dashboard",
			]
		);
		assert_eq!(navigator.current_path(), "/dashboard");
	}

	#[rstest]
	fn test_subscribe_during_notification() {
		let navigator = Navigator::new("/");
		let late = Rc::new(Cell::new(0));

		let handle = navigator.clone();
		let counter = Rc::clone(&late);
		navigator.subscribe(move |path| {
			if path == "/a" {
				let counter = Rc::clone(&counter);
				handle.subscribe(move |_| counter.set(counter.get() + 1));
			}
		});

		navigator.navigate("/a");
		assert_eq!(late.get(), 0);
		navigator.navigate("/b");
		assert_eq!(late.get(), 1);
	}

	#[rstest]
	fn test_navigate_to_build_error_leaves_state() {
		let navigator = Navigator::new("/");
		let seen = recorder(&navigator);

		let result = navigator.navigate_to("/user/:id", &ParamMap::new());

		assert!(result.is_err());
		assert_eq!(navigator.current_path(), "/");
		assert!(seen.borrow().is_empty());
	}

	#[rstest]
	fn test_navigate_to_builds_path() {
		let navigator = Navigator::new("/");
		navigator
			.navigate_to("/user/:id", &ParamMap::from([("id", "7")]))
			.unwrap();
		assert_eq!(navigator.current_path(), "/user/7");
	}

	#[rstest]
	fn test_dropped_navigator_ignores_pops() {
		let history = Rc::new(MemoryHistory::new("/"));
		history.push("/a").unwrap();
		drop(Navigator::from_history(Rc::clone(&history)));

		assert!(history.back());
		assert_eq!(history.current_path().as_deref(), Some("/"));
	}

	#[rstest]
	fn test_dropped_navigator_releases_pop_listener() {
		let history = Rc::new(MemoryHistory::new("/"));
		let navigator = Navigator::from_history(Rc::clone(&history));
		let clone = navigator.clone();
		assert_eq!(history.listener_count(), 1);

		drop(navigator);
		assert_eq!(history.listener_count(), 1);
		drop(clone);
		assert_eq!(history.listener_count(), 0);

		for _ in 0..16 {
			drop(Navigator::from_history(Rc::clone(&history)));
		}
		assert_eq!(history.listener_count(), 0);
	}

	#[rstest]
	fn test_subscriber_panic_discards_queued_transitions() {
		let navigator = Navigator::new("/");
		let seen = recorder(&navigator);

		let handle = navigator.clone();
		navigator.subscribe(move |path| {
			if path == "/login" {
				handle.navigate("/dashboard");
				panic!("subscriber failed");
			}
		});

		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			navigator.navigate("/login")
		}));
		assert!(result.is_err());

		navigator.navigate("/home");

		assert_eq!(*seen.borrow(), vec!["/login", "/home"]);
		assert_eq!(navigator.current_path(), "/home");
	}

	#[rstest]
	fn test_navigate_to_uses_configured_duplicate_policy() {
		let params = ParamMap::from([("id", "1")]);

		let strict = Navigator::new("/");
		assert!(strict.navigate_to("/a/:id/b/:id", &params).is_err());

		let settings = RouterSettings::new().with_duplicate_params(DuplicateParamPolicy::LastWins);
		let lenient = Navigator::from_settings(&settings);
		lenient.navigate_to("/a/:id/b/:id", &params).unwrap();
		assert_eq!(lenient.current_path(), "/a/1/b/1");
	}

	#[rstest]
	fn test_from_history_with_settings() {
		let settings = RouterSettings::new().with_initial_path("/inbox");

		let known = Navigator::from_history_with_settings(Rc::new(MemoryHistory::new("/here")), &settings);
		assert_eq!(known.current_path(), "/here");

		let unknown = Navigator::from_history_with_settings(Rc::new(RejectingHistory), &settings);
		assert_eq!(unknown.current_path(), "/inbox");
	}
}
