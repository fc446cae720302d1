//! History backends.
//!
//! The navigator writes every push and replace through a [`History`] and is
//! told about back/forward traversals through the listener registered with
//! [`History::listen`]. [`MemoryHistory`] keeps the stack in memory and is
//! what tests and non-browser hosts use; `BrowserHistory` drives the
//! browser's session history on `wasm32`.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::error::HistoryError;

/// Callback invoked with the destination path after a back/forward traversal.
pub type PopListener = Box<dyn Fn(&str)>;

/// Handle returned by [`History::listen`].
///
/// Backends choose the raw value; it only has to be unique per backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A session history the navigator records into.
pub trait History {
	/// Appends an entry for `path`.
	fn push(&self, path: &str) -> Result<(), HistoryError>;

	/// Overwrites the current entry with `path`.
	fn replace(&self, path: &str) -> Result<(), HistoryError>;

	/// Returns the path of the current entry, if the host knows it.
	fn current_path(&self) -> Option<String>;

	/// Registers a listener for back/forward traversals.
	///
	/// Listeners are not called for [`push`](Self::push) or
	/// [`replace`](Self::replace).
	fn listen(&self, listener: PopListener) -> ListenerId;

	/// Removes a listener. Unknown ids are ignored.
	fn unlisten(&self, id: ListenerId);
}

/// Clears queued traversals if a listener panics mid-notification.
struct DrainGuard<'a> {
	notifying: &'a Cell<bool>,
	pending: &'a RefCell<VecDeque<String>>,
}

impl Drop for DrainGuard<'_> {
	fn drop(&mut self) {
		if std::thread::panicking() {
			self.pending.borrow_mut().clear();
		}
		self.notifying.set(false);
	}
}

/// An in-memory history stack.
///
/// Traversals started by a listener while another traversal is being
/// reported move the position immediately and are reported, in order, once
/// the running notification has finished.
///
/// ```
/// use waypoint_router::{History, MemoryHistory};
///
/// let history = MemoryHistory::new("/");
/// history.push("/about").unwrap();
/// history.back();
/// assert_eq!(history.current_path().as_deref(), Some("/"));
/// ```
pub struct MemoryHistory {
	entries: RefCell<Vec<String>>,
	index: Cell<usize>,
	listeners: RefCell<Vec<(ListenerId, Rc<dyn Fn(&str)>)>>,
	next_id: Cell<u64>,
	pending: RefCell<VecDeque<String>>,
	notifying: Cell<bool>,
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryHistory")
			.field("entries", &self.entries.borrow())
			.field("index", &self.index.get())
			.field("listeners", &self.listeners.borrow().len())
			.finish()
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new("/")
	}
}

impl MemoryHistory {
	/// Creates a history holding a single entry.
	pub fn new(initial: impl Into<String>) -> Self {
		Self {
			entries: RefCell::new(vec![initial.into()]),
			index: Cell::new(0),
			listeners: RefCell::new(Vec::new()),
			next_id: Cell::new(0),
			pending: RefCell::new(VecDeque::new()),
			notifying: Cell::new(false),
		}
	}

	/// Returns a snapshot of all entries.
	pub fn entries(&self) -> Vec<String> {
		self.entries.borrow().clone()
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Always `false`; a history has at least one entry.
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	/// Returns the position of the current entry.
	pub fn index(&self) -> usize {
		self.index.get()
	}

	/// Returns the number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.listeners.borrow().len()
	}

	/// Returns whether [`back`](Self::back) would move.
	pub fn can_go_back(&self) -> bool {
		self.index.get() > 0
	}

	/// Returns whether [`forward`](Self::forward) would move.
	pub fn can_go_forward(&self) -> bool {
		self.index.get() + 1 < self.len()
	}

	/// Moves one entry back. Returns `false` at the start of the stack.
	pub fn back(&self) -> bool {
		self.go(-1)
	}

	/// Moves one entry forward. Returns `false` at the end of the stack.
	pub fn forward(&self) -> bool {
		self.go(1)
	}

	/// Moves `delta` entries and notifies listeners.
	///
	/// Out-of-range moves and `delta == 0` do nothing and return `false`.
	pub fn go(&self, delta: isize) -> bool {
		let target = match self.index.get().checked_add_signed(delta) {
			Some(target) if delta != 0 && target < self.len() => target,
			_ => return false,
		};
		self.index.set(target);

		let path = self.entries.borrow()[target].clone();
		tracing::trace!(path = %path, delta, "history traversal");
		self.pending.borrow_mut().push_back(path);

		if self.notifying.get() {
			return true;
		}

		self.notifying.set(true);
		let _guard = DrainGuard {
			notifying: &self.notifying,
			pending: &self.pending,
		};

		loop {
			let next = self.pending.borrow_mut().pop_front();
			let Some(path) = next else {
				break;
			};
			let listeners: Vec<Rc<dyn Fn(&str)>> = self
				.listeners
				.borrow()
				.iter()
				.map(|(_, l)| Rc::clone(l))
				.collect();
			for listener in listeners {
				listener(&path);
			}
		}
		true
	}
}

impl History for MemoryHistory {
	fn push(&self, path: &str) -> Result<(), HistoryError> {
		let mut entries = self.entries.borrow_mut();
		let next = self.index.get() + 1;
		entries.truncate(next);
		entries.push(path.to_string());
		self.index.set(next);
		Ok(())
	}

	fn replace(&self, path: &str) -> Result<(), HistoryError> {
		let mut entries = self.entries.borrow_mut();
		let index = self.index.get();
		entries[index] = path.to_string();
		Ok(())
	}

	fn current_path(&self) -> Option<String> {
		self.entries.borrow().get(self.index.get()).cloned()
	}

	fn listen(&self, listener: PopListener) -> ListenerId {
		let id = ListenerId(self.next_id.get());
		self.next_id.set(id.0 + 1);
		self.listeners.borrow_mut().push((id, Rc::from(listener)));
		id
	}

	fn unlisten(&self, id: ListenerId) {
		self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
	}
}
