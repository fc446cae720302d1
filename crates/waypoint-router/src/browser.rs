//! Browser session history (WASM only).

use std::cell::{Cell, RefCell};
use std::fmt;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::error::HistoryError;
use crate::history::{History, ListenerId, PopListener};

type PopStateClosure = Closure<dyn FnMut(web_sys::PopStateEvent)>;

/// [`History`] backed by `window.history` and the `popstate` event.
///
/// Registered `popstate` closures are owned by this handle and removed from
/// the window by [`unlisten`](History::unlisten) or when the handle drops.
#[derive(Default)]
pub struct BrowserHistory {
	listeners: RefCell<Vec<(ListenerId, PopStateClosure)>>,
	next_id: Cell<u64>,
}

impl fmt::Debug for BrowserHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BrowserHistory")
			.field("listeners", &self.listeners.borrow().len())
			.finish()
	}
}

impl BrowserHistory {
	/// Creates a handle to the page's session history.
	pub fn new() -> Self {
		Self::default()
	}

	fn window() -> Result<web_sys::Window, HistoryError> {
		web_sys::window().ok_or_else(|| HistoryError::Unavailable("no global window".to_string()))
	}

	fn history() -> Result<web_sys::History, HistoryError> {
		Self::window()?
			.history()
			.map_err(|e| HistoryError::Unavailable(format!("{:?}", e)))
	}

	fn rejected(path: &str, err: JsValue) -> HistoryError {
		HistoryError::Rejected {
			path: path.to_string(),
			reason: format!("{:?}", err),
		}
	}

	fn detach(closure: &PopStateClosure) {
		let Ok(window) = Self::window() else {
			return;
		};
		if let Err(err) =
			window.remove_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
		{
			tracing::warn!(error = ?err, "failed to remove popstate listener");
		}
	}
}

impl History for BrowserHistory {
	fn push(&self, path: &str) -> Result<(), HistoryError> {
		Self::history()?
			.push_state_with_url(&JsValue::NULL, "", Some(path))
			.map_err(|e| Self::rejected(path, e))
	}

	fn replace(&self, path: &str) -> Result<(), HistoryError> {
		Self::history()?
			.replace_state_with_url(&JsValue::NULL, "", Some(path))
			.map_err(|e| Self::rejected(path, e))
	}

	fn current_path(&self) -> Option<String> {
		Self::window().ok()?.location().pathname().ok()
	}

	fn listen(&self, listener: PopListener) -> ListenerId {
		let id = ListenerId(self.next_id.get());
		self.next_id.set(id.0 + 1);

		let window = match Self::window() {
			Ok(window) => window,
			Err(err) => {
				tracing::warn!(error = %err, "cannot listen for popstate");
				return id;
			}
		};

		let location = window.location();
		let closure = Closure::wrap(Box::new(move |_event: web_sys::PopStateEvent| {
			match location.pathname() {
				Ok(path) => listener(&path),
				Err(err) => tracing::warn!(error = ?err, "popstate without a readable location"),
			}
		}) as Box<dyn FnMut(_)>);

		if let Err(err) =
			window.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
		{
			tracing::warn!(error = ?err, "failed to add popstate listener");
			return id;
		}

		self.listeners.borrow_mut().push((id, closure));
		id
	}

	fn unlisten(&self, id: ListenerId) {
		let removed = {
			let mut listeners = self.listeners.borrow_mut();
			listeners
				.iter()
				.position(|(lid, _)| *lid == id)
				.map(|index| listeners.remove(index))
		};
		if let Some((_, closure)) = removed {
			Self::detach(&closure);
		}
	}
}

impl Drop for BrowserHistory {
	fn drop(&mut self) {
		for (_, closure) in self.listeners.get_mut().drain(..) {
			Self::detach(&closure);
		}
	}
}
