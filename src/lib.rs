//! # Waypoint
//!
//! Client-side routing for single-page applications.
//!
//! This crate re-exports [`waypoint_router`]; most applications only need the
//! [`prelude`].
//!
//! ```
//! use waypoint::prelude::*;
//!
//! let router = Router::new()
//! 	.route("/", "home")
//! 	.route("/orders/:id", "order");
//!
//! let navigator = Navigator::new("/");
//! navigator.navigate("/orders/17");
//!
//! let route_match = navigator.resolve(&router).unwrap();
//! assert_eq!(*route_match.handler(), "order");
//! assert_eq!(route_match.params.parse::<u32>("id").unwrap(), 17);
//! ```

pub use waypoint_router as router;

pub use waypoint_router::{
	DuplicateParamPolicy, FromParams, History, HistoryError, ListenerId, MemoryHistory, NavigationType,
	Navigator, ParamMap, Path, PathError, PathPattern, Route, RouteMatch, Router, RouterError,
	RouterResult, RouterSettings, SettingsError, SubscriptionId, build_path, extract_params,
	match_path,
};

#[cfg(target_arch = "wasm32")]
pub use waypoint_router::BrowserHistory;

/// Commonly used types.
pub mod prelude {
	pub use crate::{
		FromParams, History, MemoryHistory, Navigator, ParamMap, Path, PathPattern, RouteMatch,
		Router, RouterError, RouterSettings,
	};

	#[cfg(target_arch = "wasm32")]
	pub use crate::BrowserHistory;
}
