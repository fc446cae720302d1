//! # Waypoint Router
//!
//! Client-side routing for single-page applications: path patterns with
//! named parameters, an ordered route registry, a path builder and a
//! navigation state that stays in sync with the session history.
//!
//! ## Example
//!
//! ```
//! use waypoint_router::{Navigator, ParamMap, Router};
//!
//! #[derive(Debug, PartialEq)]
//! enum Page {
//! 	About,
//! 	UserTest,
//! }
//!
//! let router = Router::new()
//! 	.route("/about", Page::About)
//! 	.named_route("user_test", "/users/:userId/test/:testId", Page::UserTest);
//!
//! let route_match = router.resolve("/users/42/test/99").unwrap();
//! assert_eq!(*route_match.handler(), Page::UserTest);
//! assert_eq!(route_match.params.get("testId"), Some("99"));
//! assert!(router.resolve("/missing").is_none());
//!
//! let navigator = Navigator::new("/");
//! navigator.navigate("/about");
//! assert_eq!(*navigator.resolve(&router).unwrap().handler(), Page::About);
//!
//! let params = ParamMap::from([("userId", "1"), ("testId", "2")]);
//! navigator.navigate_named(&router, "user_test", &params).unwrap();
//! assert_eq!(navigator.current_path(), "/users/1/test/2");
//! ```
//!
//! ## Matching rules
//!
//! - Paths and patterns are split on `/`; segment counts must agree.
//! - Literal segments compare byte-for-byte; there is no decoding, case
//!   folding or trailing-slash normalization.
//! - A parameter segment matches any single segment, including an empty one.
//! - The first registered route that matches wins.

pub mod error;
pub mod history;
pub mod navigation;
pub mod params;
pub mod pattern;
pub mod route;
pub mod settings;

#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use error::{HistoryError, PathError, RouterError, RouterResult, SettingsError};
pub use history::{History, ListenerId, MemoryHistory, PopListener};
pub use navigation::{NavigationType, Navigator, SubscriptionId};
pub use params::{FromParams, ParamMap, Path};
pub use pattern::{
	MAX_PATH_SEGMENTS, MAX_PATTERN_LENGTH, PARAM_MARKER, PathPattern, Segment, build_path,
	extract_param_names, extract_param_values, extract_params, match_path,
};
pub use route::{Route, RouteMatch, Router};
pub use settings::{DuplicateParamPolicy, RouterSettings};

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHistory;
