//! Route registry and resolution.
//!
//! A [`Router`] is an ordered list of routes. [`Router::resolve`] walks the
//! list in registration order and returns the first route whose pattern
//! matches, so more specific patterns must be registered before more general
//! ones that could also match.

use std::collections::HashMap;
use std::fmt;

use crate::error::{RouterError, RouterResult};
use crate::params::ParamMap;
use crate::pattern::PathPattern;
use crate::settings::RouterSettings;

/// A single route definition.
///
/// `H` is the consumer's handler reference; the router never inspects it.
#[derive(Clone)]
pub struct Route<H> {
	/// The path pattern.
	pattern: PathPattern,
	/// Optional route name for reverse lookups.
	name: Option<String>,
	/// The consumer's handler.
	handler: H,
}

impl<H> fmt::Debug for Route<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Route")
			.field("pattern", &self.pattern.as_str())
			.field("name", &self.name)
			.finish()
	}
}

impl<H> Route<H> {
	/// Creates an unnamed route from a compiled pattern.
	pub fn new(pattern: PathPattern, handler: H) -> Self {
		Self {
			pattern,
			name: None,
			handler,
		}
	}

	/// Names this route for reverse lookups.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Returns the route name.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	/// Returns the pattern.
	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	/// Returns the handler.
	pub fn handler(&self) -> &H {
		&self.handler
	}
}

/// A matched route with extracted parameters.
pub struct RouteMatch<'r, H> {
	/// The matched route.
	pub route: &'r Route<H>,
	/// Extracted path parameters.
	pub params: ParamMap,
}

impl<H> RouteMatch<'_, H> {
	/// Returns the matched route's handler.
	pub fn handler(&self) -> &H {
		self.route.handler()
	}
}

impl<H> Clone for RouteMatch<'_, H> {
	fn clone(&self) -> Self {
		Self {
			route: self.route,
			params: self.params.clone(),
		}
	}
}

impl<H> fmt::Debug for RouteMatch<'_, H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RouteMatch")
			.field("route", self.route)
			.field("params", &self.params)
			.finish()
	}
}

impl<H> PartialEq for RouteMatch<'_, H> {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self.route, other.route) && self.params == other.params
	}
}

/// The route registry.
pub struct Router<H> {
	/// Registered routes, in registration order.
	routes: Vec<Route<H>>,
	/// Named routes for reverse lookups.
	named_routes: HashMap<String, usize>,
	/// Not found handler.
	not_found: Option<H>,
	/// Compilation and reverse settings.
	settings: RouterSettings,
}

impl<H> fmt::Debug for Router<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("routes_count", &self.routes.len())
			.field(
				"named_routes",
				&self.named_routes.keys().collect::<Vec<_>>(),
			)
			.field("has_not_found", &self.not_found.is_some())
			.finish()
	}
}

impl<H> Default for Router<H> {
	fn default() -> Self {
		Self::new()
	}
}

impl<H> Router<H> {
	/// Creates an empty router with default settings.
	pub fn new() -> Self {
		Self::with_settings(RouterSettings::default())
	}

	/// Creates an empty router with the given settings.
	pub fn with_settings(settings: RouterSettings) -> Self {
		Self {
			routes: Vec::new(),
			named_routes: HashMap::new(),
			not_found: None,
			settings,
		}
	}

	/// Builds a router from ordered `(pattern, handler)` pairs.
	///
	/// ```
	/// use waypoint_router::Router;
	///
	/// let router = Router::from_definitions([("/about", "about"), ("/users/:id", "user")]).unwrap();
	/// let route_match = router.resolve("/users/42").unwrap();
	/// assert_eq!(*route_match.handler(), "user");
	/// assert_eq!(route_match.params.get("id"), Some("42"));
	/// ```
	pub fn from_definitions<I, P>(definitions: I) -> RouterResult<Self>
	where
		I: IntoIterator<Item = (P, H)>,
		P: AsRef<str>,
	{
		definitions
			.into_iter()
			.try_fold(Self::new(), |router, (pattern, handler)| {
				router.try_route(pattern.as_ref(), handler)
			})
	}

	/// Returns the settings this router was built with.
	pub fn settings(&self) -> &RouterSettings {
		&self.settings
	}

	fn compile(&self, pattern: &str) -> RouterResult<PathPattern> {
		PathPattern::with_policy(pattern, self.settings.duplicate_params)
	}

	/// Adds a route to the router.
	///
	/// # Panics
	///
	/// Panics if the pattern is invalid. Use [`try_route`](Self::try_route)
	/// for fallible construction.
	pub fn route(self, pattern: &str, handler: H) -> Self {
		self.try_route(pattern, handler)
			.unwrap_or_else(|e| panic!("Invalid route pattern '{}': {}", pattern, e))
	}

	/// Adds a named route to the router.
	///
	/// # Panics
	///
	/// Panics if the pattern is invalid or the name is already registered.
	pub fn named_route(self, name: &str, pattern: &str, handler: H) -> Self {
		self.try_named_route(name, pattern, handler)
			.unwrap_or_else(|e| panic!("Invalid route '{}' ({}): {}", name, pattern, e))
	}

	/// Adds a route, returning an error if the pattern does not compile.
	pub fn try_route(mut self, pattern: &str, handler: H) -> RouterResult<Self> {
		let pattern = self.compile(pattern)?;
		self.routes.push(Route::new(pattern, handler));
		Ok(self)
	}

	/// Adds a named route, returning an error if the pattern does not compile
	/// or the name is taken.
	pub fn try_named_route(mut self, name: &str, pattern: &str, handler: H) -> RouterResult<Self> {
		if self.named_routes.contains_key(name) {
			return Err(RouterError::DuplicateRouteName(name.to_string()));
		}
		let pattern = self.compile(pattern)?;
		let index = self.routes.len();
		self.routes
			.push(Route::new(pattern, handler).with_name(name));
		self.named_routes.insert(name.to_string(), index);
		Ok(self)
	}

	/// Sets the not found handler.
	pub fn not_found(mut self, handler: H) -> Self {
		self.not_found = Some(handler);
		self
	}

	/// Returns the not found handler.
	pub fn not_found_handler(&self) -> Option<&H> {
		self.not_found.as_ref()
	}

	/// Resolves a path to the first matching route.
	///
	/// Returns `None` when no route matches.
	pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_, H>> {
		let found = self.routes.iter().find_map(|route| {
			route
				.pattern
				.captures(path)
				.map(|params| RouteMatch { route, params })
		});

		if found.is_none() {
			tracing::debug!(path, "no route matched");
		}
		found
	}

	/// Resolves a path to a handler, falling back to the not found handler.
	///
	/// The fallback is returned with empty parameters. Returns `None` only
	/// when nothing matches and no fallback is set.
	pub fn handler_for(&self, path: &str) -> Option<(&H, ParamMap)> {
		match self.resolve(path) {
			Some(RouteMatch { route, params }) => Some((route.handler(), params)),
			None => self.not_found.as_ref().map(|h| (h, ParamMap::new())),
		}
	}

	/// Generates a path by route name.
	///
	/// Under `strict_params` the keys of `params` must be exactly the
	/// route's parameter names.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidRouteName`] for an unknown name and the
	/// builder's errors otherwise.
	pub fn reverse(&self, name: &str, params: &ParamMap) -> RouterResult<String> {
		let route = self
			.get_route(name)
			.ok_or_else(|| RouterError::InvalidRouteName(name.to_string()))?;

		if self.settings.strict_params {
			route.pattern.build_strict(params)
		} else {
			route.pattern.build(params)
		}
	}

	/// [`reverse`](Self::reverse) taking parameters as pairs.
	pub fn reverse_with(&self, name: &str, params: &[(&str, &str)]) -> RouterResult<String> {
		let params: ParamMap = params.iter().copied().collect();
		self.reverse(name, &params)
	}

	/// Returns the route registered under `name`.
	pub fn get_route(&self, name: &str) -> Option<&Route<H>> {
		self.named_routes.get(name).map(|&index| &self.routes[index])
	}

	/// Returns all routes in registration order.
	pub fn routes(&self) -> &[Route<H>] {
		&self.routes
	}

	/// Returns the number of registered routes.
	pub fn route_count(&self) -> usize {
		self.routes.len()
	}

	/// Checks if a route name exists.
	pub fn has_route(&self, name: &str) -> bool {
		self.named_routes.contains_key(name)
	}
}
