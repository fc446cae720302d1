// Route resolution and reverse routing through the public API.

use rstest::*;
use waypoint_router::{
	DuplicateParamPolicy, Path, ParamMap, RouteMatch, Router, RouterError, RouterSettings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
	About,
	UserTest,
	Orders,
	OrderDetail,
	Fallback,
}

#[fixture]
fn router() -> Router<Handler> {
	Router::from_definitions([
		("/about", Handler::About),
		("/users/:userId/test/:testId", Handler::UserTest),
	])
	.unwrap()
}

// Test: End-to-end resolution of a parameterized route
#[rstest]
fn test_resolve_parameterized_route(router: Router<Handler>) {
	let route_match = router.resolve("/users/42/test/99").unwrap();

	assert_eq!(*route_match.handler(), Handler::UserTest);
	assert_eq!(
		route_match.params,
		ParamMap::from([("userId", "42"), ("testId", "99")])
	);
}

// Test: Literal route resolves with empty params
#[rstest]
fn test_resolve_literal_route(router: Router<Handler>) {
	let route_match = router.resolve("/about").unwrap();
	assert_eq!(*route_match.handler(), Handler::About);
	assert!(route_match.params.is_empty());
}

#[rstest]
#[case("/missing")]
#[case("/about/")]
#[case("/About")]
#[case("/users/42/test")]
#[case("/users/42/test/99/extra")]
#[case("")]
fn test_resolve_miss(router: Router<Handler>, #[case] path: &str) {
	assert!(router.resolve(path).is_none());
}

// Test: Empty segments still bind a parameter
#[rstest]
fn test_resolve_empty_parameter(router: Router<Handler>) {
	let route_match = router.resolve("/users//test/").unwrap();
	assert_eq!(route_match.params.get("userId"), Some(""));
	assert_eq!(route_match.params.get("testId"), Some(""));
}

// Test: Values are returned raw, without percent-decoding
#[rstest]
fn test_resolve_does_not_decode(router: Router<Handler>) {
	let route_match = router.resolve("/users/a%2Fb/test/x%20y").unwrap();
	assert_eq!(route_match.params.get("userId"), Some("a%2Fb"));
	assert_eq!(route_match.params.get("testId"), Some("x%20y"));
}

#[rstest]
fn test_resolve_is_idempotent(router: Router<Handler>) {
	let first: Option<RouteMatch<'_, Handler>> = router.resolve("/users/1/test/2");
	let second = router.resolve("/users/1/test/2");
	assert_eq!(first, second);
}

// Test: Registration order decides overlapping matches
#[rstest]
#[case(vec![("/orders/new", Handler::Orders), ("/orders/:id", Handler::OrderDetail)], Handler::Orders)]
#[case(vec![("/orders/:id", Handler::OrderDetail), ("/orders/new", Handler::Orders)], Handler::OrderDetail)]
fn test_first_match_wins(#[case] definitions: Vec<(&str, Handler)>, #[case] expected: Handler) {
	let router = Router::from_definitions(definitions).unwrap();
	assert_eq!(*router.resolve("/orders/new").unwrap().handler(), expected);
}

#[rstest]
fn test_not_found_fallback(router: Router<Handler>) {
	let router = router.not_found(Handler::Fallback);

	let (handler, params) = router.handler_for("/missing").unwrap();
	assert_eq!(*handler, Handler::Fallback);
	assert!(params.is_empty());
	assert!(router.resolve("/missing").is_none());
}

// Test: Typed extraction from a resolved route
#[rstest]
fn test_typed_extraction() {
	let router = Router::new().route("/orders/:id/items/:line", Handler::OrderDetail);
	let route_match = router.resolve("/orders/17/items/3").unwrap();

	let (order, line): (u64, u32) = route_match.params.extract().unwrap();
	assert_eq!((order, line), (17, 3));

	let Path((order, _)): Path<(String, String)> = route_match.params.extract().unwrap();
	assert_eq!(order, "17");

	assert!(route_match.params.extract::<u64>().is_err());
	assert!(route_match.params.parse::<u8>("line").is_ok());
}

#[rstest]
fn test_typed_extraction_error_converts() {
	fn order_id(params: &ParamMap) -> Result<u64, RouterError> {
		Ok(params.parse("id")?)
	}

	let router = Router::new().route("/orders/:id", Handler::OrderDetail);
	let route_match = router.resolve("/orders/latest").unwrap();
	assert!(matches!(
		order_id(&route_match.params),
		Err(RouterError::PathExtraction(_))
	));
}

#[rstest]
fn test_reverse_then_resolve() {
	let router = Router::new()
		.named_route("order", "/orders/:id", Handler::OrderDetail)
		.named_route("orders", "/orders", Handler::Orders);

	let path = router.reverse_with("order", &[("id", "17")]).unwrap();
	let route_match = router.resolve(&path).unwrap();

	assert_eq!(*route_match.handler(), Handler::OrderDetail);
	assert_eq!(route_match.route.name(), Some("order"));
	assert_eq!(route_match.params.get("id"), Some("17"));
	assert_eq!(router.reverse_with("orders", &[]).unwrap(), "/orders");
}

#[rstest]
fn test_reverse_rejects_slash_in_value() {
	let router = Router::new().named_route("order", "/orders/:id", Handler::OrderDetail);
	let result = router.reverse_with("order", &[("id", "1/2")]);
	assert!(matches!(
		result,
		Err(RouterError::InvalidParameterValue { ref name, .. }) if name == "id"
	));
}

#[rstest]
fn test_strict_reverse_rejects_extra_keys() {
	let settings = RouterSettings::new().with_strict_params(true);
	let router = Router::with_settings(settings).named_route("order", "/orders/:id", Handler::OrderDetail);

	let result = router.reverse_with("order", &[("id", "1"), ("page", "2")]);
	assert!(matches!(result, Err(RouterError::UnexpectedParameter(ref key)) if key == "page"));
}

#[rstest]
#[case(DuplicateParamPolicy::Reject, false)]
#[case(DuplicateParamPolicy::LastWins, true)]
fn test_duplicate_param_policy(#[case] policy: DuplicateParamPolicy, #[case] accepted: bool) {
	let settings = RouterSettings::new().with_duplicate_params(policy);
	let result = Router::with_settings(settings).try_route("/pair/:x/:x", Handler::Orders);
	assert_eq!(result.is_ok(), accepted);
}
