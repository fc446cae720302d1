// Loading router settings from TOML files and wiring them into a router.

use std::io::Write;

use rstest::*;
use tempfile::NamedTempFile;
use waypoint_router::{
	DuplicateParamPolicy, Navigator, Router, RouterError, RouterSettings, SettingsError,
};

fn settings_file(contents: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	file
}

#[rstest]
fn test_load_from_file() {
	let file = settings_file(
		r#"
initial_path = "/inbox"
strict_params = true
duplicate_params = "last_wins"
"#,
	);

	let settings = RouterSettings::from_toml_file(file.path()).unwrap();

	assert_eq!(settings.initial_path, "/inbox");
	assert!(settings.strict_params);
	assert_eq!(settings.duplicate_params, DuplicateParamPolicy::LastWins);
}

#[rstest]
fn test_missing_file_is_io_error() {
	let dir = tempfile::tempdir().unwrap();
	let result = RouterSettings::from_toml_file(dir.path().join("router.toml"));
	assert!(matches!(result, Err(SettingsError::Io(_))));
}

#[rstest]
fn test_malformed_file_is_parse_error() {
	let file = settings_file("initial_path = ");
	let result = RouterSettings::from_toml_file(file.path());
	assert!(matches!(result, Err(SettingsError::Parse(_))));
}

#[rstest]
fn test_wrong_type_is_parse_error() {
	let file = settings_file("strict_params = \"yes\"");
	let result = RouterSettings::from_toml_file(file.path());
	assert!(matches!(result, Err(SettingsError::Parse(_))));
}

#[rstest]
fn test_settings_drive_router_and_navigator() {
	let settings =
		RouterSettings::from_toml_str("initial_path = \"/inbox\"\nstrict_params = true").unwrap();

	let navigator = Navigator::from_settings(&settings);
	let router = Router::with_settings(settings)
		.named_route("inbox", "/inbox", "inbox")
		.named_route("message", "/inbox/:id", "message");

	assert_eq!(*navigator.resolve(&router).unwrap().handler(), "inbox");

	let result = router.reverse_with("inbox", &[("id", "1")]);
	assert!(matches!(result, Err(RouterError::UnexpectedParameter(_))));
	assert_eq!(router.reverse_with("message", &[("id", "1")]).unwrap(), "/inbox/1");
}
