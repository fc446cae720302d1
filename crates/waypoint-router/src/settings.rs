//! Router configuration.
//!
//! Settings can be built in code or loaded from TOML:
//!
//! ```
//! use waypoint_router::{DuplicateParamPolicy, RouterSettings};
//!
//! let settings = RouterSettings::from_toml_str(r#"
//! initial_path = "/dashboard"
//! strict_params = true
//! duplicate_params = "last_wins"
//! "#).unwrap();
//!
//! assert_eq!(settings.initial_path, "/dashboard");
//! assert!(settings.strict_params);
//! assert_eq!(settings.duplicate_params, DuplicateParamPolicy::LastWins);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// What the compiler does with a parameter name that appears twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateParamPolicy {
	/// Fail compilation with `DuplicateParameter`.
	#[default]
	Reject,
	/// Compile; the last occurrence wins when extracting.
	LastWins,
}

/// Configuration shared by [`Router`](crate::Router) and
/// [`Navigator`](crate::Navigator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
	/// Path the navigator starts at when created from settings.
	pub initial_path: String,

	/// Whether `Router::reverse` requires parameter keys to match the
	/// pattern's declared names exactly.
	pub strict_params: bool,

	/// Duplicate parameter name handling for every registered pattern.
	pub duplicate_params: DuplicateParamPolicy,
}

impl Default for RouterSettings {
	fn default() -> Self {
		Self {
			initial_path: "/".to_string(),
			strict_params: false,
			duplicate_params: DuplicateParamPolicy::default(),
		}
	}
}

impl RouterSettings {
	/// Creates settings with default values.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the initial navigation path.
	pub fn with_initial_path(mut self, path: impl Into<String>) -> Self {
		self.initial_path = path.into();
		self
	}

	/// Enables or disables strict parameter validation.
	pub fn with_strict_params(mut self, strict: bool) -> Self {
		self.strict_params = strict;
		self
	}

	/// Sets the duplicate parameter policy.
	pub fn with_duplicate_params(mut self, policy: DuplicateParamPolicy) -> Self {
		self.duplicate_params = policy;
		self
	}

	/// Parses and validates settings from a TOML document.
	///
	/// Missing keys take their default values.
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		let settings: Self = toml::from_str(source)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Reads, parses and validates settings from a TOML file.
	pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let source = std::fs::read_to_string(path)?;
		Self::from_toml_str(&source)
	}

	/// Checks value ranges.
	///
	/// # Errors
	///
	/// Returns [`SettingsError::Invalid`] if `initial_path` is not absolute.
	pub fn validate(&self) -> Result<(), SettingsError> {
		if !self.initial_path.starts_with('/') {
			return Err(SettingsError::Invalid(format!(
				"initial_path must start with '/', got {:?}",
				self.initial_path
			)));
		}
		Ok(())
	}
}
