//! Error types for routing and navigation.

use thiserror::Error;

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Error type for typed path parameter extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
	/// Failed to parse a parameter value.
	#[error("failed to parse parameter{} '{raw_value}' as {param_type}: {reason}", fmt_index(.param_index))]
	ParseError {
		/// Index of the parameter that failed to parse.
		param_index: Option<usize>,
		/// Expected type name.
		param_type: &'static str,
		/// Raw string value that failed to parse.
		raw_value: String,
		/// Error message from parsing.
		reason: String,
	},
	/// Parameter count mismatch.
	#[error("parameter count mismatch: expected {expected}, got {actual}")]
	CountMismatch {
		/// Expected number of parameters.
		expected: usize,
		/// Actual number of parameters.
		actual: usize,
	},
	/// A named parameter is not present in the map.
	#[error("parameter '{0}' is not present")]
	Missing(String),
}

fn fmt_index(index: &Option<usize>) -> String {
	index.map(|i| format!("[{}]", i)).unwrap_or_default()
}

/// Error type for router operations.
#[derive(Debug, Error)]
pub enum RouterError {
	/// A required parameter has no value when building a path.
	#[error("missing parameter: {0}")]
	MissingParameter(String),

	/// Strict validation found a key the pattern does not declare.
	#[error("unexpected parameter: {0}")]
	UnexpectedParameter(String),

	/// A parameter value would corrupt segment boundaries.
	#[error("invalid value for parameter '{name}': {value:?} contains '/'")]
	InvalidParameterValue {
		/// Parameter name.
		name: String,
		/// Rejected value.
		value: String,
	},

	/// The same parameter name appears twice in one pattern.
	#[error("duplicate parameter '{name}' in pattern '{pattern}'")]
	DuplicateParameter {
		/// Pattern source string.
		pattern: String,
		/// Repeated parameter name.
		name: String,
	},

	/// The pattern string is longer than the compiler accepts.
	#[error("pattern length {length} exceeds maximum allowed length of {max} bytes")]
	PatternTooLong {
		/// Length of the rejected pattern in bytes.
		length: usize,
		/// Maximum accepted length.
		max: usize,
	},

	/// The pattern has more segments than the compiler accepts.
	#[error("pattern has {count} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Segment count of the rejected pattern.
		count: usize,
		/// Maximum accepted segment count.
		max: usize,
	},

	/// The compiled matcher could not be built.
	#[error("invalid route pattern '{pattern}': {source}")]
	InvalidPattern {
		/// Pattern source string.
		pattern: String,
		/// Underlying regex error.
		#[source]
		source: regex::Error,
	},

	/// No route is registered under this name.
	#[error("invalid route name: {0}")]
	InvalidRouteName(String),

	/// A route name was registered twice.
	#[error("duplicate route name: {0}")]
	DuplicateRouteName(String),

	/// Path parameter extraction failed.
	#[error("path extraction error: {0}")]
	PathExtraction(#[from] PathError),
}

/// Error returned by [`History`](crate::history::History) backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
	/// The host environment has no history to write to.
	#[error("history unavailable: {0}")]
	Unavailable(String),

	/// The host refused the entry.
	#[error("history entry rejected for '{path}': {reason}")]
	Rejected {
		/// Target path of the rejected entry.
		path: String,
		/// Reason reported by the host.
		reason: String,
	},
}

/// Error type for loading [`RouterSettings`](crate::settings::RouterSettings).
#[derive(Debug, Error)]
pub enum SettingsError {
	/// The TOML document could not be parsed.
	#[error("failed to parse router settings: {0}")]
	Parse(#[from] toml::de::Error),

	/// The settings file could not be read.
	#[error("failed to read router settings: {0}")]
	Io(#[from] std::io::Error),

	/// A value is out of range.
	#[error("invalid router settings: {0}")]
	Invalid(String),
}
