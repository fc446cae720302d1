//! Path pattern compilation, matching and building.
//!
//! Patterns are absolute, slash-delimited templates such as
//! `/users/:userId/test/:testId`. A segment starting with `:` is a parameter
//! named by the rest of the segment; every other segment is a literal.
//!
//! ```
//! use waypoint_router::{ParamMap, PathPattern};
//!
//! let pattern = PathPattern::new("/users/:userId/test/:testId").unwrap();
//! assert!(pattern.matches("/users/42/test/99"));
//!
//! let params = pattern.extract("/users/42/test/99");
//! assert_eq!(params.get("userId"), Some("42"));
//!
//! let path = pattern.build(&ParamMap::from([("userId", "7"), ("testId", "t1")])).unwrap();
//! assert_eq!(path, "/users/7/test/t1");
//! ```

use std::collections::HashSet;
use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::error::{RouterError, RouterResult};
use crate::params::ParamMap;
use crate::settings::DuplicateParamPolicy;

/// Marker that introduces a parameter segment.
pub const PARAM_MARKER: char = ':';

/// Capture group used for every parameter segment.
///
/// Matches any single segment, including the empty one.
const PARAM_CAPTURE: &str = "([^/]*)";

/// Maximum allowed length for a pattern string in bytes.
pub const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of slash-delimited segments in a pattern.
pub const MAX_PATH_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled pattern regex in bytes.
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// One slash-delimited segment of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
	/// Fixed text that must match byte-for-byte.
	Literal(String),
	/// Named parameter matching any single segment.
	Param(String),
}

impl Segment {
	/// Classifies a raw segment.
	pub fn parse(raw: &str) -> Self {
		match raw.strip_prefix(PARAM_MARKER) {
			Some(name) => Segment::Param(name.to_string()),
			None => Segment::Literal(raw.to_string()),
		}
	}

	/// Returns the parameter name for parameter segments.
	pub fn param_name(&self) -> Option<&str> {
		match self {
			Segment::Param(name) => Some(name),
			Segment::Literal(_) => None,
		}
	}
}

/// A compiled path pattern.
///
/// Holds the source string, its segments, the parameter names in order and
/// an anchored regex that accepts exactly the paths with the same segment
/// count whose literal segments agree.
#[derive(Debug, Clone)]
pub struct PathPattern {
	/// The original pattern string.
	pattern: String,
	/// Parsed segments.
	segments: Vec<Segment>,
	/// Parameter names in order.
	param_names: Vec<String>,
	/// Compiled matcher.
	regex: Regex,
}

impl PathPattern {
	/// Compiles a pattern, rejecting duplicate parameter names.
	///
	/// # Errors
	///
	/// Returns [`RouterError::DuplicateParameter`] if a parameter name appears
	/// more than once.
	pub fn new(pattern: &str) -> RouterResult<Self> {
		Self::with_policy(pattern, DuplicateParamPolicy::Reject)
	}

	/// Compiles a pattern with an explicit duplicate-parameter policy.
	///
	/// Under [`DuplicateParamPolicy::LastWins`] a repeated name binds the value
	/// of its last occurrence when extracting, and every occurrence receives
	/// the same value when building.
	///
	/// # Errors
	///
	/// Returns [`RouterError::PatternTooLong`] past [`MAX_PATTERN_LENGTH`]
	/// bytes, [`RouterError::TooManySegments`] past [`MAX_PATH_SEGMENTS`]
	/// segments and [`RouterError::InvalidPattern`] if the compiled regex
	/// exceeds its size limit.
	pub fn with_policy(pattern: &str, policy: DuplicateParamPolicy) -> RouterResult<Self> {
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(RouterError::PatternTooLong {
				length: pattern.len(),
				max: MAX_PATTERN_LENGTH,
			});
		}

		let segments: Vec<Segment> = pattern.split('/').map(Segment::parse).collect();
		if segments.len() > MAX_PATH_SEGMENTS {
			return Err(RouterError::TooManySegments {
				count: segments.len(),
				max: MAX_PATH_SEGMENTS,
			});
		}
		let param_names: Vec<String> = segments
			.iter()
			.filter_map(|s| s.param_name().map(str::to_string))
			.collect();

		if policy == DuplicateParamPolicy::Reject {
			let mut seen = HashSet::new();
			if let Some(name) = param_names.iter().find(|n| !seen.insert(n.as_str())) {
				return Err(RouterError::DuplicateParameter {
					pattern: pattern.to_string(),
					name: name.clone(),
				});
			}
		}

		let regex = RegexBuilder::new(&Self::compile_regex(&segments))
			.size_limit(MAX_REGEX_SIZE)
			.build()
			.map_err(|source| RouterError::InvalidPattern {
				pattern: pattern.to_string(),
				source,
			})?;

		tracing::trace!(pattern, params = ?param_names, "compiled route pattern");

		Ok(Self {
			pattern: pattern.to_string(),
			segments,
			param_names,
			regex,
		})
	}

	fn compile_regex(segments: &[Segment]) -> String {
		let body = segments
			.iter()
			.map(|segment| match segment {
				Segment::Param(_) => PARAM_CAPTURE.to_string(),
				Segment::Literal(text) => regex::escape(text),
			})
			.collect::<Vec<_>>()
			.join("/");

		format!("^{}$", body)
	}

	/// Returns the original pattern string.
	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	/// Returns the parameter names in pattern order.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns the parsed segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns the number of slash-delimited segments.
	pub fn segment_count(&self) -> usize {
		self.segments.len()
	}

	/// Returns whether this pattern has no parameters.
	pub fn is_exact(&self) -> bool {
		self.param_names.is_empty()
	}

	/// Checks if this pattern matches the given path.
	pub fn matches(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Matches a path, returning its parameters or `None` when it does not match.
	pub fn captures(&self, path: &str) -> Option<ParamMap> {
		let caps = self.regex.captures(path)?;
		Some(
			self.param_names
				.iter()
				.enumerate()
				.map(|(i, name)| {
					let value = caps.get(i + 1).map_or("", |m| m.as_str());
					(name.as_str(), value)
				})
				.collect(),
		)
	}

	/// Extracts parameters from a path.
	///
	/// Returns an empty map when the path does not match.
	pub fn extract(&self, path: &str) -> ParamMap {
		self.captures(path).unwrap_or_default()
	}

	/// Returns the raw parameter values in pattern order.
	///
	/// Returns an empty vector when the path does not match.
	pub fn extract_values(&self, path: &str) -> Vec<String> {
		self.regex
			.captures(path)
			.map(|caps| {
				caps.iter()
					.skip(1)
					.map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
					.collect()
			})
			.unwrap_or_default()
	}

	/// Generates a path from this pattern.
	///
	/// Entries of `params` that the pattern does not declare are ignored.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MissingParameter`] if a declared parameter has no
	/// value and [`RouterError::InvalidParameterValue`] if a value contains `/`.
	pub fn build(&self, params: &ParamMap) -> RouterResult<String> {
		let parts = self
			.segments
			.iter()
			.map(|segment| match segment {
				Segment::Literal(text) => Ok(text.as_str()),
				Segment::Param(name) => {
					let value = params
						.get(name)
						.ok_or_else(|| RouterError::MissingParameter(name.clone()))?;
					if value.contains('/') {
						return Err(RouterError::InvalidParameterValue {
							name: name.clone(),
							value: value.to_string(),
						});
					}
					Ok(value)
				}
			})
			.collect::<RouterResult<Vec<&str>>>()?;

		Ok(parts.join("/"))
	}

	/// Like [`build`](Self::build), but first requires the keys of `params`
	/// to be exactly the declared parameter names.
	pub fn build_strict(&self, params: &ParamMap) -> RouterResult<String> {
		self.validate_params(params)?;
		self.build(params)
	}

	/// Checks that `params` binds every declared name and nothing else.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MissingParameter`] for the first declared name
	/// without a value, otherwise [`RouterError::UnexpectedParameter`] for the
	/// first undeclared key.
	pub fn validate_params(&self, params: &ParamMap) -> RouterResult<()> {
		if let Some(missing) = self.param_names.iter().find(|n| !params.contains(n)) {
			return Err(RouterError::MissingParameter(missing.clone()));
		}
		if let Some(extra) = params
			.names()
			.find(|key| !self.param_names.iter().any(|n| n == key))
		{
			return Err(RouterError::UnexpectedParameter(extra.to_string()));
		}
		Ok(())
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for PathPattern {}

impl fmt::Display for PathPattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

/// Returns whether `path` matches `pattern`.
///
/// A pattern that fails to compile matches nothing.
pub fn match_path(pattern: &str, path: &str) -> bool {
	PathPattern::new(pattern)
		.map(|p| p.matches(path))
		.unwrap_or(false)
}

/// Extracts the parameters of `path` against `pattern`.
///
/// Returns an empty map on a mismatch or if the pattern fails to compile.
pub fn extract_params(pattern: &str, path: &str) -> ParamMap {
	PathPattern::new(pattern)
		.map(|p| p.extract(path))
		.unwrap_or_default()
}

/// Returns the parameter names declared by `pattern`, in order.
pub fn extract_param_names(pattern: &str) -> Vec<String> {
	pattern
		.split('/')
		.filter_map(|raw| raw.strip_prefix(PARAM_MARKER).map(str::to_string))
		.collect()
}

/// Returns the raw parameter values of `path` against `pattern`, in order.
pub fn extract_param_values(pattern: &str, path: &str) -> Vec<String> {
	PathPattern::new(pattern)
		.map(|p| p.extract_values(path))
		.unwrap_or_default()
}

/// Builds a concrete path from `pattern` and `params`.
pub fn build_path(pattern: &str, params: &ParamMap) -> RouterResult<String> {
	PathPattern::new(pattern)?.build(params)
}
