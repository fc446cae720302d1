//! Route parameters and typed extraction.
//!
//! A [`ParamMap`] binds each parameter name of a pattern to the raw string
//! captured from a concrete path, in the order the parameters appear in the
//! pattern. Values are never decoded or coerced; use [`ParamMap::parse`] or
//! [`ParamMap::extract`] to obtain typed values.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use indexmap::IndexMap;
use indexmap::map::Iter;

use crate::error::PathError;

/// Mapping from parameter name to raw string value.
///
/// Iteration follows pattern order. Equality compares entries only, so two
/// maps with the same bindings are equal regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
	entries: IndexMap<String, String>,
}

impl ParamMap {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds `name` to `value`, returning the previous value if any.
	///
	/// Re-binding a name keeps its original position.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.entries.insert(name.into(), value.into())
	}

	/// Builder form of [`insert`](Self::insert).
	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(name, value);
		self
	}

	/// Returns the raw value bound to `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries.get(name).map(String::as_str)
	}

	/// Returns whether `name` is bound.
	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Returns the number of bound parameters.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether no parameters are bound.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over `(name, value)` pairs in pattern order.
	pub fn iter(&self) -> Iter<'_, String, String> {
		self.entries.iter()
	}

	/// Iterates over parameter names in pattern order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Iterates over raw values in pattern order.
	pub fn values(&self) -> impl Iterator<Item = &str> {
		self.entries.values().map(String::as_str)
	}

	/// Returns the value at `index` in pattern order.
	pub fn value_at(&self, index: usize) -> Option<&str> {
		self.entries.get_index(index).map(|(_, v)| v.as_str())
	}

	/// Parses the value bound to `name`.
	///
	/// # Errors
	///
	/// Returns [`PathError::Missing`] if `name` is not bound and
	/// [`PathError::ParseError`] if the value does not parse as `T`.
	pub fn parse<T>(&self, name: &str) -> Result<T, PathError>
	where
		T: FromStr,
		T::Err: fmt::Display,
	{
		let (index, _, raw) = self
			.entries
			.get_full(name)
			.ok_or_else(|| PathError::Missing(name.to_string()))?;

		raw.parse::<T>().map_err(|e| PathError::ParseError {
			param_index: Some(index),
			param_type: std::any::type_name::<T>(),
			raw_value: raw.clone(),
			reason: e.to_string(),
		})
	}

	/// Extracts typed values by position.
	///
	/// ```
	/// use waypoint_router::ParamMap;
	///
	/// let params = ParamMap::new().with("user_id", "42").with("slug", "hello");
	/// let (user_id, slug): (u64, String) = params.extract().unwrap();
	/// assert_eq!(user_id, 42);
	/// assert_eq!(slug, "hello");
	/// ```
	pub fn extract<T: FromParams>(&self) -> Result<T, PathError> {
		T::from_params(self)
	}
}

impl<K, V> FromIterator<(K, V)> for ParamMap
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			entries: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

impl<K, V, const N: usize> From<[(K, V); N]> for ParamMap
where
	K: Into<String>,
	V: Into<String>,
{
	fn from(pairs: [(K, V); N]) -> Self {
		pairs.into_iter().collect()
	}
}

impl<'a> IntoIterator for &'a ParamMap {
	type Item = (&'a String, &'a String);
	type IntoIter = Iter<'a, String, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

/// Trait for extracting typed values from route parameters.
pub trait FromParams: Sized {
	/// Extracts `Self` from the parameter map.
	///
	/// # Errors
	///
	/// Returns [`PathError::CountMismatch`] if the number of parameters doesn't match.
	/// Returns [`PathError::ParseError`] if parameter parsing fails.
	fn from_params(params: &ParamMap) -> Result<Self, PathError>;
}

/// Typed parameter wrapper.
///
/// ```
/// use waypoint_router::{ParamMap, Path};
///
/// let params = ParamMap::new().with("id", "7");
/// let Path(id): Path<i64> = params.extract().unwrap();
/// assert_eq!(id, 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
	/// Unwraps the inner value.
	pub fn into_inner(self) -> T {
		self.0
	}
}

impl<T> Deref for Path<T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<T: FromParams> FromParams for Path<T> {
	fn from_params(params: &ParamMap) -> Result<Self, PathError> {
		T::from_params(params).map(Path)
	}
}

fn parse_at<T>(params: &ParamMap, index: usize) -> Result<T, PathError>
where
	T: FromStr,
	T::Err: fmt::Display,
{
	let raw = params.value_at(index).ok_or(PathError::CountMismatch {
		expected: index + 1,
		actual: params.len(),
	})?;

	raw.parse::<T>().map_err(|e| PathError::ParseError {
		param_index: Some(index),
		param_type: std::any::type_name::<T>(),
		raw_value: raw.to_string(),
		reason: e.to_string(),
	})
}

fn expect_count(params: &ParamMap, expected: usize) -> Result<(), PathError> {
	if params.len() != expected {
		return Err(PathError::CountMismatch {
			expected,
			actual: params.len(),
		});
	}
	Ok(())
}

macro_rules! impl_from_params_for_single {
	($($ty:ty),* $(,)?) => {
		$(
			impl FromParams for $ty {
				fn from_params(params: &ParamMap) -> Result<Self, PathError> {
					expect_count(params, 1)?;
					parse_at::<$ty>(params, 0)
				}
			}
		)*
	};
}

impl_from_params_for_single!(String, i32, i64, u32, u64, usize, bool);

macro_rules! impl_from_params_for_tuple {
	($count:expr; $($idx:tt => $ty:ident),+) => {
		impl<$($ty),+> FromParams for ($($ty,)+)
		where
			$($ty: FromStr,)+
			$(<$ty as FromStr>::Err: fmt::Display,)+
		{
			fn from_params(params: &ParamMap) -> Result<Self, PathError> {
				expect_count(params, $count)?;
				Ok(($(parse_at::<$ty>(params, $idx)?,)+))
			}
		}
	};
}

impl_from_params_for_tuple!(2; 0 => A, 1 => B);
impl_from_params_for_tuple!(3; 0 => A, 1 => B, 2 => C);
impl_from_params_for_tuple!(4; 0 => A, 1 => B, 2 => C, 3 => D);
impl_from_params_for_tuple!(5; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_from_params_for_tuple!(6; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
