// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute path handling for PATCH operations.
//!
//! Paths are dot-separated, with two exceptions: dots inside a bracketed
//! array filter (`emails[value eq "a.b"]`) and dots inside a schema URN prefix
//! (`urn:ietf:params:scim:schemas:extension:enterprise:2.0:User`) never split.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};

/// Closes a schema URN prefix inside a path.
pub const URN_ANCHOR: &str = ":User";

static SEGMENT_FILTER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(.+?)\[(.+?)\]$").unwrap());
static FILTER_CONDITION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?i)^\s*(\S+)\s+eq\s+(.+)$").unwrap());

/// Rewrites the colon form `urn:...:User:attr` to the dotted form
/// `urn:...:User.attr`. Other paths are returned unchanged.
pub fn normalize_urn_path(path: &str) -> Cow<'_, str> {
	if !path.starts_with("urn:") {
		return Cow::Borrowed(path);
	}
	let anchor = format!("{URN_ANCHOR}:");
	// The rightmost anchor wins, and at least one character must sit between
	// `urn:` and the anchor.
	let split_at = (5..path.len()).rev().find(|&i| {
		path.is_char_boundary(i)
			&& path[i..].starts_with(&anchor)
			&& path[i + anchor.len()..]
				.chars()
				.next()
				.is_some_and(|c| c != '.' && c != '[')
	});
	match split_at {
		Some(i) => {
			let prefix_end = i + URN_ANCHOR.len();
			Cow::Owned(format!("{}.{}", &path[..prefix_end], &path[prefix_end + 1..]))
		}
		None => Cow::Borrowed(path),
	}
}

/// Splits a path into raw segments.
pub fn split_path(path: &str) -> Vec<String> {
	let mut segments = Vec::new();
	let mut current = String::new();
	let mut depth = 0usize;
	let mut urn_active = false;

	for (i, c) in path.char_indices() {
		if current.is_empty() && path[i..].starts_with("urn:") {
			urn_active = true;
		}

		match c {
			'[' => {
				depth += 1;
				current.push(c);
				continue;
			}
			']' => {
				depth = depth.saturating_sub(1);
				current.push(c);
				continue;
			}
			'.' if depth == 0 && !urn_active => {
				segments.push(std::mem::take(&mut current));
				continue;
			}
			_ => {}
		}

		current.push(c);
		if urn_active && current.ends_with(URN_ANCHOR) {
			urn_active = false;
		}
	}

	if !current.is_empty() {
		segments.push(current);
	}
	segments
}

/// Selects elements of a multi-valued attribute by sub-attribute equality.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayFilter {
	pub attribute: String,
	pub value: Value,
}

impl ArrayFilter {
	/// Strings compare case-insensitively; other values must be equal and of
	/// the same scalar type.
	pub fn matches(&self, item: &Value) -> bool {
		let Some(actual) = item.as_object().and_then(|map| map.get(&self.attribute)) else {
			return false;
		};
		match (actual, &self.value) {
			(Value::String(a), Value::String(b)) => a.to_lowercase() == b.to_lowercase(),
			(Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
			(Value::Bool(a), Value::Bool(b)) => a == b,
			_ => false,
		}
	}

	/// A fresh element carrying only the filtered sub-attribute.
	pub fn seed(&self) -> Value {
		let mut element = serde_json::Map::new();
		element.insert(self.attribute.clone(), self.value.clone());
		Value::Object(element)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
	pub raw: String,
	pub key: String,
	pub filter: Option<ArrayFilter>,
}

impl PathSegment {
	/// Parses `key` or `key[attr eq value]`. A bracket expression that is not
	/// an `eq` comparison is dropped and only the key is kept.
	pub fn parse(raw: &str) -> Self {
		let Some(caps) = SEGMENT_FILTER.captures(raw) else {
			return Self {
				raw: raw.to_string(),
				key: raw.to_string(),
				filter: None,
			};
		};
		let key = caps[1].to_string();
		let filter = FILTER_CONDITION
			.captures(&caps[2])
			.map(|cond| ArrayFilter {
				attribute: cond[1].to_string(),
				value: comparable_value(&cond[2]),
			});
		Self {
			raw: raw.to_string(),
			key,
			filter,
		}
	}
}

/// Normalizes an array-filter comparison value.
///
/// Surrounding quotes are stripped, `true`/`1` and `false`/`0` become booleans,
/// canonical numeric text becomes a number and everything else stays a string.
pub fn comparable_value(raw: &str) -> Value {
	let mut s = raw.trim();
	if s.len() >= 2
		&& ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
	{
		s = &s[1..s.len() - 1];
	}
	match s.to_ascii_lowercase().as_str() {
		"true" | "1" => return Value::Bool(true),
		"false" | "0" => return Value::Bool(false),
		_ => {}
	}
	canonical_number(s).unwrap_or_else(|| Value::String(s.to_string()))
}

fn canonical_number(s: &str) -> Option<Value> {
	let n: f64 = s.parse().ok()?;
	if !n.is_finite() {
		return None;
	}
	if n.fract() == 0.0 && n.abs() < 1e15 {
		let i = n as i64;
		return (i.to_string() == s).then(|| Value::from(i));
	}
	if n.to_string() != s {
		return None;
	}
	Number::from_f64(n).map(Value::Number)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::SCHEMA_ENTERPRISE_USER;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_split_plain() {
		assert_eq!(split_path("name.givenName"), vec!["name", "givenName"]);
		assert_eq!(split_path("title"), vec!["title"]);
	}

	#[test]
	fn test_split_keeps_filter_intact() {
		assert_eq!(
			split_path(r#"emails[value eq "a.b@x.com"].display"#),
			vec![r#"emails[value eq "a.b@x.com"]"#, "display"]
		);
	}

	#[test]
	fn test_split_keeps_urn_prefix_intact() {
		let path = format!("{SCHEMA_ENTERPRISE_USER}.employeeNumber");
		assert_eq!(
			split_path(&path),
			vec![SCHEMA_ENTERPRISE_USER.to_string(), "employeeNumber".to_string()]
		);
	}

	#[test]
	fn test_split_urn_with_nested_attribute() {
		let path = format!("{SCHEMA_ENTERPRISE_USER}.manager.value");
		assert_eq!(
			split_path(&path),
			vec![
				SCHEMA_ENTERPRISE_USER.to_string(),
				"manager".to_string(),
				"value".to_string()
			]
		);
	}

	#[test]
	fn test_normalize_colon_form() {
		let colon = format!("{SCHEMA_ENTERPRISE_USER}:manager");
		let dotted = format!("{SCHEMA_ENTERPRISE_USER}.manager");
		assert_eq!(normalize_urn_path(&colon), dotted);
		assert_eq!(normalize_urn_path(&dotted), dotted);
	}

	#[test]
	fn test_normalize_keeps_trailing_path() {
		let colon = format!("{SCHEMA_ENTERPRISE_USER}:manager.value");
		assert_eq!(
			normalize_urn_path(&colon),
			format!("{SCHEMA_ENTERPRISE_USER}.manager.value")
		);
	}

	#[test]
	fn test_normalize_ignores_non_urn() {
		assert!(matches!(normalize_urn_path("name.givenName"), Cow::Borrowed(_)));
		assert_eq!(normalize_urn_path("urn:x:User"), "urn:x:User");
	}

	#[test]
	fn test_parse_segment_without_filter() {
		let segment = PathSegment::parse("emails");
		assert_eq!(segment.key, "emails");
		assert!(segment.filter.is_none());
	}

	#[test]
	fn test_parse_segment_with_filter() {
		let segment = PathSegment::parse(r#"members[value eq "u1"]"#);
		assert_eq!(segment.key, "members");
		assert_eq!(
			segment.filter,
			Some(ArrayFilter {
				attribute: "value".to_string(),
				value: json!("u1"),
			})
		);
	}

	#[test]
	fn test_parse_segment_single_quotes_and_case() {
		let segment = PathSegment::parse("emails[type EQ 'work']");
		assert_eq!(segment.filter.unwrap().value, json!("work"));
	}

	#[test]
	fn test_parse_segment_unsupported_operator() {
		let segment = PathSegment::parse(r#"emails[type ne "work"]"#);
		assert_eq!(segment.key, "emails");
		assert!(segment.filter.is_none());
	}

	#[test]
	fn test_comparable_value() {
		assert_eq!(comparable_value(r#""abc""#), json!("abc"));
		assert_eq!(comparable_value("'abc'"), json!("abc"));
		assert_eq!(comparable_value(r#""true""#), json!(true));
		assert_eq!(comparable_value("1"), json!(true));
		assert_eq!(comparable_value("0"), json!(false));
		assert_eq!(comparable_value("42"), json!(42));
		assert_eq!(comparable_value("1.5"), json!(1.5));
		assert_eq!(comparable_value("007"), json!("007"));
		assert_eq!(comparable_value(" spaced "), json!("spaced"));
	}

	#[test]
	fn test_array_filter_matching() {
		let filter = ArrayFilter {
			attribute: "value".to_string(),
			value: json!("A@X.com"),
		};
		assert!(filter.matches(&json!({"value": "a@x.com"})));
		assert!(!filter.matches(&json!({"value": "b@x.com"})));
		assert!(!filter.matches(&json!("a@x.com")));
		assert!(!filter.matches(&json!({"display": "a@x.com"})));

		let numeric = ArrayFilter {
			attribute: "rank".to_string(),
			value: json!(2),
		};
		assert!(numeric.matches(&json!({"rank": 2.0})));
		assert!(!numeric.matches(&json!({"rank": "2"})));
	}

	#[test]
	fn test_seed() {
		let filter = ArrayFilter {
			attribute: "type".to_string(),
			value: json!("work"),
		};
		assert_eq!(filter.seed(), json!({"type": "work"}));
	}

	proptest! {
		/// The colon and dotted spellings of an extension attribute split identically.
		#[test]
		fn colon_and_dot_forms_agree(attr in "[a-zA-Z][a-zA-Z0-9]{0,16}") {
			let colon = format!("{SCHEMA_ENTERPRISE_USER}:{attr}");
			let dotted = format!("{SCHEMA_ENTERPRISE_USER}.{attr}");
			prop_assert_eq!(
				split_path(&normalize_urn_path(&colon)),
				split_path(&normalize_urn_path(&dotted))
			);
		}

		/// Splitting a dotted path of plain names yields the names back.
		#[test]
		fn plain_paths_split_on_dots(parts in prop::collection::vec("[a-zA-Z]{1,8}", 1..5)) {
			let path = parts.join(".");
			prop_assume!(!path.starts_with("urn"));
			prop_assert_eq!(split_path(&path), parts);
		}
	}
}
