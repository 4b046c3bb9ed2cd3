// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use regex::RegexBuilder;
use serde_json::Value;

use super::compile::Predicate;

/// String comparison rules for equality predicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Collation {
	#[default]
	Simple,
	/// Case-insensitive comparison of strings.
	CaseInsensitive,
}

impl Predicate {
	/// Evaluates the predicate against a document.
	///
	/// A dot path that crosses an array fans out over its elements, and an
	/// array at the end of a path matches when any element does.
	pub fn matches(&self, document: &Value, collation: Collation) -> bool {
		match self {
			Predicate::All => true,
			Predicate::Nothing => false,
			Predicate::Exists { path } => !resolve_path(document, path).is_empty(),
			Predicate::Equals { path, value } => candidates(document, path)
				.into_iter()
				.any(|candidate| values_equal(candidate, value, collation)),
			Predicate::Regex { path, pattern } => {
				let Ok(re) = RegexBuilder::new(pattern).case_insensitive(true).build() else {
					return false;
				};
				candidates(document, path)
					.into_iter()
					.any(|candidate| candidate.as_str().is_some_and(|s| re.is_match(s)))
			}
			Predicate::And(children) => children.iter().all(|p| p.matches(document, collation)),
			Predicate::Or(children) => children.iter().any(|p| p.matches(document, collation)),
		}
	}
}

/// Every value reachable through `path`, including explicit nulls.
pub fn resolve_path<'a>(document: &'a Value, path: &str) -> Vec<&'a Value> {
	let mut current = vec![document];
	for segment in path.split('.') {
		let mut next = Vec::new();
		for value in current {
			match value {
				Value::Object(map) => next.extend(map.get(segment)),
				Value::Array(items) => next.extend(
					items
						.iter()
						.filter_map(|item| item.as_object().and_then(|map| map.get(segment))),
				),
				_ => {}
			}
		}
		current = next;
	}
	current
}

fn candidates<'a>(document: &'a Value, path: &str) -> Vec<&'a Value> {
	let mut out = Vec::new();
	for value in resolve_path(document, path) {
		out.push(value);
		if let Value::Array(items) = value {
			out.extend(items.iter());
		}
	}
	out
}

pub fn values_equal(left: &Value, right: &Value, collation: Collation) -> bool {
	match (left, right) {
		(Value::String(a), Value::String(b)) => match collation {
			Collation::Simple => a == b,
			Collation::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
		},
		(Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
		_ => left == right,
	}
}
