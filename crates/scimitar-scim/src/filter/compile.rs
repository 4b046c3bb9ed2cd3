// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::{json, Map, Number, Value};
use tracing::trace;

use super::ast::{CompareOp, Filter, LogicalOp};
use super::parser::FilterParser;

/// A compiled filter, independent of any particular store.
///
/// Attribute paths are dot-separated. `Regex` patterns are always matched
/// case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
	All,
	Nothing,
	Exists { path: String },
	Equals { path: String, value: Value },
	Regex { path: String, pattern: String },
	And(Vec<Predicate>),
	Or(Vec<Predicate>),
}

/// Compiles a filter string. Absent or blank text matches every document.
pub fn compile_filter(filter: Option<&str>) -> Predicate {
	let Some(text) = filter else {
		return Predicate::All;
	};
	match FilterParser::parse(text) {
		Some(ast) => {
			let predicate = ast.compile();
			trace!(filter = %text, incomplete = ast.is_incomplete(), "compiled filter");
			predicate
		}
		None => Predicate::All,
	}
}

impl Filter {
	pub fn compile(&self) -> Predicate {
		match self {
			Filter::Present { attr_path } => Predicate::Exists {
				path: attr_path.clone(),
			},
			Filter::Compare {
				attr_path,
				op,
				value: Some(value),
			} => match op {
				CompareOp::Eq => Predicate::Equals {
					path: attr_path.clone(),
					value: normalize_value(value),
				},
				CompareOp::Co => Predicate::Regex {
					path: attr_path.clone(),
					pattern: escape_pattern(value),
				},
				CompareOp::Sw => Predicate::Regex {
					path: attr_path.clone(),
					pattern: format!("^{}", escape_pattern(value)),
				},
			},
			Filter::Compare { value: None, .. } | Filter::Missing => Predicate::Nothing,
			Filter::Logical { op, left, right } => {
				let children = vec![left.compile(), right.compile()];
				match op {
					LogicalOp::And => Predicate::And(children),
					LogicalOp::Or => Predicate::Or(children),
				}
			}
		}
	}
}

impl Predicate {
	/// Renders the predicate in document-store query syntax.
	pub fn to_query_document(&self) -> Value {
		match self {
			Predicate::All => Value::Object(Map::new()),
			Predicate::Nothing => json!({ "_id": { "$exists": false } }),
			Predicate::Exists { path } => field(path, json!({ "$exists": true })),
			Predicate::Equals { path, value } => field(path, value.clone()),
			Predicate::Regex { path, pattern } => {
				field(path, json!({ "$regex": pattern, "$options": "i" }))
			}
			Predicate::And(children) => json!({
				"$and": children.iter().map(Predicate::to_query_document).collect::<Vec<_>>()
			}),
			Predicate::Or(children) => json!({
				"$or": children.iter().map(Predicate::to_query_document).collect::<Vec<_>>()
			}),
		}
	}
}

fn field(path: &str, condition: Value) -> Value {
	let mut map = Map::new();
	map.insert(path.to_string(), condition);
	Value::Object(map)
}

/// `true`/`false` become booleans, numeric text becomes a number, anything
/// else stays a string.
pub fn normalize_value(raw: &str) -> Value {
	if raw.eq_ignore_ascii_case("true") {
		return Value::Bool(true);
	}
	if raw.eq_ignore_ascii_case("false") {
		return Value::Bool(false);
	}
	parse_number(raw.trim()).unwrap_or_else(|| Value::String(raw.to_string()))
}

fn parse_number(text: &str) -> Option<Value> {
	if text.is_empty() {
		return None;
	}
	// Rust accepts "inf" and "nan" spellings; those stay strings.
	let n: f64 = text.parse().ok().filter(|n: &f64| n.is_finite())?;
	if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
		return Some(Value::Number(Number::from(n as i64)));
	}
	Number::from_f64(n).map(Value::Number)
}

/// Escapes regex metacharacters so `value` matches literally.
pub fn escape_pattern(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		if matches!(
			c,
			'.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\'
		) {
			escaped.push('\\');
		}
		escaped.push(c);
	}
	escaped
}
