// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! At most one element of a multi-valued attribute may be primary.

use serde_json::Value;

use crate::patch::Document;

/// Reads a `primary` flag. Unrecognized values yield `None`.
pub fn coerce_primary(value: &Value) -> Option<bool> {
	match value {
		Value::Bool(b) => Some(*b),
		Value::Number(n) => n.as_f64().map(|n| n != 0.0),
		Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
			"true" | "1" => Some(true),
			"false" | "0" => Some(false),
			_ => None,
		},
		_ => None,
	}
}

/// Coerces every `primary` flag under `attribute` and demotes all but the
/// first `true`. Flags that cannot be read are removed.
pub fn normalize_primary(document: &mut Document, attribute: &str) {
	let Some(Value::Array(items)) = document.get_mut(attribute) else {
		return;
	};

	let mut seen_primary = false;
	for item in items.iter_mut() {
		let Some(element) = item.as_object_mut() else {
			continue;
		};
		let Some(raw) = element.get("primary") else {
			continue;
		};
		match coerce_primary(raw) {
			Some(true) if seen_primary => {
				element.insert("primary".to_string(), Value::Bool(false));
			}
			Some(flag) => {
				seen_primary |= flag;
				element.insert("primary".to_string(), Value::Bool(flag));
			}
			None => {
				element.remove("primary");
			}
		}
	}
}

pub fn normalize_roles_primary(document: &mut Document) {
	normalize_primary(document, "roles");
}
