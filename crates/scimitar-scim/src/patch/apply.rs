// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::path::{normalize_urn_path, split_path, ArrayFilter, PathSegment};
use super::{Document, PatchOp, PatchOperation};
use crate::types::SCHEMA_ENTERPRISE_USER;

/// Applies operations in order. Operations whose targets cannot be resolved
/// leave the document as it was.
pub fn apply_patch(document: &mut Document, operations: &[PatchOperation]) {
	for operation in operations {
		apply_operation(document, operation);
	}
}

pub fn apply_operation(document: &mut Document, operation: &PatchOperation) {
	trace!(op = %operation.op, path = ?operation.path, "applying patch operation");

	let path = match operation.path.as_deref() {
		Some(path) if !path.is_empty() => path,
		_ => {
			apply_root(document, operation.op, operation.value.as_ref());
			return;
		}
	};

	let segments = parse_segments(path);
	if segments.is_empty() {
		debug!(path = %path, "patch path has no segments");
		return;
	}
	apply_at(document, &segments, None, operation.op, operation.value.as_ref());
}

fn parse_segments(path: &str) -> Vec<PathSegment> {
	split_path(&normalize_urn_path(path))
		.iter()
		.map(|raw| PathSegment::parse(raw))
		.collect()
}

fn apply_root(document: &mut Document, op: PatchOp, value: Option<&Value>) {
	let Some(Value::Object(fields)) = value else {
		debug!(op = %op, "root patch without an object value ignored");
		return;
	};

	match op {
		PatchOp::Remove => {
			for key in fields.keys() {
				document.remove(key);
			}
		}
		PatchOp::Add | PatchOp::Replace => {
			// Each key is itself a path, so extension attributes in colon
			// form land inside the extension object.
			for (key, field) in fields {
				let segments = parse_segments(key);
				if segments.is_empty() {
					document.insert(key.clone(), field.clone());
					continue;
				}
				apply_at(document, &segments, None, PatchOp::Replace, Some(field));
			}
		}
	}
}

fn apply_at(
	target: &mut Document,
	segments: &[PathSegment],
	parent: Option<&str>,
	op: PatchOp,
	value: Option<&Value>,
) {
	let Some((segment, rest)) = segments.split_first() else {
		return;
	};
	if rest.is_empty() {
		apply_final(target, segment, parent, op, value);
		return;
	}

	let next = match (&segment.filter, op) {
		(Some(filter), PatchOp::Remove) => match target.get_mut(&segment.key) {
			Some(Value::Array(items)) => items
				.iter_mut()
				.find(|item| filter.matches(item))
				.and_then(Value::as_object_mut),
			_ => None,
		},
		(Some(filter), _) => ensure_element(target, &segment.key, filter),
		(None, PatchOp::Remove) => target.get_mut(&segment.key).and_then(Value::as_object_mut),
		(None, _) => {
			let slot = target.entry(segment.key.clone()).or_insert(Value::Null);
			if slot.is_array() {
				debug!(segment = %segment.raw, "array segment without a filter, operation dropped");
				return;
			}
			if !slot.is_object() {
				*slot = Value::Object(Map::new());
			}
			slot.as_object_mut()
		}
	};

	match next {
		Some(next) => apply_at(next, rest, Some(segment.raw.as_str()), op, value),
		None => trace!(segment = %segment.raw, "patch target missing"),
	}
}

/// Finds the first element matching `filter` in the array under `key`,
/// appending a seeded element when none matches. A non-array value under
/// `key` is replaced by an empty array first.
fn ensure_element<'a>(
	target: &'a mut Document,
	key: &str,
	filter: &ArrayFilter,
) -> Option<&'a mut Document> {
	let slot = target
		.entry(key.to_string())
		.or_insert_with(|| Value::Array(Vec::new()));
	if !slot.is_array() {
		*slot = Value::Array(Vec::new());
	}
	let items = slot.as_array_mut()?;
	let index = match items.iter().position(|item| filter.matches(item)) {
		Some(index) => index,
		None => {
			items.push(filter.seed());
			items.len() - 1
		}
	};
	items[index].as_object_mut()
}

fn apply_final(
	target: &mut Document,
	segment: &PathSegment,
	parent: Option<&str>,
	op: PatchOp,
	value: Option<&Value>,
) {
	if op == PatchOp::Remove {
		remove_final(target, segment, value);
		return;
	}

	let Some(value) = value else {
		debug!(op = %op, segment = %segment.raw, "patch operation without a value ignored");
		return;
	};

	if let Some(filter) = &segment.filter {
		if let Some(element) = ensure_element(target, &segment.key, filter) {
			merge_into_element(element, value);
		}
		return;
	}

	if op == PatchOp::Add {
		match (target.get_mut(&segment.key), value) {
			(Some(Value::Array(items)), Value::Array(added)) => {
				items.extend(added.iter().cloned());
				return;
			}
			(Some(Value::Array(items)), added) => {
				items.push(added.clone());
				return;
			}
			(Some(Value::Object(_)), Value::Null) => return,
			(Some(Value::Object(existing)), Value::Object(fields)) => {
				for (key, field) in fields {
					existing.insert(key.clone(), field.clone());
				}
				return;
			}
			_ => {}
		}
	}

	target.insert(segment.key.clone(), coerce_complex(&segment.key, parent, value));
}

fn merge_into_element(element: &mut Document, value: &Value) {
	match value {
		Value::Object(fields) => {
			for (key, field) in fields {
				element.insert(key.clone(), field.clone());
			}
		}
		Value::Null => {}
		other => {
			element.insert("value".to_string(), other.clone());
		}
	}
}

/// `manager` under the enterprise extension is complex; a bare scalar becomes
/// its `value`.
fn coerce_complex(key: &str, parent: Option<&str>, value: &Value) -> Value {
	if key == "manager" && parent == Some(SCHEMA_ENTERPRISE_USER) && !value.is_object() {
		let mut manager = Map::new();
		manager.insert("value".to_string(), value.clone());
		return Value::Object(manager);
	}
	value.clone()
}

fn remove_final(target: &mut Document, segment: &PathSegment, value: Option<&Value>) {
	if let Some(filter) = &segment.filter {
		match target.get_mut(&segment.key) {
			Some(Value::Array(items)) => items.retain(|item| !filter.matches(item)),
			Some(_) => {
				target.remove(&segment.key);
			}
			None => {}
		}
		return;
	}

	match target.get_mut(&segment.key) {
		Some(Value::Array(items)) => {
			let removals: Vec<&Value> = match value {
				None | Some(Value::Null) => {
					trace!(segment = %segment.raw, "array remove without a value ignored");
					return;
				}
				Some(Value::Array(values)) => values.iter().collect(),
				Some(single) => vec![single],
			};
			items.retain(|item| !removals.iter().any(|removal| removal_matches(item, removal)));
		}
		Some(_) => {
			target.remove(&segment.key);
		}
		None => {}
	}
}

fn removal_matches(item: &Value, removal: &Value) -> bool {
	if item == removal {
		return true;
	}
	let wanted = match removal {
		Value::Object(map) => map.get("value").unwrap_or(removal),
		other => other,
	};
	match (loose_key(identity(item)), loose_key(wanted)) {
		(Some(left), Some(right)) => left == right,
		_ => false,
	}
}

fn identity(item: &Value) -> &Value {
	let Value::Object(map) = item else {
		return item;
	};
	["value", "id", "$ref"]
		.iter()
		.find_map(|key| map.get(*key))
		.unwrap_or(item)
}

fn loose_key(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}
