// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SCIM PATCH operations applied to schema-less resource documents.

pub mod apply;
pub mod path;

pub use apply::{apply_operation, apply_patch};
pub use path::{normalize_urn_path, split_path, ArrayFilter, PathSegment};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ScimError;
use crate::types::SCHEMA_PATCH_OP;

/// A resource document: a JSON object owned by the caller.
pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PatchOp {
	Add,
	Remove,
	Replace,
}

impl FromStr for PatchOp {
	type Err = ScimError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"add" => Ok(PatchOp::Add),
			"remove" => Ok(PatchOp::Remove),
			"replace" => Ok(PatchOp::Replace),
			other => Err(ScimError::InvalidSyntax(format!(
				"unsupported patch op '{other}'"
			))),
		}
	}
}

impl TryFrom<String> for PatchOp {
	type Error = ScimError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl fmt::Display for PatchOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			PatchOp::Add => "add",
			PatchOp::Remove => "remove",
			PatchOp::Replace => "replace",
		};
		f.write_str(s)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchOperation {
	pub op: PatchOp,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	/// `None` only when the key is missing; an explicit `null` is `Some(Value::Null)`.
	#[serde(
		default,
		deserialize_with = "present_value",
		skip_serializing_if = "Option::is_none"
	)]
	pub value: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
	D: Deserializer<'de>,
{
	Value::deserialize(deserializer).map(Some)
}

impl PatchOperation {
	pub fn new(op: PatchOp, path: Option<&str>, value: Option<Value>) -> Self {
		Self {
			op,
			path: path.map(str::to_string),
			value,
		}
	}

	/// An absent or empty path addresses the document root.
	pub fn targets_root(&self) -> bool {
		self.path.as_deref().map_or(true, str::is_empty)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
	#[serde(default)]
	pub schemas: Vec<String>,
	#[serde(rename = "Operations")]
	pub operations: Vec<PatchOperation>,
}

impl PatchRequest {
	pub fn new(operations: Vec<PatchOperation>) -> Self {
		Self {
			schemas: vec![SCHEMA_PATCH_OP.to_string()],
			operations,
		}
	}

	/// Reads a PatchOp request body.
	///
	/// This is the only structural check in the patch path: `Operations` must
	/// be an array of well-formed operations. Everything past this point
	/// degrades silently.
	pub fn from_value(body: &Value) -> Result<Self, ScimError> {
		let Some(operations) = body.get("Operations").and_then(Value::as_array) else {
			return Err(ScimError::InvalidSyntax("Invalid PatchOp".to_string()));
		};
		let operations = operations
			.iter()
			.map(|op| {
				PatchOperation::deserialize(op)
					.map_err(|e| ScimError::InvalidSyntax(format!("Invalid PatchOp: {e}")))
			})
			.collect::<Result<Vec<_>, _>>()?;
		let schemas = body
			.get("schemas")
			.and_then(Value::as_array)
			.map(|schemas| {
				schemas
					.iter()
					.filter_map(Value::as_str)
					.map(str::to_string)
					.collect()
			})
			.unwrap_or_default();
		Ok(Self {
			schemas,
			operations,
		})
	}
}
