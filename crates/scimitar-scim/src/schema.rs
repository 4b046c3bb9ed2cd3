// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::types::Meta;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaAttribute {
	pub name: String,
	#[serde(rename = "type")]
	pub attr_type: String,
	pub multi_valued: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub required: bool,
	pub case_exact: bool,
	pub mutability: String,
	pub returned: String,
	pub uniqueness: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub sub_attributes: Vec<SchemaAttribute>,
}

impl SchemaAttribute {
	/// A single-valued, case-insensitive, read-write string attribute.
	pub fn string(name: &str, description: &str) -> Self {
		Self {
			name: name.to_string(),
			attr_type: "string".to_string(),
			multi_valued: false,
			description: Some(description.to_string()),
			required: false,
			case_exact: false,
			mutability: "readWrite".to_string(),
			returned: "default".to_string(),
			uniqueness: "none".to_string(),
			sub_attributes: vec![],
		}
	}

	pub fn boolean(name: &str, description: &str) -> Self {
		Self {
			attr_type: "boolean".to_string(),
			..Self::string(name, description)
		}
	}

	pub fn reference(name: &str, description: &str) -> Self {
		Self {
			attr_type: "reference".to_string(),
			case_exact: true,
			..Self::string(name, description)
		}
	}

	pub fn complex(name: &str, description: &str, sub_attributes: Vec<SchemaAttribute>) -> Self {
		Self {
			attr_type: "complex".to_string(),
			sub_attributes,
			..Self::string(name, description)
		}
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn unique(mut self) -> Self {
		self.uniqueness = "server".to_string();
		self
	}

	pub fn multi_valued(mut self) -> Self {
		self.multi_valued = true;
		self
	}

	/// One of `readWrite`, `readOnly`, `writeOnly` or `immutable`.
	pub fn mutability(mut self, mutability: &str) -> Self {
		self.mutability = mutability.to_string();
		self
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
	pub schemas: Vec<String>,
	pub id: String,
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub attributes: Vec<SchemaAttribute>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub meta: Option<Meta>,
}
