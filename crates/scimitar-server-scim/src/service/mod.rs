// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Users and Groups provisioning over a [`DocumentStore`].
//!
//! Stored documents carry two bookkeeping members besides the resource
//! attributes: `_version`, the integer behind the weak ETag, and `meta` with
//! `created` and `lastModified` timestamps. Both are rebuilt on every write and
//! reshaped on every read; clients never write them directly.

mod bulk;
mod discovery;
mod groups;
mod resource;
mod search;
mod users;

pub use search::SearchTarget;

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use scimitar_scim::types::{SCHEMA_CORE_GROUP, SCHEMA_CORE_USER, SCHEMA_ENTERPRISE_USER};
use scimitar_scim::{normalize_roles_primary, Document};
use scimitar_server_config::ScimConfig;
use serde_json::{json, Value};

use crate::etag::weak_etag;
use crate::store::{DocumentStore, StoredDocument};

pub(crate) const VERSION_KEY: &str = "_version";

/// The provisioning service. Cheap to clone; clones share the store.
pub struct ScimService<S: DocumentStore> {
	store: Arc<S>,
	config: ScimConfig,
}

impl<S: DocumentStore> Clone for ScimService<S> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
			config: self.config.clone(),
		}
	}
}

impl<S: DocumentStore> ScimService<S> {
	pub fn new(store: Arc<S>, config: ScimConfig) -> Self {
		Self { store, config }
	}

	pub fn config(&self) -> &ScimConfig {
		&self.config
	}

	pub fn store(&self) -> &Arc<S> {
		&self.store
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
	User,
	Group,
}

impl ResourceKind {
	pub fn collection(&self) -> &'static str {
		match self {
			ResourceKind::User => "users",
			ResourceKind::Group => "groups",
		}
	}

	pub fn resource_type(&self) -> &'static str {
		match self {
			ResourceKind::User => "User",
			ResourceKind::Group => "Group",
		}
	}

	pub fn endpoint(&self) -> &'static str {
		match self {
			ResourceKind::User => "Users",
			ResourceKind::Group => "Groups",
		}
	}

	pub fn not_found(&self) -> String {
		format!("{} not found", self.resource_type())
	}

	/// The attribute that is both required and unique.
	pub fn unique_attribute(&self) -> &'static str {
		match self {
			ResourceKind::User => "userName",
			ResourceKind::Group => "displayName",
		}
	}

	/// Strips server-owned members from client input and recomputes `schemas`.
	pub(crate) fn sanitize(&self, input: &Value) -> Document {
		let mut doc = input.as_object().cloned().unwrap_or_default();
		for key in ["id", "meta", "schemas", VERSION_KEY] {
			doc.remove(key);
		}
		let schemas = self.schemas_for(input);
		doc.insert("schemas".to_string(), schemas);
		self.normalize(&mut doc);
		doc
	}

	pub(crate) fn normalize(&self, doc: &mut Document) {
		if *self == ResourceKind::User {
			normalize_roles_primary(doc);
		}
	}

	/// Users always carry the core schema and add the enterprise extension
	/// when the input lists it or carries its attributes. Groups are fixed.
	pub(crate) fn schemas_for(&self, source: &Value) -> Value {
		match self {
			ResourceKind::User => {
				let mut schemas = vec![SCHEMA_CORE_USER];
				if has_enterprise(source) {
					schemas.push(SCHEMA_ENTERPRISE_USER);
				}
				json!(schemas)
			}
			ResourceKind::Group => json!([SCHEMA_CORE_GROUP]),
		}
	}
}

fn has_enterprise(source: &Value) -> bool {
	let listed = source
		.get("schemas")
		.and_then(Value::as_array)
		.is_some_and(|schemas| schemas.iter().any(|s| s == SCHEMA_ENTERPRISE_USER));
	listed
		|| source
			.get(SCHEMA_ENTERPRISE_USER)
			.is_some_and(is_truthy)
}

/// A single resource as returned to a client, with its `Location` and `ETag`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceResponse {
	pub id: String,
	pub location: String,
	pub etag: String,
	pub resource: Value,
}

pub(crate) fn timestamp() -> String {
	Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn version_of(body: &Document) -> u64 {
	body.get(VERSION_KEY).and_then(Value::as_u64).unwrap_or(1)
}

pub(crate) fn created_of(body: &Document) -> Option<String> {
	body.get("meta")
		.and_then(|meta| meta.get("created"))
		.and_then(Value::as_str)
		.map(str::to_string)
}

/// Stamps the bookkeeping members onto a document about to be written.
pub(crate) fn stamp(doc: &mut Document, version: u64, created: &str, modified: &str) {
	doc.insert(VERSION_KEY.to_string(), json!(version));
	doc.insert(
		"meta".to_string(),
		json!({"created": created, "lastModified": modified}),
	);
}

/// Loose truthiness: empty strings, zero, `false` and `null` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

impl<S: DocumentStore> ScimService<S> {
	pub(crate) fn location(&self, kind: ResourceKind, id: &str) -> String {
		format!("{}/{}/{}", self.config.base_url, kind.endpoint(), id)
	}

	/// Shapes a stored document for output.
	pub(crate) fn present(&self, kind: ResourceKind, stored: StoredDocument) -> ResourceResponse {
		let StoredDocument { id, mut body } = stored;
		let version = version_of(&body);
		body.remove(VERSION_KEY);
		kind.normalize(&mut body);

		let now = timestamp();
		let meta = body.get("meta");
		let created = meta
			.and_then(|m| m.get("created"))
			.and_then(Value::as_str)
			.map_or_else(|| now.clone(), str::to_string);
		let last_modified = meta
			.and_then(|m| m.get("lastModified"))
			.and_then(Value::as_str)
			.map_or_else(|| now.clone(), str::to_string);

		let location = self.location(kind, &id);
		let etag = weak_etag(version);
		let schemas = kind.schemas_for(&Value::Object(body.clone()));

		body.insert("id".to_string(), json!(id));
		body.insert("schemas".to_string(), schemas);
		body.insert(
			"meta".to_string(),
			json!({
				"resourceType": kind.resource_type(),
				"created": created,
				"lastModified": last_modified,
				"version": etag,
				"location": location,
			}),
		);

		ResourceResponse {
			id,
			location,
			etag,
			resource: Value::Object(body),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::MemoryStore;

	fn service() -> ScimService<MemoryStore> {
		ScimService::new(Arc::new(MemoryStore::new()), ScimConfig::default())
	}

	#[test]
	fn test_sanitize_strips_server_members() {
		let input = json!({
			"id": "client-chosen",
			"meta": {"created": "yesterday"},
			"_version": 99,
			"schemas": ["bogus"],
			"userName": "alice"
		});
		let doc = ResourceKind::User.sanitize(&input);
		assert!(!doc.contains_key("id"));
		assert!(!doc.contains_key("meta"));
		assert!(!doc.contains_key(VERSION_KEY));
		assert_eq!(doc["schemas"], json!([SCHEMA_CORE_USER]));
		assert_eq!(doc["userName"], "alice");
	}

	#[test]
	fn test_enterprise_schema_detection() {
		let listed = json!({"schemas": [SCHEMA_CORE_USER, SCHEMA_ENTERPRISE_USER]});
		let keyed = json!({SCHEMA_ENTERPRISE_USER: {"employeeNumber": "7"}});
		let neither = json!({"userName": "bob"});
		let with_both = json!([SCHEMA_CORE_USER, SCHEMA_ENTERPRISE_USER]);
		assert_eq!(ResourceKind::User.schemas_for(&listed), with_both);
		assert_eq!(ResourceKind::User.schemas_for(&keyed), with_both);
		assert_eq!(ResourceKind::User.schemas_for(&neither), json!([SCHEMA_CORE_USER]));
		assert_eq!(ResourceKind::Group.schemas_for(&listed), json!([SCHEMA_CORE_GROUP]));
	}

	#[test]
	fn test_sanitize_normalizes_roles_for_users_only() {
		let input = json!({"roles": [
			{"value": "a", "primary": "true"},
			{"value": "b", "primary": true}
		]});
		let user = ResourceKind::User.sanitize(&input);
		assert_eq!(user["roles"][0]["primary"], true);
		assert_eq!(user["roles"][1]["primary"], false);

		let group = ResourceKind::Group.sanitize(&input);
		assert_eq!(group["roles"][0]["primary"], "true");
	}

	#[test]
	fn test_present_shapes_meta() {
		let svc = service();
		let mut body = ResourceKind::User.sanitize(&json!({"userName": "alice"}));
		stamp(&mut body, 3, "2025-01-01T00:00:00.000Z", "2025-01-02T00:00:00.000Z");
		let response = svc.present(
			ResourceKind::User,
			StoredDocument {
				id: "abc".to_string(),
				body,
			},
		);
		assert_eq!(response.etag, "W/\"3\"");
		assert_eq!(response.location, "http://localhost:3999/Users/abc");
		let resource = &response.resource;
		assert_eq!(resource["id"], "abc");
		assert!(resource.get(VERSION_KEY).is_none());
		assert_eq!(resource["meta"]["resourceType"], "User");
		assert_eq!(resource["meta"]["created"], "2025-01-01T00:00:00.000Z");
		assert_eq!(resource["meta"]["lastModified"], "2025-01-02T00:00:00.000Z");
		assert_eq!(resource["meta"]["version"], "W/\"3\"");
		assert_eq!(resource["meta"]["location"], "http://localhost:3999/Users/abc");
	}

	#[test]
	fn test_present_defaults_version_to_one() {
		let svc = service();
		let response = svc.present(
			ResourceKind::Group,
			StoredDocument {
				id: "g1".to_string(),
				body: Document::new(),
			},
		);
		assert_eq!(response.etag, "W/\"1\"");
		assert_eq!(response.resource["schemas"], json!([SCHEMA_CORE_GROUP]));
		assert!(response.resource["meta"]["created"].is_string());
	}

	#[test]
	fn test_is_truthy() {
		assert!(!is_truthy(&json!("")));
		assert!(!is_truthy(&json!(0)));
		assert!(!is_truthy(&json!(false)));
		assert!(!is_truthy(&Value::Null));
		assert!(is_truthy(&json!("x")));
		assert!(is_truthy(&json!(1)));
		assert!(is_truthy(&json!({})));
	}
}
