// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_CORE_USER: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const SCHEMA_ENTERPRISE_USER: &str =
	"urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";
pub const SCHEMA_CORE_GROUP: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
pub const SCHEMA_SERVICE_PROVIDER_CONFIG: &str =
	"urn:ietf:params:scim:schemas:core:2.0:ServiceProviderConfig";
pub const SCHEMA_RESOURCE_TYPE: &str = "urn:ietf:params:scim:schemas:core:2.0:ResourceType";
pub const SCHEMA_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Schema";
pub const SCHEMA_LIST_RESPONSE: &str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";
pub const SCHEMA_SEARCH_REQUEST: &str = "urn:ietf:params:scim:api:messages:2.0:SearchRequest";
pub const SCHEMA_PATCH_OP: &str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";
pub const SCHEMA_BULK_REQUEST: &str = "urn:ietf:params:scim:api:messages:2.0:BulkRequest";
pub const SCHEMA_BULK_RESPONSE: &str = "urn:ietf:params:scim:api:messages:2.0:BulkResponse";
pub const SCHEMA_ERROR: &str = "urn:ietf:params:scim:api:messages:2.0:Error";

pub const SCIM_CONTENT_TYPE: &str = "application/scim+json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
	pub resource_type: String,
	pub created: DateTime<Utc>,
	pub last_modified: DateTime<Utc>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
	pub schemas: Vec<String>,
	pub total_results: u64,
	pub items_per_page: u64,
	pub start_index: u64,
	#[serde(rename = "Resources")]
	pub resources: Vec<T>,
}

impl<T> ListResponse<T> {
	pub fn new(resources: Vec<T>, total_results: u64, start_index: u64, items_per_page: u64) -> Self {
		Self {
			schemas: vec![SCHEMA_LIST_RESPONSE.to_string()],
			total_results,
			items_per_page,
			start_index,
			resources,
		}
	}
}

/// Body of a `POST .search` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	#[serde(default)]
	pub schemas: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filter: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub start_index: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub count: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sort_by: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
	#[serde(default)]
	pub schemas: Vec<String>,
	#[serde(rename = "Operations")]
	pub operations: Vec<BulkOperation>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fail_on_errors: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperation {
	pub method: String,
	#[serde(default)]
	pub path: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bulk_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponse {
	pub schemas: Vec<String>,
	#[serde(rename = "Operations")]
	pub operations: Vec<BulkOperationResponse>,
}

impl BulkResponse {
	pub fn new(operations: Vec<BulkOperationResponse>) -> Self {
		Self {
			schemas: vec![SCHEMA_BULK_RESPONSE.to_string()],
			operations,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationResponse {
	pub method: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bulk_id: Option<String>,
	pub status: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationScheme {
	#[serde(rename = "type")]
	pub scheme_type: String,
	pub name: String,
	pub description: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub spec_uri: Option<String>,
	pub primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supported {
	pub supported: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSupported {
	pub supported: bool,
	pub max_operations: u32,
	pub max_payload_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSupported {
	pub supported: bool,
	pub max_results: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderConfig {
	pub schemas: Vec<String>,
	pub patch: Supported,
	pub bulk: BulkSupported,
	pub filter: FilterSupported,
	pub change_password: Supported,
	pub sort: Supported,
	pub etag: Supported,
	pub authentication_schemes: Vec<AuthenticationScheme>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaExtension {
	pub schema: String,
	pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceType {
	pub schemas: Vec<String>,
	pub id: String,
	pub name: String,
	pub description: String,
	pub endpoint: String,
	pub schema: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub schema_extensions: Vec<SchemaExtension>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub meta: Option<Meta>,
}
