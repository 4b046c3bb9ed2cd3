// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;

use scimitar_scim::{BulkOperation, BulkOperationResponse, BulkRequest, BulkResponse, ScimError};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{ResourceKind, ResourceResponse, ScimService};
use crate::error::ScimApiError;
use crate::store::DocumentStore;

const BULK_ID_PREFIX: &str = "bulkId:";

#[derive(Debug, PartialEq)]
pub(crate) enum ResourcePath {
	Users,
	UsersId(String),
	Groups,
	GroupsId(String),
}

impl ResourcePath {
	fn kind(&self) -> ResourceKind {
		match self {
			ResourcePath::Users | ResourcePath::UsersId(_) => ResourceKind::User,
			ResourcePath::Groups | ResourcePath::GroupsId(_) => ResourceKind::Group,
		}
	}
}

pub(crate) fn parse_path(path: &str) -> Option<ResourcePath> {
	let path = path.trim_start_matches('/');

	if path == "Users" {
		return Some(ResourcePath::Users);
	}
	if path == "Groups" {
		return Some(ResourcePath::Groups);
	}
	if let Some(id) = path.strip_prefix("Users/").filter(|id| !id.is_empty()) {
		return Some(ResourcePath::UsersId(id.to_string()));
	}
	if let Some(id) = path.strip_prefix("Groups/").filter(|id| !id.is_empty()) {
		return Some(ResourcePath::GroupsId(id.to_string()));
	}
	None
}

/// Replaces every `bulkId:<id>` string with the resource id created earlier
/// in the same request. Unknown references are left untouched.
pub(crate) fn resolve_bulk_id_refs(value: &mut Value, bulk_id_map: &HashMap<String, String>) {
	match value {
		Value::String(s) => {
			if let Some(resolved) = resolve_bulk_id(s, bulk_id_map) {
				*s = resolved;
			}
		}
		Value::Array(arr) => {
			for item in arr {
				resolve_bulk_id_refs(item, bulk_id_map);
			}
		}
		Value::Object(map) => {
			for (_, v) in map {
				resolve_bulk_id_refs(v, bulk_id_map);
			}
		}
		_ => {}
	}
}

fn resolve_bulk_id(s: &str, bulk_id_map: &HashMap<String, String>) -> Option<String> {
	s.strip_prefix(BULK_ID_PREFIX)
		.and_then(|bulk_id| bulk_id_map.get(bulk_id))
		.cloned()
}

type OperationOutcome = (String, Option<String>, Option<Value>);

impl<S: DocumentStore> ScimService<S> {
	/// Runs a `/Bulk` request in order.
	///
	/// With `failOnErrors = n`, every operation after the n-th failure is
	/// skipped with status 412.
	pub async fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse, ScimApiError> {
		let max_operations = self.config.bulk_max_operations as usize;
		if request.operations.len() > max_operations {
			warn!(
				operations = request.operations.len(),
				max_operations, "SCIM: bulk request rejected"
			);
			return Err(ScimApiError::Scim(ScimError::TooMany));
		}

		let fail_on_errors = request.fail_on_errors.unwrap_or(0);
		let mut responses = Vec::with_capacity(request.operations.len());
		let mut error_count = 0;
		let mut bulk_id_map: HashMap<String, String> = HashMap::new();

		for op in &request.operations {
			if fail_on_errors > 0 && error_count >= fail_on_errors {
				responses.push(BulkOperationResponse {
					method: op.method.clone(),
					bulk_id: op.bulk_id.clone(),
					status: "412".to_string(),
					location: None,
					response: Some(json!({
						"detail": "Operation skipped due to previous errors"
					})),
				});
				continue;
			}

			match self.process_operation(op, &bulk_id_map).await {
				Ok((status, location, response)) => {
					if let (Some(bulk_id), Some(loc)) = (&op.bulk_id, &location) {
						if let Some(id) = loc.rsplit('/').next() {
							bulk_id_map.insert(bulk_id.clone(), id.to_string());
						}
					}
					responses.push(BulkOperationResponse {
						method: op.method.clone(),
						bulk_id: op.bulk_id.clone(),
						status,
						location,
						response,
					});
				}
				Err(e) => {
					error_count += 1;
					responses.push(BulkOperationResponse {
						method: op.method.clone(),
						bulk_id: op.bulk_id.clone(),
						status: e.status().as_u16().to_string(),
						location: None,
						response: serde_json::to_value(e.to_response()).ok(),
					});
				}
			}
		}

		let success_count = responses
			.iter()
			.filter(|r| r.status.starts_with('2'))
			.count();
		info!(
			total_operations = responses.len(),
			success_count, error_count, "SCIM: bulk operation completed"
		);

		Ok(BulkResponse::new(responses))
	}

	async fn process_operation(
		&self,
		op: &BulkOperation,
		bulk_id_map: &HashMap<String, String>,
	) -> Result<OperationOutcome, ScimApiError> {
		let resource_path = parse_path(&op.path)
			.ok_or_else(|| ScimApiError::BadRequest(format!("Invalid path: {}", op.path)))?;

		let mut data = op.data.clone();
		if let Some(d) = data.as_mut() {
			resolve_bulk_id_refs(d, bulk_id_map);
		}

		let kind = resource_path.kind();
		match (op.method.to_uppercase().as_str(), resource_path) {
			("POST", ResourcePath::Users | ResourcePath::Groups) => {
				let created = self.create_resource(kind, &require_data(data)?).await?;
				Ok(with_resource("201", created))
			}
			("PUT", ResourcePath::UsersId(id) | ResourcePath::GroupsId(id)) => {
				let id = resolve_bulk_id(&id, bulk_id_map).unwrap_or(id);
				let replaced = self
					.replace_resource(kind, &id, &require_data(data)?, None)
					.await?;
				Ok(with_resource("200", replaced))
			}
			("PATCH", ResourcePath::UsersId(id) | ResourcePath::GroupsId(id)) => {
				let id = resolve_bulk_id(&id, bulk_id_map).unwrap_or(id);
				let patched = self
					.patch_resource(kind, &id, &require_data(data)?, None)
					.await?;
				Ok(with_resource("200", patched))
			}
			("DELETE", ResourcePath::UsersId(id) | ResourcePath::GroupsId(id)) => {
				let id = resolve_bulk_id(&id, bulk_id_map).unwrap_or(id);
				self.delete_resource(kind, &id).await?;
				Ok(("204".to_string(), None, None))
			}
			_ => Err(ScimApiError::BadRequest(format!(
				"Unsupported operation: {} {}",
				op.method, op.path
			))),
		}
	}
}

fn require_data(data: Option<Value>) -> Result<Value, ScimApiError> {
	data.ok_or_else(|| ScimApiError::BadRequest("Missing data".to_string()))
}

fn with_resource(status: &str, response: ResourceResponse) -> OperationOutcome {
	(
		status.to_string(),
		Some(response.location),
		Some(response.resource),
	)
}
