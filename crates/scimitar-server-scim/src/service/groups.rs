// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use scimitar_scim::ListResponse;
use serde_json::Value;
use tracing::info;

use super::{ResourceKind, ResourceResponse, ScimService};
use crate::error::ScimApiError;
use crate::list::ListParams;
use crate::store::DocumentStore;

impl<S: DocumentStore> ScimService<S> {
	pub async fn list_groups(
		&self,
		params: &ListParams,
	) -> Result<ListResponse<Value>, ScimApiError> {
		self.list_resources(ResourceKind::Group, params).await
	}

	pub async fn get_group(&self, id: &str) -> Result<ResourceResponse, ScimApiError> {
		self.get_resource(ResourceKind::Group, id).await
	}

	/// `members` is stored as sent; member references are not resolved.
	pub async fn create_group(&self, body: &Value) -> Result<ResourceResponse, ScimApiError> {
		let created = self.create_resource(ResourceKind::Group, body).await?;
		info!(group_id = %created.id, "SCIM: created group");
		Ok(created)
	}

	pub async fn replace_group(
		&self,
		id: &str,
		body: &Value,
		if_match: Option<&str>,
	) -> Result<ResourceResponse, ScimApiError> {
		let replaced = self
			.replace_resource(ResourceKind::Group, id, body, if_match)
			.await?;
		info!(group_id = %replaced.id, version = %replaced.etag, "SCIM: replaced group");
		Ok(replaced)
	}

	pub async fn patch_group(
		&self,
		id: &str,
		body: &Value,
		if_match: Option<&str>,
	) -> Result<ResourceResponse, ScimApiError> {
		let patched = self
			.patch_resource(ResourceKind::Group, id, body, if_match)
			.await?;
		info!(group_id = %patched.id, version = %patched.etag, "SCIM: patched group");
		Ok(patched)
	}

	pub async fn delete_group(&self, id: &str) -> Result<(), ScimApiError> {
		self.delete_resource(ResourceKind::Group, id).await?;
		info!(group_id = %id, "SCIM: deleted group");
		Ok(())
	}
}
