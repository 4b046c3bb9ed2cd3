// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `/Users`. Input keeps whatever attributes the client sends; only `userName`
//! is enforced, and `roles` is held to a single primary entry.

use scimitar_scim::ListResponse;
use serde_json::Value;
use tracing::info;

use super::{ResourceKind, ResourceResponse, ScimService};
use crate::error::ScimApiError;
use crate::list::ListParams;
use crate::store::DocumentStore;

impl<S: DocumentStore> ScimService<S> {
	pub async fn list_users(
		&self,
		params: &ListParams,
	) -> Result<ListResponse<Value>, ScimApiError> {
		self.list_resources(ResourceKind::User, params).await
	}

	pub async fn get_user(&self, id: &str) -> Result<ResourceResponse, ScimApiError> {
		self.get_resource(ResourceKind::User, id).await
	}

	pub async fn create_user(&self, body: &Value) -> Result<ResourceResponse, ScimApiError> {
		let created = self.create_resource(ResourceKind::User, body).await?;
		info!(user_id = %created.id, "SCIM: created user");
		Ok(created)
	}

	pub async fn replace_user(
		&self,
		id: &str,
		body: &Value,
		if_match: Option<&str>,
	) -> Result<ResourceResponse, ScimApiError> {
		let replaced = self
			.replace_resource(ResourceKind::User, id, body, if_match)
			.await?;
		info!(user_id = %replaced.id, version = %replaced.etag, "SCIM: replaced user");
		Ok(replaced)
	}

	/// Applies a PatchOp body. The body is validated before the user is looked
	/// up, so a malformed request is a 400 even for an unknown id.
	pub async fn patch_user(
		&self,
		id: &str,
		body: &Value,
		if_match: Option<&str>,
	) -> Result<ResourceResponse, ScimApiError> {
		let patched = self
			.patch_resource(ResourceKind::User, id, body, if_match)
			.await?;
		info!(user_id = %patched.id, version = %patched.etag, "SCIM: patched user");
		Ok(patched)
	}

	pub async fn delete_user(&self, id: &str) -> Result<(), ScimApiError> {
		self.delete_resource(ResourceKind::User, id).await?;
		info!(user_id = %id, "SCIM: deleted user");
		Ok(())
	}
}
