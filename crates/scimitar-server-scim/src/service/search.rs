// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use scimitar_scim::{ListResponse, SearchRequest};
use scimitar_server_config::ScimConfig;
use serde_json::Value;
use tracing::debug;

use super::{ResourceKind, ScimService};
use crate::error::ScimApiError;
use crate::list::{parse_sort_order, ListParams};
use crate::store::DocumentStore;

/// Where a `.search` request was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
	/// `/.search`, which searches Users.
	Root,
	Users,
	Groups,
}

impl SearchTarget {
	pub fn kind(&self) -> ResourceKind {
		match self {
			SearchTarget::Root | SearchTarget::Users => ResourceKind::User,
			SearchTarget::Groups => ResourceKind::Group,
		}
	}
}

impl ListParams {
	pub fn from_search(request: &SearchRequest, config: &ScimConfig) -> Self {
		Self {
			start_index: request.start_index.unwrap_or(1).max(1),
			count: request
				.count
				.unwrap_or(config.default_count)
				.min(config.max_results),
			filter: request.filter.clone().filter(|f| !f.trim().is_empty()),
			sort_by: request.sort_by.clone().filter(|s| !s.trim().is_empty()),
			sort_order: parse_sort_order(request.sort_order.as_deref()),
		}
	}
}

impl<S: DocumentStore> ScimService<S> {
	pub async fn search(
		&self,
		target: SearchTarget,
		request: &SearchRequest,
	) -> Result<ListResponse<Value>, ScimApiError> {
		let params = ListParams::from_search(request, &self.config);
		debug!(?target, filter = ?params.filter, "SCIM: search");
		self.list_resources(target.kind(), &params).await
	}
}
