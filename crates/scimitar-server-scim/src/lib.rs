// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SCIM 2.0 provisioning service: Users, Groups, search, bulk and discovery
//! over a pluggable [`DocumentStore`]. Transport-agnostic; an HTTP layer maps
//! [`ScimApiError::status`] and the returned values onto responses.

pub mod error;
pub mod etag;
pub mod list;
pub mod service;
pub mod store;

pub use error::ScimApiError;
pub use etag::{check_if_match, etag_number_from, weak_etag};
pub use list::{ListParams, ListQuery};
pub use service::{ResourceKind, ResourceResponse, ScimService, SearchTarget};
pub use store::{
	DocumentStore, FindOptions, MemoryStore, ReplaceOutcome, SortOrder, SortSpec, StoreError,
	StoredDocument,
};
