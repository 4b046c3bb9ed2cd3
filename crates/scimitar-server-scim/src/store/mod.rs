// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The document store the provisioning service persists resources in.
//!
//! Queries are compiled [`Predicate`]s; a store either evaluates them itself
//! or renders them with [`Predicate::to_query_document`].

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use scimitar_scim::{Collation, Document, Predicate};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
	#[error("unsupported store uri: {0}")]
	UnsupportedUri(String),

	/// Failures reported by out-of-tree stores backed by a real database.
	#[error("store backend error: {0}")]
	Backend(String),
}

/// A persisted document and its store-assigned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
	pub id: String,
	pub body: Document,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
	#[default]
	Ascending,
	Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
	pub path: String,
	pub order: SortOrder,
}

/// Outcome of [`DocumentStore::replace_unless`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
	Replaced,
	NotFound,
	Conflict,
}

#[derive(Debug, Clone, Default)]
pub struct FindOptions {
	pub skip: usize,
	pub limit: Option<usize>,
	pub sort: Option<SortSpec>,
	pub collation: Collation,
}

/// Uniqueness holds only through [`insert_unless`](Self::insert_unless) and
/// [`replace_unless`](Self::replace_unless), which check the guard and write
/// in one step. A `find` followed by `insert` can race.
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Inserts a document and returns its new identifier.
	async fn insert(&self, collection: &str, body: Document) -> Result<String, StoreError>;

	/// Inserts unless some document already matches `guard`. Returns `None`
	/// on a conflict.
	async fn insert_unless(
		&self,
		collection: &str,
		body: Document,
		guard: &Predicate,
		collation: Collation,
	) -> Result<Option<String>, StoreError>;

	/// Unknown and malformed identifiers both yield `None`.
	async fn find_by_id(
		&self,
		collection: &str,
		id: &str,
	) -> Result<Option<StoredDocument>, StoreError>;

	async fn find_one(
		&self,
		collection: &str,
		query: &Predicate,
		collation: Collation,
	) -> Result<Option<StoredDocument>, StoreError>;

	async fn find(
		&self,
		collection: &str,
		query: &Predicate,
		options: &FindOptions,
	) -> Result<Vec<StoredDocument>, StoreError>;

	async fn count(
		&self,
		collection: &str,
		query: &Predicate,
		collation: Collation,
	) -> Result<u64, StoreError>;

	/// Replaces the whole document. Returns `false` when `id` is unknown.
	async fn replace(&self, collection: &str, id: &str, body: Document)
		-> Result<bool, StoreError>;

	/// Replaces `id` unless a different document matches `guard`.
	async fn replace_unless(
		&self,
		collection: &str,
		id: &str,
		body: Document,
		guard: &Predicate,
		collation: Collation,
	) -> Result<ReplaceOutcome, StoreError>;

	/// Returns `false` when `id` is unknown.
	async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;
}
