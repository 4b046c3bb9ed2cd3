// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use scimitar_scim::filter::eval::resolve_path;
use scimitar_scim::{Collation, Document, Predicate};
use scimitar_server_config::StoreConfig;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, trace};
use uuid::Uuid;

use super::{
	DocumentStore, FindOptions, ReplaceOutcome, SortOrder, SortSpec, StoreError, StoredDocument,
};

const MEMORY_SCHEME: &str = "memory://";

struct Entry {
	id: Uuid,
	body: Value,
}

impl Entry {
	fn to_stored(&self) -> StoredDocument {
		StoredDocument {
			id: self.id.to_string(),
			body: self.body.as_object().cloned().unwrap_or_default(),
		}
	}
}

/// An in-process [`DocumentStore`] keeping each collection in insertion order.
pub struct MemoryStore {
	database: String,
	collections: RwLock<HashMap<String, Vec<Entry>>>,
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::with_database(StoreConfig::default().database)
	}
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds the store named by `store.uri`. Only `memory://` is served
	/// in-process.
	pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
		if !config.uri.starts_with(MEMORY_SCHEME) {
			return Err(StoreError::UnsupportedUri(config.uri.clone()));
		}
		debug!(database = %config.database, "opened in-memory document store");
		Ok(Self::with_database(config.database.clone()))
	}

	fn with_database(database: String) -> Self {
		Self {
			database,
			collections: RwLock::new(HashMap::new()),
		}
	}

	pub fn database(&self) -> &str {
		&self.database
	}
}

#[async_trait]
impl DocumentStore for MemoryStore {
	async fn insert(&self, collection: &str, body: Document) -> Result<String, StoreError> {
		let id = Uuid::new_v4();
		let mut collections = self.collections.write().await;
		collections
			.entry(collection.to_string())
			.or_default()
			.push(Entry {
				id,
				body: Value::Object(body),
			});
		debug!(database = %self.database, collection, id = %id, "inserted document");
		Ok(id.to_string())
	}

	async fn insert_unless(
		&self,
		collection: &str,
		body: Document,
		guard: &Predicate,
		collation: Collation,
	) -> Result<Option<String>, StoreError> {
		let mut collections = self.collections.write().await;
		let entries = collections.entry(collection.to_string()).or_default();
		if entries.iter().any(|e| guard.matches(&e.body, collation)) {
			debug!(collection, "insert rejected by guard");
			return Ok(None);
		}
		let id = Uuid::new_v4();
		entries.push(Entry {
			id,
			body: Value::Object(body),
		});
		debug!(database = %self.database, collection, id = %id, "inserted document");
		Ok(Some(id.to_string()))
	}

	async fn find_by_id(
		&self,
		collection: &str,
		id: &str,
	) -> Result<Option<StoredDocument>, StoreError> {
		let Ok(id) = Uuid::parse_str(id) else {
			trace!(collection, id, "malformed document id");
			return Ok(None);
		};
		let collections = self.collections.read().await;
		Ok(collections
			.get(collection)
			.and_then(|entries| entries.iter().find(|e| e.id == id))
			.map(Entry::to_stored))
	}

	async fn find_one(
		&self,
		collection: &str,
		query: &Predicate,
		collation: Collation,
	) -> Result<Option<StoredDocument>, StoreError> {
		let collections = self.collections.read().await;
		Ok(collections
			.get(collection)
			.and_then(|entries| entries.iter().find(|e| query.matches(&e.body, collation)))
			.map(Entry::to_stored))
	}

	async fn find(
		&self,
		collection: &str,
		query: &Predicate,
		options: &FindOptions,
	) -> Result<Vec<StoredDocument>, StoreError> {
		let collections = self.collections.read().await;
		let Some(entries) = collections.get(collection) else {
			return Ok(Vec::new());
		};

		let mut matched: Vec<&Entry> = entries
			.iter()
			.filter(|e| query.matches(&e.body, options.collation))
			.collect();

		if let Some(sort) = &options.sort {
			matched.sort_by(|a, b| compare_for_sort(&a.body, &b.body, sort, options.collation));
		}

		let limit = options.limit.unwrap_or(usize::MAX);
		Ok(matched
			.into_iter()
			.skip(options.skip)
			.take(limit)
			.map(Entry::to_stored)
			.collect())
	}

	async fn count(
		&self,
		collection: &str,
		query: &Predicate,
		collation: Collation,
	) -> Result<u64, StoreError> {
		let collections = self.collections.read().await;
		Ok(collections
			.get(collection)
			.map(|entries| {
				entries
					.iter()
					.filter(|e| query.matches(&e.body, collation))
					.count() as u64
			})
			.unwrap_or(0))
	}

	async fn replace(
		&self,
		collection: &str,
		id: &str,
		body: Document,
	) -> Result<bool, StoreError> {
		let Ok(id) = Uuid::parse_str(id) else {
			return Ok(false);
		};
		let mut collections = self.collections.write().await;
		let Some(entry) = collections
			.get_mut(collection)
			.and_then(|entries| entries.iter_mut().find(|e| e.id == id))
		else {
			return Ok(false);
		};
		entry.body = Value::Object(body);
		debug!(collection, id = %id, "replaced document");
		Ok(true)
	}

	async fn replace_unless(
		&self,
		collection: &str,
		id: &str,
		body: Document,
		guard: &Predicate,
		collation: Collation,
	) -> Result<ReplaceOutcome, StoreError> {
		let Ok(id) = Uuid::parse_str(id) else {
			return Ok(ReplaceOutcome::NotFound);
		};
		let mut collections = self.collections.write().await;
		let Some(entries) = collections.get_mut(collection) else {
			return Ok(ReplaceOutcome::NotFound);
		};
		let Some(position) = entries.iter().position(|e| e.id == id) else {
			return Ok(ReplaceOutcome::NotFound);
		};
		if entries
			.iter()
			.any(|e| e.id != id && guard.matches(&e.body, collation))
		{
			debug!(collection, id = %id, "replace rejected by guard");
			return Ok(ReplaceOutcome::Conflict);
		}
		entries[position].body = Value::Object(body);
		debug!(collection, id = %id, "replaced document");
		Ok(ReplaceOutcome::Replaced)
	}

	async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
		let Ok(id) = Uuid::parse_str(id) else {
			return Ok(false);
		};
		let mut collections = self.collections.write().await;
		let Some(entries) = collections.get_mut(collection) else {
			return Ok(false);
		};
		let before = entries.len();
		entries.retain(|e| e.id != id);
		let deleted = entries.len() != before;
		if deleted {
			debug!(collection, id = %id, "deleted document");
		}
		Ok(deleted)
	}
}

/// Orders documents by the first value at the sort path. Missing values sort
/// first, then numbers, strings, objects, arrays and booleans.
fn compare_for_sort(a: &Value, b: &Value, sort: &SortSpec, collation: Collation) -> Ordering {
	let left = resolve_path(a, &sort.path).into_iter().next();
	let right = resolve_path(b, &sort.path).into_iter().next();
	let ordering = compare_values(left, right, collation);
	match sort.order {
		SortOrder::Ascending => ordering,
		SortOrder::Descending => ordering.reverse(),
	}
}

fn type_rank(value: Option<&Value>) -> u8 {
	match value {
		None | Some(Value::Null) => 0,
		Some(Value::Number(_)) => 1,
		Some(Value::String(_)) => 2,
		Some(Value::Object(_)) => 3,
		Some(Value::Array(_)) => 4,
		Some(Value::Bool(_)) => 5,
	}
}

fn compare_values(left: Option<&Value>, right: Option<&Value>, collation: Collation) -> Ordering {
	match (left, right) {
		(Some(Value::Number(a)), Some(Value::Number(b))) => {
			let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
			a.partial_cmp(&b).unwrap_or(Ordering::Equal)
		}
		(Some(Value::String(a)), Some(Value::String(b))) => match collation {
			Collation::Simple => a.cmp(b),
			Collation::CaseInsensitive => a.to_lowercase().cmp(&b.to_lowercase()),
		},
		(Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
		_ => type_rank(left).cmp(&type_rank(right)),
	}
}
