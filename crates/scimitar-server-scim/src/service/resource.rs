// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use scimitar_scim::{
	apply_patch, compile_filter, Collation, Document, ListResponse, PatchRequest, Predicate,
	ScimError,
};
use serde_json::Value;
use tracing::debug;

use super::{
	created_of, is_truthy, stamp, timestamp, version_of, ResourceKind, ResourceResponse,
	ScimService,
};
use crate::error::ScimApiError;
use crate::etag::check_if_match;
use crate::list::ListParams;
use crate::store::{DocumentStore, FindOptions, ReplaceOutcome, SortSpec, StoredDocument};

impl<S: DocumentStore> ScimService<S> {
	pub(crate) async fn list_resources(
		&self,
		kind: ResourceKind,
		params: &ListParams,
	) -> Result<ListResponse<Value>, ScimApiError> {
		let query = compile_filter(params.filter.as_deref());
		let collection = kind.collection();
		let total = self
			.store
			.count(collection, &query, Collation::CaseInsensitive)
			.await?;

		let options = FindOptions {
			skip: params.skip(),
			limit: Some(usize::try_from(params.count).unwrap_or(usize::MAX)),
			sort: params.sort_by.as_ref().map(|path| SortSpec {
				path: path.clone(),
				order: params.sort_order,
			}),
			collation: Collation::CaseInsensitive,
		};
		let docs = self.store.find(collection, &query, &options).await?;
		debug!(
			collection,
			total,
			returned = docs.len(),
			"listed resources"
		);

		let resources: Vec<Value> = docs
			.into_iter()
			.map(|doc| self.present(kind, doc).resource)
			.collect();
		let items_per_page = resources.len() as u64;
		Ok(ListResponse::new(
			resources,
			total,
			params.start_index,
			items_per_page,
		))
	}

	pub(crate) async fn get_resource(
		&self,
		kind: ResourceKind,
		id: &str,
	) -> Result<ResourceResponse, ScimApiError> {
		let stored = self.load(kind, id).await?;
		Ok(self.present(kind, stored))
	}

	pub(crate) async fn create_resource(
		&self,
		kind: ResourceKind,
		input: &Value,
	) -> Result<ResourceResponse, ScimApiError> {
		let mut doc = kind.sanitize(input);
		let guard = uniqueness_guard(kind, required_value(kind, &doc)?);

		let now = timestamp();
		stamp(&mut doc, 1, &now, &now);
		let id = self
			.store
			.insert_unless(kind.collection(), doc.clone(), &guard, Collation::CaseInsensitive)
			.await?
			.ok_or_else(|| duplicate(kind))?;
		Ok(self.present(kind, StoredDocument { id, body: doc }))
	}

	pub(crate) async fn replace_resource(
		&self,
		kind: ResourceKind,
		id: &str,
		input: &Value,
		if_match: Option<&str>,
	) -> Result<ResourceResponse, ScimApiError> {
		let existing = self.load(kind, id).await?;
		let version = precondition(&existing.body, if_match)?;

		let mut doc = kind.sanitize(input);
		let guard = uniqueness_guard(kind, required_value(kind, &doc)?);

		let now = timestamp();
		let created = created_of(&existing.body).unwrap_or_else(|| now.clone());
		stamp(&mut doc, version + 1, &created, &now);
		self.write(kind, existing.id, doc, Some(guard)).await
	}

	pub(crate) async fn patch_resource(
		&self,
		kind: ResourceKind,
		id: &str,
		body: &Value,
		if_match: Option<&str>,
	) -> Result<ResourceResponse, ScimApiError> {
		let request = PatchRequest::from_value(body)?;
		let existing = self.load(kind, id).await?;
		let version = precondition(&existing.body, if_match)?;

		let mut doc = existing.body.clone();
		apply_patch(&mut doc, &request.operations);
		doc.remove("id");
		let schemas = kind.schemas_for(&Value::Object(doc.clone()));
		doc.insert("schemas".to_string(), schemas);
		kind.normalize(&mut doc);

		let guard = doc
			.get(kind.unique_attribute())
			.filter(|v| is_truthy(v))
			.map(|unique| uniqueness_guard(kind, unique.clone()));

		let now = timestamp();
		let created = created_of(&existing.body).unwrap_or_else(|| now.clone());
		stamp(&mut doc, version + 1, &created, &now);
		debug!(
			collection = kind.collection(),
			id = %existing.id,
			operations = request.operations.len(),
			"applied patch"
		);
		self.write(kind, existing.id, doc, guard).await
	}

	pub(crate) async fn delete_resource(
		&self,
		kind: ResourceKind,
		id: &str,
	) -> Result<(), ScimApiError> {
		if self.store.delete(kind.collection(), id).await? {
			Ok(())
		} else {
			Err(ScimApiError::NotFound(kind.not_found()))
		}
	}

	async fn load(&self, kind: ResourceKind, id: &str) -> Result<StoredDocument, ScimApiError> {
		self.store
			.find_by_id(kind.collection(), id)
			.await?
			.ok_or_else(|| ScimApiError::NotFound(kind.not_found()))
	}

	/// Writes `doc` over `id`. With a guard, another resource matching it
	/// rejects the write as a duplicate.
	async fn write(
		&self,
		kind: ResourceKind,
		id: String,
		doc: Document,
		guard: Option<Predicate>,
	) -> Result<ResourceResponse, ScimApiError> {
		let collection = kind.collection();
		let outcome = match &guard {
			Some(guard) => {
				self.store
					.replace_unless(collection, &id, doc.clone(), guard, Collation::CaseInsensitive)
					.await?
			}
			None if self.store.replace(collection, &id, doc.clone()).await? => {
				ReplaceOutcome::Replaced
			}
			None => ReplaceOutcome::NotFound,
		};
		match outcome {
			ReplaceOutcome::Replaced => Ok(self.present(kind, StoredDocument { id, body: doc })),
			ReplaceOutcome::NotFound => Err(ScimApiError::NotFound(kind.not_found())),
			ReplaceOutcome::Conflict => Err(duplicate(kind)),
		}
	}
}

/// Matches resources holding `value` in the kind's unique attribute.
fn uniqueness_guard(kind: ResourceKind, value: Value) -> Predicate {
	Predicate::Equals {
		path: kind.unique_attribute().to_string(),
		value,
	}
}

fn duplicate(kind: ResourceKind) -> ScimApiError {
	ScimError::Uniqueness(format!("Duplicate {}", kind.unique_attribute())).into()
}

fn required_value(kind: ResourceKind, doc: &Document) -> Result<Value, ScimApiError> {
	let attribute = kind.unique_attribute();
	doc.get(attribute)
		.filter(|v| is_truthy(v))
		.cloned()
		.ok_or_else(|| ScimError::InvalidValue(format!("{attribute} is required")).into())
}

/// Checks `If-Match` against the stored version and returns that version.
fn precondition(body: &Document, if_match: Option<&str>) -> Result<u64, ScimApiError> {
	let version = version_of(body);
	if check_if_match(if_match, version) {
		Ok(version)
	} else {
		Err(ScimError::Mutability("Precondition Failed".to_string()).into())
	}
}
