// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use http::StatusCode;
use scimitar_scim::types::{SCHEMA_CORE_GROUP, SCHEMA_PATCH_OP};
use scimitar_scim::{SearchRequest, ScimErrorType};
use scimitar_server_config::ScimConfig;
use scimitar_server_scim::{MemoryStore, ScimService, SearchTarget};
use serde_json::json;

fn setup() -> ScimService<MemoryStore> {
	ScimService::new(Arc::new(MemoryStore::new()), ScimConfig::default())
}

#[tokio::test]
async fn test_create_group_fixes_schemas() {
	let svc = setup();
	let created = svc
		.create_group(&json!({
			"schemas": ["urn:example:custom"],
			"displayName": "Engineering",
			"members": [{"value": "u1", "display": "Alice"}]
		}))
		.await
		.unwrap();
	assert_eq!(created.resource["schemas"], json!([SCHEMA_CORE_GROUP]));
	assert_eq!(created.resource["meta"]["resourceType"], "Group");
	assert!(created.location.ends_with(&format!("/Groups/{}", created.id)));
	assert_eq!(created.resource["members"][0]["display"], "Alice");
}

#[tokio::test]
async fn test_group_display_name_required_and_unique() {
	let svc = setup();
	let err = svc.create_group(&json!({"members": []})).await.unwrap_err();
	assert_eq!(err.status(), StatusCode::BAD_REQUEST);
	assert_eq!(err.to_response().detail, "displayName is required");

	svc.create_group(&json!({"displayName": "Ops"})).await.unwrap();
	let err = svc
		.create_group(&json!({"displayName": "OPS"}))
		.await
		.unwrap_err();
	assert_eq!(err.status(), StatusCode::CONFLICT);
	let envelope = err.to_response();
	assert_eq!(envelope.scim_type, Some(ScimErrorType::Uniqueness));
	assert_eq!(envelope.detail, "Duplicate displayName");
}

#[tokio::test]
async fn test_patch_group_members() {
	let svc = setup();
	let created = svc
		.create_group(&json!({
			"displayName": "Sales",
			"members": [{"value": "u1"}]
		}))
		.await
		.unwrap();

	let patched = svc
		.patch_group(
			&created.id,
			&json!({
				"schemas": [SCHEMA_PATCH_OP],
				"Operations": [
					{"op": "add", "path": "members", "value": [{"value": "u2"}, {"value": "u3"}]},
					{"op": "remove", "path": "members[value eq \"u1\"]"},
					{"op": "remove", "path": "members", "value": [{"value": "u3"}]}
				]
			}),
			Some("W/\"1\""),
		)
		.await
		.unwrap();

	assert_eq!(patched.resource["members"], json!([{"value": "u2"}]));
	assert_eq!(patched.etag, "W/\"2\"");
}

#[tokio::test]
async fn test_patch_group_rename_collides() {
	let svc = setup();
	svc.create_group(&json!({"displayName": "Finance"}))
		.await
		.unwrap();
	let legal = svc
		.create_group(&json!({"displayName": "Legal"}))
		.await
		.unwrap();

	let err = svc
		.patch_group(
			&legal.id,
			&json!({"Operations": [{"op": "replace", "path": "displayName", "value": "finance"}]}),
			None,
		)
		.await
		.unwrap_err();
	assert_eq!(err.status(), StatusCode::CONFLICT);

	let unchanged = svc.get_group(&legal.id).await.unwrap();
	assert_eq!(unchanged.resource["displayName"], "Legal");
	assert_eq!(unchanged.etag, "W/\"1\"");
}

#[tokio::test]
async fn test_delete_unknown_group() {
	let svc = setup();
	let err = svc.delete_group("nope").await.unwrap_err();
	assert_eq!(err.status(), StatusCode::NOT_FOUND);
	assert_eq!(err.to_response().detail, "Group not found");
}

#[tokio::test]
async fn test_search_targets() {
	let svc = setup();
	svc.create_user(&json!({"userName": "alice"})).await.unwrap();
	svc.create_user(&json!({"userName": "alina"})).await.unwrap();
	svc.create_group(&json!({"displayName": "alpha"})).await.unwrap();

	let request = SearchRequest {
		filter: Some("userName sw \"ali\"".to_string()),
		count: Some(1),
		..Default::default()
	};
	let users = svc.search(SearchTarget::Root, &request).await.unwrap();
	assert_eq!(users.total_results, 2);
	assert_eq!(users.resources.len(), 1);

	let request = SearchRequest {
		filter: Some("displayName pr".to_string()),
		..Default::default()
	};
	let groups = svc.search(SearchTarget::Groups, &request).await.unwrap();
	assert_eq!(groups.total_results, 1);
	assert_eq!(groups.resources[0]["displayName"], "alpha");
	assert_eq!(groups.resources[0]["schemas"], json!([SCHEMA_CORE_GROUP]));
}
