// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use http::StatusCode;
use scimitar_scim::types::{SCHEMA_CORE_GROUP, SCHEMA_CORE_USER, SCHEMA_ENTERPRISE_USER};
use scimitar_server_config::ScimConfig;
use scimitar_server_scim::{MemoryStore, ScimService};

fn setup() -> ScimService<MemoryStore> {
	let config = ScimConfig {
		base_url: "https://scim.example.com/scim/v2".to_string(),
		bulk_max_operations: 50,
		max_results: 200,
		..ScimConfig::default()
	};
	ScimService::new(Arc::new(MemoryStore::new()), config)
}

#[test]
fn test_service_provider_config_reflects_configuration() {
	let spc = setup().service_provider_config();
	let json = serde_json::to_value(&spc).unwrap();
	assert_eq!(json["bulk"]["maxOperations"], 50);
	assert_eq!(json["bulk"]["maxPayloadSize"], 1_048_576);
	assert_eq!(json["filter"]["maxResults"], 200);
	assert_eq!(json["patch"]["supported"], true);
	assert_eq!(json["etag"]["supported"], true);
	assert_eq!(json["sort"]["supported"], true);
	assert_eq!(json["changePassword"]["supported"], false);
	assert_eq!(json["authenticationSchemes"][0]["type"], "oauthbearertoken");
	assert_eq!(
		json["meta"]["location"],
		"https://scim.example.com/scim/v2/ServiceProviderConfig"
	);
}

#[test]
fn test_resource_types() {
	let svc = setup();
	let list = svc.resource_types();
	assert_eq!(list.total_results, 2);

	let users = svc.resource_type("users").unwrap();
	assert_eq!(users.schema, SCHEMA_CORE_USER);
	assert_eq!(users.schema_extensions[0].schema, SCHEMA_ENTERPRISE_USER);
	assert!(!users.schema_extensions[0].required);

	let groups = svc.resource_type("Group").unwrap();
	assert_eq!(groups.endpoint, "/Groups");

	let err = svc.resource_type("Widgets").unwrap_err();
	assert_eq!(err.status(), StatusCode::NOT_FOUND);
	assert_eq!(err.to_response().detail, "ResourceType not found");
}

#[test]
fn test_schemas() {
	let svc = setup();
	let list = svc.schemas();
	let ids: Vec<&str> = list.resources.iter().map(|s| s.id.as_str()).collect();
	assert_eq!(
		ids,
		vec![SCHEMA_CORE_USER, SCHEMA_CORE_GROUP, SCHEMA_ENTERPRISE_USER]
	);

	let user = svc.schema(SCHEMA_CORE_USER).unwrap();
	let user_name = user
		.attributes
		.iter()
		.find(|a| a.name == "userName")
		.unwrap();
	assert!(user_name.required);
	assert_eq!(user_name.uniqueness, "server");

	let enterprise = svc.schema(SCHEMA_ENTERPRISE_USER).unwrap();
	let manager = enterprise
		.attributes
		.iter()
		.find(|a| a.name == "manager")
		.unwrap();
	assert_eq!(manager.attr_type, "complex");

	assert_eq!(
		svc.schema("urn:example:nope").unwrap_err().to_response().detail,
		"Schema not found"
	);
}
