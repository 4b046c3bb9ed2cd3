// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::Utc;
use scimitar_scim::types::{
	AuthenticationScheme, BulkSupported, FilterSupported, SchemaExtension, Supported,
	SCHEMA_CORE_GROUP, SCHEMA_CORE_USER, SCHEMA_ENTERPRISE_USER, SCHEMA_RESOURCE_TYPE,
	SCHEMA_SCHEMA, SCHEMA_SERVICE_PROVIDER_CONFIG,
};
use scimitar_scim::{
	ListResponse, Meta, ResourceType, Schema, SchemaAttribute, ServiceProviderConfig,
};

use super::ScimService;
use crate::error::ScimApiError;
use crate::store::DocumentStore;

impl<S: DocumentStore> ScimService<S> {
	pub fn service_provider_config(&self) -> ServiceProviderConfig {
		let now = Utc::now();
		ServiceProviderConfig {
			schemas: vec![SCHEMA_SERVICE_PROVIDER_CONFIG.to_string()],
			patch: Supported { supported: true },
			bulk: BulkSupported {
				supported: true,
				max_operations: self.config.bulk_max_operations,
				max_payload_size: self.config.bulk_max_payload_size,
			},
			filter: FilterSupported {
				supported: true,
				max_results: self.config.max_results,
			},
			change_password: Supported { supported: false },
			sort: Supported { supported: true },
			etag: Supported { supported: true },
			authentication_schemes: vec![AuthenticationScheme {
				scheme_type: "oauthbearertoken".to_string(),
				name: "OAuth Bearer Token".to_string(),
				description: "Bearer token via Authorization header.".to_string(),
				spec_uri: Some("https://www.rfc-editor.org/info/rfc6750".to_string()),
				primary: true,
			}],
			meta: Some(Meta {
				resource_type: "ServiceProviderConfig".to_string(),
				created: now,
				last_modified: now,
				location: Some(format!("{}/ServiceProviderConfig", self.config.base_url)),
				version: None,
			}),
		}
	}

	pub fn resource_types(&self) -> ListResponse<ResourceType> {
		let resource_types = vec![self.user_resource_type(), self.group_resource_type()];
		let total = resource_types.len() as u64;
		ListResponse::new(resource_types, total, 1, total)
	}

	/// Looks a resource type up by id (`Users`) or name (`User`), ignoring case.
	pub fn resource_type(&self, id: &str) -> Result<ResourceType, ScimApiError> {
		[self.user_resource_type(), self.group_resource_type()]
			.into_iter()
			.find(|rt| rt.id.eq_ignore_ascii_case(id) || rt.name.eq_ignore_ascii_case(id))
			.ok_or_else(|| ScimApiError::NotFound("ResourceType not found".to_string()))
	}

	pub fn schemas(&self) -> ListResponse<Schema> {
		let schemas = vec![user_schema(), group_schema(), enterprise_user_schema()];
		let total = schemas.len() as u64;
		ListResponse::new(schemas, total, 1, total)
	}

	pub fn schema(&self, id: &str) -> Result<Schema, ScimApiError> {
		[user_schema(), group_schema(), enterprise_user_schema()]
			.into_iter()
			.find(|schema| schema.id == id)
			.ok_or_else(|| ScimApiError::NotFound("Schema not found".to_string()))
	}

	fn user_resource_type(&self) -> ResourceType {
		ResourceType {
			schemas: vec![SCHEMA_RESOURCE_TYPE.to_string()],
			id: "Users".to_string(),
			name: "User".to_string(),
			description: "User Account".to_string(),
			endpoint: "/Users".to_string(),
			schema: SCHEMA_CORE_USER.to_string(),
			schema_extensions: vec![SchemaExtension {
				schema: SCHEMA_ENTERPRISE_USER.to_string(),
				required: false,
			}],
			meta: Some(self.resource_type_meta("Users")),
		}
	}

	fn group_resource_type(&self) -> ResourceType {
		ResourceType {
			schemas: vec![SCHEMA_RESOURCE_TYPE.to_string()],
			id: "Groups".to_string(),
			name: "Group".to_string(),
			description: "Group".to_string(),
			endpoint: "/Groups".to_string(),
			schema: SCHEMA_CORE_GROUP.to_string(),
			schema_extensions: vec![],
			meta: Some(self.resource_type_meta("Groups")),
		}
	}

	fn resource_type_meta(&self, id: &str) -> Meta {
		let now = Utc::now();
		Meta {
			resource_type: "ResourceType".to_string(),
			created: now,
			last_modified: now,
			location: Some(format!("{}/ResourceTypes/{id}", self.config.base_url)),
			version: None,
		}
	}
}

fn typed_values(name: &str, description: &str) -> SchemaAttribute {
	SchemaAttribute::complex(
		name,
		description,
		vec![
			SchemaAttribute::string("value", ""),
			SchemaAttribute::string("display", ""),
			SchemaAttribute::string("type", ""),
			SchemaAttribute::boolean("primary", ""),
		],
	)
	.multi_valued()
}

fn user_schema() -> Schema {
	Schema {
		schemas: vec![SCHEMA_SCHEMA.to_string()],
		id: SCHEMA_CORE_USER.to_string(),
		name: "User".to_string(),
		description: Some("User Account".to_string()),
		attributes: vec![
			SchemaAttribute::string("userName", "Unique identifier for the User")
				.required()
				.unique(),
			SchemaAttribute::complex(
				"name",
				"Components of the user's real name",
				[
					"formatted",
					"familyName",
					"givenName",
					"middleName",
					"honorificPrefix",
					"honorificSuffix",
				]
				.into_iter()
				.map(|sub| SchemaAttribute::string(sub, ""))
				.collect(),
			),
			SchemaAttribute::string("displayName", ""),
			SchemaAttribute::string("nickName", ""),
			SchemaAttribute::string("profileUrl", ""),
			SchemaAttribute::string("title", ""),
			SchemaAttribute::string("userType", ""),
			SchemaAttribute::string("preferredLanguage", ""),
			SchemaAttribute::string("locale", ""),
			SchemaAttribute::string("timezone", ""),
			SchemaAttribute::boolean("active", ""),
			SchemaAttribute::string("password", "").mutability("writeOnly"),
			SchemaAttribute::complex(
				"emails",
				"",
				vec![
					SchemaAttribute::string("value", ""),
					SchemaAttribute::string("type", ""),
					SchemaAttribute::boolean("primary", ""),
				],
			)
			.multi_valued(),
			SchemaAttribute::complex(
				"phoneNumbers",
				"",
				vec![
					SchemaAttribute::string("value", ""),
					SchemaAttribute::string("type", ""),
					SchemaAttribute::boolean("primary", ""),
				],
			)
			.multi_valued(),
			SchemaAttribute::complex(
				"addresses",
				"",
				vec![
					SchemaAttribute::string("type", ""),
					SchemaAttribute::string("formatted", ""),
					SchemaAttribute::string("streetAddress", ""),
					SchemaAttribute::string("locality", ""),
					SchemaAttribute::string("region", ""),
					SchemaAttribute::string("postalCode", ""),
					SchemaAttribute::string("country", ""),
					SchemaAttribute::boolean("primary", ""),
				],
			)
			.multi_valued(),
			SchemaAttribute::complex(
				"groups",
				"",
				vec![
					SchemaAttribute::string("value", ""),
					SchemaAttribute::reference("$ref", ""),
					SchemaAttribute::string("display", ""),
					SchemaAttribute::string("type", ""),
				],
			)
			.multi_valued()
			.mutability("readOnly"),
			typed_values("entitlements", ""),
			typed_values("roles", ""),
			typed_values("x509Certificates", ""),
		],
		meta: None,
	}
}

fn group_schema() -> Schema {
	Schema {
		schemas: vec![SCHEMA_SCHEMA.to_string()],
		id: SCHEMA_CORE_GROUP.to_string(),
		name: "Group".to_string(),
		description: Some("Group".to_string()),
		attributes: vec![
			SchemaAttribute::string("displayName", "").required().unique(),
			SchemaAttribute::complex(
				"members",
				"",
				vec![
					SchemaAttribute::string("value", ""),
					SchemaAttribute::reference("$ref", ""),
					SchemaAttribute::string("display", ""),
					SchemaAttribute::string("type", ""),
				],
			)
			.multi_valued(),
		],
		meta: None,
	}
}

fn enterprise_user_schema() -> Schema {
	Schema {
		schemas: vec![SCHEMA_SCHEMA.to_string()],
		id: SCHEMA_ENTERPRISE_USER.to_string(),
		name: "EnterpriseUser".to_string(),
		description: Some("User Enterprise Extension".to_string()),
		attributes: vec![
			SchemaAttribute::string("employeeNumber", ""),
			SchemaAttribute::string("costCenter", ""),
			SchemaAttribute::string("organization", ""),
			SchemaAttribute::string("division", ""),
			SchemaAttribute::string("department", ""),
			SchemaAttribute::complex(
				"manager",
				"",
				vec![
					SchemaAttribute::string("value", ""),
					SchemaAttribute::reference("$ref", ""),
					SchemaAttribute::string("display", ""),
				],
			),
		],
		meta: None,
	}
}
