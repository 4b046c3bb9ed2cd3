// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::SCHEMA_ERROR;

#[derive(Debug, Error)]
pub enum ScimError {
	#[error("invalid value: {0}")]
	InvalidValue(String),
	#[error("resource not found: {0}")]
	NotFound(String),
	#[error("uniqueness violation: {0}")]
	Uniqueness(String),
	#[error("mutability violation: {0}")]
	Mutability(String),
	#[error("invalid syntax: {0}")]
	InvalidSyntax(String),
	#[error("too many operations")]
	TooMany,
}

impl ScimError {
	pub fn error_type(&self) -> Option<ScimErrorType> {
		match self {
			ScimError::InvalidValue(_) => Some(ScimErrorType::InvalidValue),
			ScimError::NotFound(_) => None,
			ScimError::Uniqueness(_) => Some(ScimErrorType::Uniqueness),
			ScimError::Mutability(_) => Some(ScimErrorType::Mutability),
			ScimError::InvalidSyntax(_) => Some(ScimErrorType::InvalidSyntax),
			ScimError::TooMany => Some(ScimErrorType::TooMany),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScimErrorType {
	InvalidFilter,
	TooMany,
	Uniqueness,
	Mutability,
	InvalidSyntax,
	InvalidPath,
	NoTarget,
	InvalidValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimErrorResponse {
	pub schemas: Vec<String>,
	pub status: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub scim_type: Option<ScimErrorType>,
	pub detail: String,
}

impl ScimErrorResponse {
	pub fn new(status: u16, error_type: Option<ScimErrorType>, detail: impl Into<String>) -> Self {
		Self {
			schemas: vec![SCHEMA_ERROR.to_string()],
			status: status.to_string(),
			scim_type: error_type,
			detail: detail.into(),
		}
	}
}
