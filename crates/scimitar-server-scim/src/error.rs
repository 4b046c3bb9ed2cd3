// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use http::StatusCode;
use scimitar_scim::{ScimError, ScimErrorResponse, ScimErrorType};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ScimApiError {
	#[error("not found: {0}")]
	NotFound(String),
	#[error("bad request: {0}")]
	BadRequest(String),
	#[error(transparent)]
	Scim(#[from] ScimError),
	#[error(transparent)]
	Store(#[from] StoreError),
}

impl ScimApiError {
	pub fn status(&self) -> StatusCode {
		self.parts().0
	}

	/// The SCIM error envelope for this error.
	pub fn to_response(&self) -> ScimErrorResponse {
		let (status, error_type, detail) = self.parts();
		ScimErrorResponse::new(status.as_u16(), error_type, detail)
	}

	fn parts(&self) -> (StatusCode, Option<ScimErrorType>, String) {
		match self {
			ScimApiError::NotFound(msg) => (StatusCode::NOT_FOUND, None, msg.clone()),
			ScimApiError::BadRequest(msg) => (
				StatusCode::BAD_REQUEST,
				Some(ScimErrorType::InvalidSyntax),
				msg.clone(),
			),
			ScimApiError::Scim(e) => match e {
				ScimError::InvalidValue(msg) => (
					StatusCode::BAD_REQUEST,
					Some(ScimErrorType::InvalidValue),
					msg.clone(),
				),
				ScimError::NotFound(msg) => (StatusCode::NOT_FOUND, None, msg.clone()),
				ScimError::Uniqueness(msg) => (
					StatusCode::CONFLICT,
					Some(ScimErrorType::Uniqueness),
					msg.clone(),
				),
				ScimError::Mutability(msg) => (
					StatusCode::PRECONDITION_FAILED,
					Some(ScimErrorType::Mutability),
					msg.clone(),
				),
				ScimError::InvalidSyntax(msg) => (
					StatusCode::BAD_REQUEST,
					Some(ScimErrorType::InvalidSyntax),
					msg.clone(),
				),
				ScimError::TooMany => (
					StatusCode::PAYLOAD_TOO_LARGE,
					Some(ScimErrorType::TooMany),
					"Too many operations".to_string(),
				),
			},
			ScimApiError::Store(e) => (
				StatusCode::INTERNAL_SERVER_ERROR,
				None,
				format!("Store error: {e}"),
			),
		}
	}
}
