// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SCIM 2.0 resource types, filter compilation and PATCH application.

pub mod error;
pub mod filter;
pub mod patch;
pub mod primary;
pub mod schema;
pub mod types;

pub use error::{ScimError, ScimErrorResponse, ScimErrorType};
pub use filter::{compile_filter, Collation, Filter, Predicate};
pub use patch::{apply_operation, apply_patch, Document, PatchOp, PatchOperation, PatchRequest};
pub use primary::{coerce_primary, normalize_primary, normalize_roles_primary};
pub use schema::{Schema, SchemaAttribute};
pub use types::*;
