// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for the scimitar server.

pub mod logging;
pub mod scim;
pub mod store;

pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use scim::{ScimConfig, ScimConfigLayer};
pub use store::{StoreConfig, StoreConfigLayer};
