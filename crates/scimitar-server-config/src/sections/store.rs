// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Document store configuration.

use serde::Deserialize;

const DEFAULT_URI: &str = "memory://";
const DEFAULT_DATABASE: &str = "scim";

/// Document store configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
	pub uri: String,
	pub database: String,
}

impl Default for StoreConfig {
	fn default() -> Self {
		StoreConfigLayer::default().finalize()
	}
}

/// Document store configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfigLayer {
	#[serde(default)]
	pub uri: Option<String>,
	#[serde(default)]
	pub database: Option<String>,
}

impl StoreConfigLayer {
	pub fn merge(&mut self, other: StoreConfigLayer) {
		if other.uri.is_some() {
			self.uri = other.uri;
		}
		if other.database.is_some() {
			self.database = other.database;
		}
	}

	pub fn finalize(self) -> StoreConfig {
		StoreConfig {
			uri: self.uri.unwrap_or_else(|| DEFAULT_URI.to_string()),
			database: self.database.unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
		}
	}
}
