// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SCIM (System for Cross-domain Identity Management) configuration.

use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "http://localhost:3999";
const DEFAULT_MAX_RESULTS: u64 = 1000;
const DEFAULT_COUNT: u64 = 100;
const DEFAULT_BULK_MAX_OPERATIONS: u32 = 1000;
const DEFAULT_BULK_MAX_PAYLOAD_SIZE: u64 = 1_048_576;

/// SCIM configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq)]
pub struct ScimConfig {
	/// Prefix for `meta.location`, without a trailing slash.
	pub base_url: String,
	pub max_results: u64,
	pub default_count: u64,
	pub bulk_max_operations: u32,
	pub bulk_max_payload_size: u64,
}

impl Default for ScimConfig {
	fn default() -> Self {
		ScimConfigLayer::default().finalize()
	}
}

/// SCIM configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScimConfigLayer {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub max_results: Option<u64>,
	#[serde(default)]
	pub default_count: Option<u64>,
	#[serde(default)]
	pub bulk_max_operations: Option<u32>,
	#[serde(default)]
	pub bulk_max_payload_size: Option<u64>,
}

impl ScimConfigLayer {
	pub fn merge(&mut self, other: ScimConfigLayer) {
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.max_results.is_some() {
			self.max_results = other.max_results;
		}
		if other.default_count.is_some() {
			self.default_count = other.default_count;
		}
		if other.bulk_max_operations.is_some() {
			self.bulk_max_operations = other.bulk_max_operations;
		}
		if other.bulk_max_payload_size.is_some() {
			self.bulk_max_payload_size = other.bulk_max_payload_size;
		}
	}

	pub fn finalize(self) -> ScimConfig {
		let base_url = self
			.base_url
			.unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
			.trim_end_matches('/')
			.to_string();
		ScimConfig {
			base_url,
			max_results: self.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
			default_count: self.default_count.unwrap_or(DEFAULT_COUNT),
			bulk_max_operations: self
				.bulk_max_operations
				.unwrap_or(DEFAULT_BULK_MAX_OPERATIONS),
			bulk_max_payload_size: self
				.bulk_max_payload_size
				.unwrap_or(DEFAULT_BULK_MAX_PAYLOAD_SIZE),
		}
	}
}
