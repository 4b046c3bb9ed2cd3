// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Weak ETags of the form `W/"<version>"`.

use std::sync::LazyLock;

use regex::Regex;

static WEAK_ETAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"W/"(\d+)""#).unwrap());

pub fn weak_etag(version: u64) -> String {
	format!("W/\"{version}\"")
}

/// Extracts the version number from the first weak ETag in a header value.
pub fn etag_number_from(header: &str) -> Option<u64> {
	WEAK_ETAG
		.captures(header)
		.and_then(|caps| caps.get(1))
		.and_then(|m| m.as_str().parse().ok())
}

/// An absent or empty `If-Match` always passes, as does `*`.
pub fn check_if_match(if_match: Option<&str>, current_version: u64) -> bool {
	match if_match.map(str::trim) {
		None | Some("") | Some("*") => true,
		Some(header) => etag_number_from(header) == Some(current_version),
	}
}
