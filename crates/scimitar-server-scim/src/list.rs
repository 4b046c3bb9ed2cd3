// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use scimitar_server_config::ScimConfig;
use serde::Deserialize;

use crate::store::SortOrder;

/// Raw list query parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
	pub start_index: Option<String>,
	pub count: Option<String>,
	pub filter: Option<String>,
	pub sort_by: Option<String>,
	pub sort_order: Option<String>,
}

/// Validated paging, filtering and sorting for a list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams {
	/// 1-based.
	pub start_index: u64,
	pub count: u64,
	pub filter: Option<String>,
	pub sort_by: Option<String>,
	pub sort_order: SortOrder,
}

impl ListParams {
	pub fn from_query(query: &ListQuery, config: &ScimConfig) -> Self {
		let start_index = query
			.start_index
			.as_deref()
			.and_then(parse_leading_int)
			.filter(|n| *n != 0)
			.map_or(1, |n| n.max(1) as u64);

		let count = query
			.count
			.as_deref()
			.and_then(parse_leading_int)
			.map_or(config.default_count, |n| n.max(0) as u64)
			.min(config.max_results);

		Self {
			start_index,
			count,
			filter: non_empty(query.filter.as_deref()),
			sort_by: non_empty(query.sort_by.as_deref()),
			sort_order: parse_sort_order(query.sort_order.as_deref()),
		}
	}

	pub fn skip(&self) -> usize {
		usize::try_from(self.start_index.saturating_sub(1)).unwrap_or(usize::MAX)
	}
}

/// `descending` in any case sorts descending; anything else ascends.
pub fn parse_sort_order(raw: Option<&str>) -> SortOrder {
	match raw {
		Some(order) if order.trim().eq_ignore_ascii_case("descending") => SortOrder::Descending,
		_ => SortOrder::Ascending,
	}
}

fn non_empty(raw: Option<&str>) -> Option<String> {
	raw.filter(|s| !s.trim().is_empty()).map(str::to_string)
}

/// Reads an optionally signed run of leading digits, ignoring anything after
/// it, so `"10abc"` is 10 and `"abc"` is unparsable.
fn parse_leading_int(raw: &str) -> Option<i64> {
	let trimmed = raw.trim_start();
	let (sign, digits) = match trimmed.as_bytes().first() {
		Some(b'-') => (-1, &trimmed[1..]),
		Some(b'+') => (1, &trimmed[1..]),
		_ => (1, trimmed),
	};
	let end = digits
		.find(|c: char| !c.is_ascii_digit())
		.unwrap_or(digits.len());
	if end == 0 {
		return None;
	}
	let magnitude: i64 = digits[..end].parse().unwrap_or(i64::MAX);
	Some(sign * magnitude)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn query(start: Option<&str>, count: Option<&str>) -> ListQuery {
		ListQuery {
			start_index: start.map(str::to_string),
			count: count.map(str::to_string),
			..Default::default()
		}
	}

	#[test]
	fn test_defaults() {
		let params = ListParams::from_query(&ListQuery::default(), &ScimConfig::default());
		assert_eq!(params.start_index, 1);
		assert_eq!(params.count, 100);
		assert_eq!(params.filter, None);
		assert_eq!(params.sort_order, SortOrder::Ascending);
		assert_eq!(params.skip(), 0);
	}

	#[test]
	fn test_start_index_floor() {
		let config = ScimConfig::default();
		assert_eq!(ListParams::from_query(&query(Some("0"), None), &config).start_index, 1);
		assert_eq!(ListParams::from_query(&query(Some("-4"), None), &config).start_index, 1);
		assert_eq!(ListParams::from_query(&query(Some("abc"), None), &config).start_index, 1);
		assert_eq!(ListParams::from_query(&query(Some("11"), None), &config).start_index, 11);
		assert_eq!(ListParams::from_query(&query(Some("7x"), None), &config).start_index, 7);
	}

	#[test]
	fn test_count_clamped() {
		let config = ScimConfig::default();
		assert_eq!(ListParams::from_query(&query(None, Some("5000")), &config).count, 1000);
		assert_eq!(ListParams::from_query(&query(None, Some("-3")), &config).count, 0);
		assert_eq!(ListParams::from_query(&query(None, Some("0")), &config).count, 0);
		assert_eq!(ListParams::from_query(&query(None, Some("nope")), &config).count, 100);
		assert_eq!(ListParams::from_query(&query(None, Some("25")), &config).count, 25);
	}

	#[test]
	fn test_sort_order() {
		assert_eq!(parse_sort_order(Some("DESCENDING")), SortOrder::Descending);
		assert_eq!(parse_sort_order(Some("ascending")), SortOrder::Ascending);
		assert_eq!(parse_sort_order(Some("sideways")), SortOrder::Ascending);
		assert_eq!(parse_sort_order(None), SortOrder::Ascending);
	}

	#[test]
	fn test_blank_filter_dropped() {
		let q = ListQuery {
			filter: Some("   ".to_string()),
			sort_by: Some("userName".to_string()),
			..Default::default()
		};
		let params = ListParams::from_query(&q, &ScimConfig::default());
		assert_eq!(params.filter, None);
		assert_eq!(params.sort_by.as_deref(), Some("userName"));
	}

	#[test]
	fn test_query_deserializes_camel_case() {
		let q: ListQuery = serde_json::from_value(serde_json::json!({
			"startIndex": "3",
			"count": "10",
			"sortOrder": "descending"
		}))
		.unwrap();
		let params = ListParams::from_query(&q, &ScimConfig::default());
		assert_eq!(params.start_index, 3);
		assert_eq!(params.count, 10);
		assert_eq!(params.skip(), 2);
		assert_eq!(params.sort_order, SortOrder::Descending);
	}

	proptest! {
		#[test]
		fn params_always_in_range(start in ".{0,8}", count in ".{0,8}") {
			let config = ScimConfig::default();
			let params = ListParams::from_query(&query(Some(&start), Some(&count)), &config);
			prop_assert!(params.start_index >= 1);
			prop_assert!(params.count <= config.max_results);
		}
	}
}
