// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
	Eq,
	Co,
	Sw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
	And,
	Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
	Present {
		attr_path: String,
	},
	/// `value` is `None` when the operand after the operator is missing.
	Compare {
		attr_path: String,
		op: CompareOp,
		value: Option<String>,
	},
	Logical {
		op: LogicalOp,
		left: Box<Filter>,
		right: Box<Filter>,
	},
	/// A primary expression that could not be read.
	Missing,
}

impl Filter {
	pub fn and(left: Filter, right: Filter) -> Self {
		Filter::Logical {
			op: LogicalOp::And,
			left: Box::new(left),
			right: Box::new(right),
		}
	}

	pub fn or(left: Filter, right: Filter) -> Self {
		Filter::Logical {
			op: LogicalOp::Or,
			left: Box::new(left),
			right: Box::new(right),
		}
	}

	/// Whether any leaf of the tree is incomplete.
	pub fn is_incomplete(&self) -> bool {
		match self {
			Filter::Present { .. } => false,
			Filter::Compare { value, .. } => value.is_none(),
			Filter::Logical { left, right, .. } => left.is_incomplete() || right.is_incomplete(),
			Filter::Missing => true,
		}
	}
}
