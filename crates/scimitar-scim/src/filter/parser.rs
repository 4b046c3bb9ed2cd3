// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use super::ast::{CompareOp, Filter};
use super::lexer::{tokenize, Token};

pub struct FilterParser;

impl FilterParser {
	/// Parses a filter string. Returns `None` when the input holds no tokens.
	///
	/// Parsing never fails: missing operands become [`Filter::Missing`] or a
	/// comparison without a value, an unmatched `(` is closed implicitly, and
	/// tokens left over after the top-level expression are ignored.
	pub fn parse(input: &str) -> Option<Filter> {
		let tokens = tokenize(input);
		if tokens.is_empty() {
			return None;
		}
		let mut cursor = TokenCursor {
			tokens: &tokens,
			pos: 0,
		};
		Some(cursor.parse_or_expr())
	}
}

struct TokenCursor<'a> {
	tokens: &'a [Token],
	pos: usize,
}

impl<'a> TokenCursor<'a> {
	fn peek(&self) -> Option<&'a Token> {
		self.tokens.get(self.pos)
	}

	fn advance(&mut self) -> Option<&'a Token> {
		let token = self.tokens.get(self.pos);
		if token.is_some() {
			self.pos += 1;
		}
		token
	}

	fn parse_or_expr(&mut self) -> Filter {
		let mut result = self.parse_and_expr();
		while self.peek() == Some(&Token::Or) {
			self.pos += 1;
			let right = self.parse_and_expr();
			result = Filter::or(result, right);
		}
		result
	}

	fn parse_and_expr(&mut self) -> Filter {
		let mut result = self.parse_primary();
		while self.peek() == Some(&Token::And) {
			self.pos += 1;
			let right = self.parse_primary();
			result = Filter::and(result, right);
		}
		result
	}

	fn parse_primary(&mut self) -> Filter {
		match self.advance() {
			Some(Token::LParen) => {
				let expr = self.parse_or_expr();
				if self.peek() == Some(&Token::RParen) {
					self.pos += 1;
				}
				expr
			}
			Some(Token::Attr(attr_path)) => self.parse_comparison(attr_path),
			_ => Filter::Missing,
		}
	}

	fn parse_comparison(&mut self, attr_path: &str) -> Filter {
		let op = match self.peek() {
			Some(Token::Pr) => {
				self.pos += 1;
				return Filter::Present {
					attr_path: attr_path.to_string(),
				};
			}
			Some(Token::Eq) => CompareOp::Eq,
			Some(Token::Co) => CompareOp::Co,
			Some(Token::Sw) => CompareOp::Sw,
			// A bare attribute is a presence test.
			_ => {
				return Filter::Present {
					attr_path: attr_path.to_string(),
				}
			}
		};
		self.pos += 1;

		// The operand slot is consumed even when it holds a keyword.
		let value = self.advance().and_then(Token::literal).map(str::to_string);

		Filter::Compare {
			attr_path: attr_path.to_string(),
			op,
			value,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::filter::ast::LogicalOp;
	use proptest::prelude::*;

	fn compare(attr: &str, op: CompareOp, value: &str) -> Filter {
		Filter::Compare {
			attr_path: attr.to_string(),
			op,
			value: Some(value.to_string()),
		}
	}

	fn present(attr: &str) -> Filter {
		Filter::Present {
			attr_path: attr.to_string(),
		}
	}

	#[test]
	fn test_simple_eq() {
		let result = FilterParser::parse(r#"userName eq "john""#).unwrap();
		assert_eq!(result, compare("userName", CompareOp::Eq, "john"));
	}

	#[test]
	fn test_and_expr() {
		let result = FilterParser::parse(r#"userName eq "john" and active eq true"#).unwrap();
		assert!(matches!(
			result,
			Filter::Logical {
				op: LogicalOp::And,
				..
			}
		));
	}

	#[test]
	fn test_pr_operator() {
		let result = FilterParser::parse("emails pr").unwrap();
		assert_eq!(result, present("emails"));
	}

	#[test]
	fn test_bare_attribute_is_presence() {
		assert_eq!(FilterParser::parse("title").unwrap(), present("title"));
	}

	#[test]
	fn test_and_binds_tighter_than_or() {
		let result = FilterParser::parse("a pr or b pr and c pr").unwrap();
		assert_eq!(
			result,
			Filter::or(present("a"), Filter::and(present("b"), present("c")))
		);
	}

	#[test]
	fn test_left_associative() {
		let result = FilterParser::parse("a pr and b pr and c pr").unwrap();
		assert_eq!(
			result,
			Filter::and(Filter::and(present("a"), present("b")), present("c"))
		);
	}

	#[test]
	fn test_grouping_overrides_precedence() {
		let result = FilterParser::parse("(a pr or b pr) and c pr").unwrap();
		assert_eq!(
			result,
			Filter::and(Filter::or(present("a"), present("b")), present("c"))
		);
	}

	#[test]
	fn test_parenthesized_conjunction() {
		let result = FilterParser::parse(r#"(userName sw "a") and (displayName co "x")"#).unwrap();
		assert_eq!(
			result,
			Filter::and(
				compare("userName", CompareOp::Sw, "a"),
				compare("displayName", CompareOp::Co, "x")
			)
		);
	}

	#[test]
	fn test_empty_input() {
		assert!(FilterParser::parse("").is_none());
		assert!(FilterParser::parse("   ").is_none());
	}

	#[test]
	fn test_missing_value() {
		let result = FilterParser::parse("userName eq").unwrap();
		assert_eq!(
			result,
			Filter::Compare {
				attr_path: "userName".to_string(),
				op: CompareOp::Eq,
				value: None,
			}
		);
		assert!(result.is_incomplete());
	}

	#[test]
	fn test_keyword_in_value_slot_is_consumed() {
		let result = FilterParser::parse("a eq and b pr").unwrap();
		assert_eq!(
			result,
			Filter::Compare {
				attr_path: "a".to_string(),
				op: CompareOp::Eq,
				value: None,
			}
		);
	}

	#[test]
	fn test_dangling_and() {
		let result = FilterParser::parse("a pr and").unwrap();
		assert_eq!(result, Filter::and(present("a"), Filter::Missing));
	}

	#[test]
	fn test_unmatched_paren_closes_implicitly() {
		let result = FilterParser::parse(r#"(a eq "x""#).unwrap();
		assert_eq!(result, compare("a", CompareOp::Eq, "x"));
	}

	#[test]
	fn test_leading_operator_is_missing() {
		assert_eq!(FilterParser::parse("eq").unwrap(), Filter::Missing);
	}

	#[test]
	fn test_trailing_tokens_ignored() {
		let result = FilterParser::parse(r#"a eq "x" ) b pr"#).unwrap();
		assert_eq!(result, compare("a", CompareOp::Eq, "x"));
	}

	proptest! {
		/// Parsing is total over arbitrary input.
		#[test]
		fn parse_never_panics(input in "[a-z()\" ]{0,48}") {
			let _ = FilterParser::parse(&input);
		}

		/// A simple `attr eq "value"` always parses to exactly that comparison.
		#[test]
		fn simple_eq_roundtrip(attr in "[xyz][a-zA-Z0-9]{0,10}", value in "[^\"]{0,16}") {
			let parsed = FilterParser::parse(&format!("{} eq \"{}\"", attr, value)).unwrap();
			prop_assert_eq!(parsed, compare(&attr, CompareOp::Eq, &value));
		}
	}
}
