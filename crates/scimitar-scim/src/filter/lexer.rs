// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use winnow::ascii::Caseless;
use winnow::combinator::{alt, opt};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_while;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	LParen,
	RParen,
	And,
	Or,
	Pr,
	Eq,
	Co,
	Sw,
	Attr(String),
	Str(String),
}

impl Token {
	/// Text carried by attribute and string tokens.
	pub fn literal(&self) -> Option<&str> {
		match self {
			Token::Attr(s) | Token::Str(s) => Some(s),
			_ => None,
		}
	}
}

/// Splits a filter string into tokens, left to right.
///
/// Operator keywords are matched by case-insensitive prefix against the
/// remaining input and consume exactly their own length, so an attribute such
/// as `organization` lexes as `or` followed by `ganization`.
pub fn tokenize(input: &str) -> Vec<Token> {
	let mut rest = input;
	let mut tokens = Vec::new();

	loop {
		rest = rest.trim_start();
		if rest.is_empty() {
			break;
		}
		match token.parse_next(&mut rest) {
			Ok(t) => tokens.push(t),
			Err(_) => break,
		}
	}

	tokens
}

fn token(input: &mut &str) -> Result<Token, ContextError> {
	alt((paren, keyword, quoted, word)).parse_next(input)
}

fn paren(input: &mut &str) -> Result<Token, ContextError> {
	alt(('('.value(Token::LParen), ')'.value(Token::RParen))).parse_next(input)
}

fn keyword(input: &mut &str) -> Result<Token, ContextError> {
	alt((
		Caseless("and").value(Token::And),
		Caseless("or").value(Token::Or),
		Caseless("pr").value(Token::Pr),
		Caseless("eq").value(Token::Eq),
		Caseless("co").value(Token::Co),
		Caseless("sw").value(Token::Sw),
	))
	.parse_next(input)
}

fn quoted(input: &mut &str) -> Result<Token, ContextError> {
	alt((quoted_with('"'), quoted_with('\''))).parse_next(input)
}

// No escapes: the literal runs to the next matching quote, or to the end of
// input when unterminated.
fn quoted_with<'i>(quote: char) -> impl Parser<&'i str, Token, ContextError> {
	(quote, take_while(0.., move |c: char| c != quote), opt(quote))
		.map(|(_, content, _): (char, &str, Option<char>)| Token::Str(content.to_string()))
}

fn word(input: &mut &str) -> Result<Token, ContextError> {
	take_while(1.., |c: char| !c.is_whitespace() && c != '(' && c != ')')
		.map(|word: &str| Token::Attr(word.to_string()))
		.parse_next(input)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn attr(s: &str) -> Token {
		Token::Attr(s.to_string())
	}

	fn string(s: &str) -> Token {
		Token::Str(s.to_string())
	}

	#[test]
	fn test_simple_comparison() {
		assert_eq!(
			tokenize(r#"userName eq "alice""#),
			vec![attr("userName"), Token::Eq, string("alice")]
		);
	}

	#[test]
	fn test_keywords_are_case_insensitive() {
		assert_eq!(
			tokenize(r#"a EQ "x" AND b Pr"#),
			vec![attr("a"), Token::Eq, string("x"), Token::And, attr("b"), Token::Pr]
		);
	}

	#[test]
	fn test_parens_split_words() {
		assert_eq!(
			tokenize(r#"(userName sw "a")"#),
			vec![
				Token::LParen,
				attr("userName"),
				Token::Sw,
				string("a"),
				Token::RParen
			]
		);
	}

	#[test]
	fn test_single_quotes() {
		assert_eq!(
			tokenize("displayName co 'Al'"),
			vec![attr("displayName"), Token::Co, string("Al")]
		);
	}

	#[test]
	fn test_quoted_content_keeps_spaces_and_case() {
		assert_eq!(
			tokenize(r#"x eq "Hello World""#),
			vec![attr("x"), Token::Eq, string("Hello World")]
		);
	}

	#[test]
	fn test_unterminated_string_runs_to_end() {
		assert_eq!(tokenize(r#"x eq "abc"#), vec![attr("x"), Token::Eq, string("abc")]);
	}

	#[test]
	fn test_keyword_prefix_is_greedy() {
		assert_eq!(
			tokenize("organization pr"),
			vec![Token::Or, attr("ganization"), Token::Pr]
		);
		assert_eq!(
			tokenize("equipment pr"),
			vec![Token::Eq, attr("uipment"), Token::Pr]
		);
	}

	#[test]
	fn test_bare_values() {
		assert_eq!(
			tokenize("active eq true"),
			vec![attr("active"), Token::Eq, attr("true")]
		);
	}

	#[test]
	fn test_empty_and_whitespace() {
		assert!(tokenize("").is_empty());
		assert!(tokenize(" \t\n ").is_empty());
	}

	#[test]
	fn test_literal_accessor() {
		assert_eq!(attr("a").literal(), Some("a"));
		assert_eq!(string("b").literal(), Some("b"));
		assert_eq!(Token::And.literal(), None);
	}

	proptest! {
		/// The lexer never panics and always terminates.
		#[test]
		fn tokenize_total(input in ".{0,64}") {
			let _ = tokenize(&input);
		}

		/// Quoted literals are returned verbatim.
		#[test]
		fn quoted_content_verbatim(content in "[^\"]{0,32}") {
			let tokens = tokenize(&format!("a eq \"{}\"", content));
			prop_assert_eq!(tokens.last(), Some(&Token::Str(content)));
		}
	}
}
