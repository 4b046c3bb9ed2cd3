// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SCIM filter expressions.
//!
//! A filter string goes through three stages:
//!
//! 1. [`tokenize`] splits it into [`Token`]s,
//! 2. [`FilterParser`] builds a [`Filter`] tree (`or` binds loosest, then `and`),
//! 3. [`compile_filter`] turns the tree into a store-agnostic [`Predicate`].
//!
//! None of the stages fail. Incomplete input yields [`Filter::Missing`] leaves,
//! which compile to [`Predicate::Nothing`].

pub mod ast;
pub mod compile;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use ast::{CompareOp, Filter, LogicalOp};
pub use compile::{compile_filter, Predicate};
pub use eval::Collation;
pub use lexer::{tokenize, Token};
pub use parser::FilterParser;
