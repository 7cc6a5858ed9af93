//! Parser module for building the AST.
//!
//! Transforms the token stream into a `Program`. Expressions use a Pratt
//! parser with NUD (null denotation) and LED (left denotation) handlers and
//! a binding power table for precedence. Type annotations are parsed the
//! same way from their own tables.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
