//! Lexical analysis.
//!
//! Turns source text into tokens with regex patterns tried in order. Each
//! token carries the line and column span it came from; whitespace and
//! `//` comments are skipped.

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
