//! Tree walking interpreter.
//!
//! Evaluates an annotated program statement by statement. Values carry
//! their static type (`TypedValue`); containers are shared handles, so
//! copying a binding aliases its container. Statements report a
//! `Completion` and runtime failures travel as `Err(Error)`.

pub mod environment;
pub mod expr;
pub mod interpreter;
pub mod methods;
pub mod natives;
pub mod operators;
pub mod stmt;
pub mod value;

#[cfg(test)]
mod tests;
