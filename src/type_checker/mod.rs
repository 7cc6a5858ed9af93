//! Type checking module.
//!
//! Three passes over the AST, all driven by one `TypeChecker`:
//!
//! - `infer` writes a type annotation on every declaration that lacks one
//! - `refine` tightens inferred `weak` parameters and `void` returns from usage
//! - `check` verifies the fully annotated program
//!
//! Compatibility is decided by `compat::types_equal`, which treats `weak`
//! and `poly` as wildcards and is asymmetric for unions and intersections.

pub mod builtins;
pub mod check;
pub mod compat;
pub mod infer;
pub mod refine;
pub mod type_checker;

#[cfg(test)]
mod tests;
