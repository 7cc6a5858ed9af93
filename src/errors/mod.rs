//! Error types shared by every phase.
//!
//! A single `Error` carries an `ErrorImpl` variant, the source position it
//! was raised at and the `ErrorFamily` (syntax, type or runtime) of the
//! phase that raised it. `get_tip` turns a variant into a short suggestion
//! for the caret diagram printed by `format_error`.

pub mod errors;
