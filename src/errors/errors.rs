use std::fmt::Display;

use thiserror::Error;

use crate::{containers::ContainerError, Position};

/// Which phase rejected the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFamily {
    Syntax,
    Type,
    Runtime,
}

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
    family: ErrorFamily,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        let family = error_impl.default_family();
        Error {
            internal_error: error_impl,
            position,
            family,
        }
    }

    /// An error raised while evaluating, whatever its variant.
    pub fn runtime(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
            family: ErrorFamily::Runtime,
        }
    }

    pub fn from_container(error: ContainerError, position: Position) -> Self {
        let error_impl = match error {
            ContainerError::Empty {
                container,
                operation,
            } => ErrorImpl::EmptyContainer {
                container: container.to_string(),
                operation: operation.to_string(),
            },
            ContainerError::IndexOutOfBounds { index, length } => {
                ErrorImpl::IndexOutOfBounds { index, length }
            }
            ContainerError::KeyNotFound => ErrorImpl::KeyNotFound {
                key: String::from("<unknown>"),
            },
            ContainerError::MismatchedRangeBounds { start, end } => ErrorImpl::InvalidRange {
                message: format!("{:?} and {:?} have different lengths", start, end),
            },
        };
        Error::runtime(error_impl, position)
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn family(&self) -> ErrorFamily {
        self.family
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::UndefinedIdentifier { .. } => "UndefinedIdentifier",
            ErrorImpl::UndefinedFunction { .. } => "UndefinedFunction",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ReturnTypeMatchError { .. } => "ReturnTypeMatchError",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::InvalidOperands { .. } => "InvalidOperands",
            ErrorImpl::NotIndexable { .. } => "NotIndexable",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::NotIterable { .. } => "NotIterable",
            ErrorImpl::UnknownProperty { .. } => "UnknownProperty",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::UndefinedVariable { .. } => "UndefinedVariable",
            ErrorImpl::AssignToUndeclared { .. } => "AssignToUndeclared",
            ErrorImpl::AssignToDiscard => "AssignToDiscard",
            ErrorImpl::NonBooleanCondition { .. } => "NonBooleanCondition",
            ErrorImpl::EmptyContainer { .. } => "EmptyContainer",
            ErrorImpl::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            ErrorImpl::KeyNotFound { .. } => "KeyNotFound",
            ErrorImpl::MissingField { .. } => "MissingField",
            ErrorImpl::UnknownMember { .. } => "UnknownMember",
            ErrorImpl::AssertionFailed { .. } => "AssertionFailed",
            ErrorImpl::DivisionByZero => "DivisionByZero",
            ErrorImpl::InvalidRange { .. } => "InvalidRange",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::UndefinedIdentifier { name } => {
                ErrorTip::Suggestion(format!("`{}` is not declared in this scope", name))
            }
            ErrorImpl::UndefinedFunction { name } => {
                ErrorTip::Suggestion(format!("Function `{}` is not declared", name))
            }
            ErrorImpl::UnexpectedArguments { expected, received }
            | ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::ArgumentTypeMatchError { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::ReturnTypeMatchError { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Function returns `{}`, but this returns `{}`",
                    expected, received
                ))
            }
            ErrorImpl::ReturnOutsideFunction => {
                ErrorTip::Suggestion(String::from("`return` can only be used inside a function"))
            }
            ErrorImpl::InvalidOperands {
                operator,
                left,
                right,
            } => ErrorTip::Suggestion(format!(
                "`{}` cannot be applied to `{}` and `{}`",
                operator, left, right
            )),
            ErrorImpl::NotIndexable { type_ } => {
                ErrorTip::Suggestion(format!("Values of type `{}` cannot be indexed", type_))
            }
            ErrorImpl::NotCallable { type_ } => {
                ErrorTip::Suggestion(format!("Values of type `{}` cannot be called", type_))
            }
            ErrorImpl::NotIterable { type_ } => {
                ErrorTip::Suggestion(format!("Values of type `{}` cannot be iterated", type_))
            }
            ErrorImpl::UnknownProperty { type_, property }
            | ErrorImpl::UnknownMember { type_, property } => ErrorTip::Suggestion(format!(
                "`{}` has no member named `{}`",
                type_, property
            )),
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "Only variables, indexes and `_` can be assigned to",
            )),
            ErrorImpl::UndefinedVariable { name } => {
                if name == "_" {
                    ErrorTip::Suggestion(String::from("`_` discards a value and cannot be read"))
                } else {
                    ErrorTip::Suggestion(format!("Variable `{}` not declared", name))
                }
            }
            ErrorImpl::AssignToUndeclared { name } => {
                ErrorTip::Suggestion(format!("Declare `{}` with `let` first", name))
            }
            ErrorImpl::AssignToDiscard => ErrorTip::None,
            ErrorImpl::NonBooleanCondition { type_ } => ErrorTip::Suggestion(format!(
                "Conditions must be `boolean`, found `{}`",
                type_
            )),
            ErrorImpl::EmptyContainer {
                container,
                operation,
            } => ErrorTip::Suggestion(format!(
                "Check `isEmpty()` before calling `{}` on a {}",
                operation, container
            )),
            ErrorImpl::IndexOutOfBounds { index, length } => ErrorTip::Suggestion(format!(
                "Index {} is outside 0..{}",
                index, length
            )),
            ErrorImpl::KeyNotFound { .. } => {
                ErrorTip::Suggestion(String::from("Check `has(key)` before reading a key"))
            }
            ErrorImpl::MissingField { field } => {
                ErrorTip::Suggestion(format!("Record has no field `{}`", field))
            }
            ErrorImpl::AssertionFailed { .. } => ErrorTip::None,
            ErrorImpl::DivisionByZero => ErrorTip::Suggestion(String::from(
                "Integer division and remainder need a non-zero divisor",
            )),
            ErrorImpl::InvalidRange { message } => ErrorTip::Suggestion(message.clone()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}:{}:{}",
            self.internal_error, self.position.file, self.position.line, self.position.column
        )
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Syntax
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },

    // Type
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("identifier {name:?} is not defined")]
    UndefinedIdentifier { name: String },
    #[error("function {name:?} is not defined")]
    UndefinedFunction { name: String },
    #[error("unexpected arguments: expected {expected:?}, received {received:?}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected:?}, received {received:?}")]
    MissingArguments { expected: usize, received: usize },
    #[error("argument types do not match: expected {expected:?}, received {received:?}")]
    ArgumentTypeMatchError { expected: String, received: String },
    #[error("types do not match: expected {expected:?}, received {received:?}")]
    TypeMatchError { expected: String, received: String },
    #[error("return type does not match: expected {expected:?}, received {received:?}")]
    ReturnTypeMatchError { expected: String, received: String },
    #[error("return outside of a function")]
    ReturnOutsideFunction,
    #[error("invalid operands for {operator}: {left} and {right}")]
    InvalidOperands {
        operator: String,
        left: String,
        right: String,
    },
    #[error("type {type_} is not indexable")]
    NotIndexable { type_: String },
    #[error("type {type_} is not callable")]
    NotCallable { type_: String },
    #[error("type {type_} is not iterable")]
    NotIterable { type_: String },
    #[error("type {type_} has no property {property:?}")]
    UnknownProperty { type_: String, property: String },
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,

    // Runtime
    #[error("variable {name:?} is not defined")]
    UndefinedVariable { name: String },
    #[error("cannot assign to undeclared variable {name:?}")]
    AssignToUndeclared { name: String },
    #[error("cannot assign to `_`")]
    AssignToDiscard,
    #[error("condition must be a boolean, found {type_}")]
    NonBooleanCondition { type_: String },
    #[error("cannot {operation} on an empty {container}")]
    EmptyContainer { container: String, operation: String },
    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },
    #[error("key {key} not found")]
    KeyNotFound { key: String },
    #[error("record has no field {field:?}")]
    MissingField { field: String },
    #[error("{type_} has no member {property:?}")]
    UnknownMember { type_: String, property: String },
    #[error("assertion failed: {message}")]
    AssertionFailed { message: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid range: {message}")]
    InvalidRange { message: String },
}

impl ErrorImpl {
    /// The family an error belongs to when raised by the phase that usually raises it.
    pub fn default_family(&self) -> ErrorFamily {
        match self {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. } => ErrorFamily::Syntax,

            ErrorImpl::UnknownType { .. }
            | ErrorImpl::UndefinedIdentifier { .. }
            | ErrorImpl::UndefinedFunction { .. }
            | ErrorImpl::UnexpectedArguments { .. }
            | ErrorImpl::MissingArguments { .. }
            | ErrorImpl::ArgumentTypeMatchError { .. }
            | ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::ReturnTypeMatchError { .. }
            | ErrorImpl::ReturnOutsideFunction
            | ErrorImpl::InvalidOperands { .. }
            | ErrorImpl::NotIndexable { .. }
            | ErrorImpl::NotCallable { .. }
            | ErrorImpl::NotIterable { .. }
            | ErrorImpl::UnknownProperty { .. }
            | ErrorImpl::InvalidAssignmentTarget => ErrorFamily::Type,

            ErrorImpl::UndefinedVariable { .. }
            | ErrorImpl::AssignToUndeclared { .. }
            | ErrorImpl::AssignToDiscard
            | ErrorImpl::NonBooleanCondition { .. }
            | ErrorImpl::EmptyContainer { .. }
            | ErrorImpl::IndexOutOfBounds { .. }
            | ErrorImpl::KeyNotFound { .. }
            | ErrorImpl::MissingField { .. }
            | ErrorImpl::UnknownMember { .. }
            | ErrorImpl::AssertionFailed { .. }
            | ErrorImpl::DivisionByZero
            | ErrorImpl::InvalidRange { .. } => ErrorFamily::Runtime,
        }
    }
}
