#![allow(clippy::module_inception)]

use std::{fmt::Write, rc::Rc};

use log::debug;

use crate::{
    errors::errors::{Error, ErrorTip},
    interpreter::interpreter::evaluate,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, TypeChecker},
};

pub mod ast;
pub mod containers;
pub mod errors;
pub mod interpreter;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// A point in a source file. Lines and columns start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(line: u32, column: u32, file: Rc<String>) -> Self {
        Position { line, column, file }
    }

    pub fn null() -> Self {
        Position::new(0, 0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }

    /// From the start of `self` to the end of `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span {
            start: self.start.clone(),
            end: other.end.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Name used in positions and error reports.
    pub file_name: String,
    /// Run `refine` and `check` before evaluating. Inference always runs.
    pub type_check: bool,
    /// Print each output line as soon as it is produced.
    pub echo: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            file_name: String::from("shell"),
            type_check: true,
            echo: false,
        }
    }
}

/// Tokenizes, parses, checks and evaluates a program.
///
/// Returns every line printed, including those printed before a runtime
/// error stopped evaluation.
pub fn run_source(source: &str, options: &RunOptions) -> (Vec<String>, Option<Error>) {
    let tokens = match tokenize(source.to_string(), Some(options.file_name.clone())) {
        Ok(tokens) => tokens,
        Err(error) => return (vec![], Some(error)),
    };
    debug!("tokenized {} tokens", tokens.len());

    let program = match parse(tokens, Rc::new(options.file_name.clone())) {
        (_, Ok(program)) => program,
        (_, Err(error)) => return (vec![], Some(error)),
    };

    let program = if options.type_check {
        match type_check(program) {
            (_, Ok(program)) => program,
            (_, Err(error)) => return (vec![], Some(error)),
        }
    } else {
        match TypeChecker::new().infer(&program) {
            Ok(program) => program,
            Err(error) => return (vec![], Some(error)),
        }
    };

    evaluate(&program, options)
}

/// The source line with the given 1-based number.
pub fn get_line_at_position(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }
    source.lines().nth(line as usize - 1)
}

/// Renders an error with the offending line and a caret under the column.
///
/// ```text
/// Error: TypeMatchError (Expected type `int`, received `string`)
/// -> main.schema
///    |
/// 20 | let a: int = "a";
///    | -------------^
/// ```
pub fn format_error(error: &Error, source: &str) -> String {
    let position = error.get_position();
    let mut rendered = String::new();

    let _ = match error.get_tip() {
        ErrorTip::None => writeln!(rendered, "Error: {}", error.get_error_name()),
        tip => writeln!(rendered, "Error: {} ({})", error.get_error_name(), tip),
    };
    let _ = writeln!(rendered, "-> {}:{}:{}", position.file, position.line, position.column);

    let Some(line_text) = get_line_at_position(source, position.line) else {
        let _ = write!(rendered, "   {}", error);
        return rendered;
    };

    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(line_text);
    let _ = writeln!(rendered, "{:>padding$}", "|");
    let _ = writeln!(rendered, "{} | {}", line_string, line_text_removed.trim_end());

    let arrows = (position.column as usize).saturating_sub(removed_whitespace).max(1);
    let _ = write!(rendered, "{:>padding$} {:->arrows$}", "|", "^");

    rendered
}

fn remove_starting_whitespace(string: &str) -> (&str, usize) {
    let trimmed = string.trim_start_matches([' ', '\t']);
    (trimmed, string.len() - trimmed.len())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::{
        errors::errors::{Error, ErrorImpl},
        Position,
    };

    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\nsecond\n\n    Testing { }\n";

        assert_eq!(super::get_line_at_position(source, 1), Some("Hello, world!"));
        assert_eq!(super::get_line_at_position(source, 4), Some("    Testing { }"));
        assert_eq!(super::get_line_at_position(source, 9), None);
        assert_eq!(super::get_line_at_position(source, 0), None);
    }

    #[test]
    fn test_format_error_points_at_column() {
        let source = "let a = 1;\n  let b: int = \"x\";\n";
        let error = Error::new(
            ErrorImpl::TypeMatchError {
                expected: "int".to_string(),
                received: "string".to_string(),
            },
            Position::new(2, 16, Rc::new("main.schema".to_string())),
        );

        let rendered = super::format_error(&error, source);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Error: TypeMatchError (Expected type `int`, received `string`)");
        assert_eq!(lines[1], "-> main.schema:2:16");
        assert_eq!(lines[3], "2 | let b: int = \"x\";");
        assert_eq!(lines[4], "  | -------------^");
    }
}
