/// AST (Abstract Syntax Tree) module
///
/// Submodules:
/// - ast: the `Program` root
/// - expressions: expression nodes and operators
/// - statements: statement nodes, blocks, declarations
/// - types: `Type` and the `TypeAnnotation` syntax it is resolved from
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
