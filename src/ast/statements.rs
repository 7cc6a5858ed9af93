//! Statement nodes.

use crate::{Position, Span};

use super::{expressions::Expr, types::TypeAnnotation};

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    pub fn position(&self) -> Position {
        self.span.start.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    FunctionDeclaration(FunctionDecl),
    VariableDeclaration(VarDecl),
    /// `target = value`. The target is an identifier, an index expression or `_`.
    Assignment {
        target: Expr,
        value: Expr,
    },
    If {
        condition: Expr,
        then_branch: Block,
        /// Either a block or a chained `if`.
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    Until {
        condition: Expr,
        body: Block,
    },
    For {
        variable: String,
        iterable: Expr,
        body: Block,
    },
    Return(Option<Expr>),
    Block(Block),
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub annotation: Option<TypeAnnotation>,
    /// Set when the annotation was filled in by inference rather than written.
    pub inferred: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub return_inferred: bool,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub annotation: Option<TypeAnnotation>,
    pub inferred: bool,
    pub value: Expr,
}
