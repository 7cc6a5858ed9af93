use crate::Span;

use super::statements::{Block, Stmt, StmtKind};

/// A parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    /// Whether every declaration, at any depth, carries a type annotation.
    pub fn is_fully_annotated(&self) -> bool {
        self.body.iter().all(stmt_is_annotated)
    }
}

fn block_is_annotated(block: &Block) -> bool {
    block.body.iter().all(stmt_is_annotated)
}

fn stmt_is_annotated(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::FunctionDeclaration(function) => {
            function.return_type.is_some()
                && function
                    .parameters
                    .iter()
                    .all(|parameter| parameter.annotation.is_some())
                && block_is_annotated(&function.body)
        }
        StmtKind::VariableDeclaration(declaration) => declaration.annotation.is_some(),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            block_is_annotated(then_branch)
                && else_branch.as_deref().map_or(true, stmt_is_annotated)
        }
        StmtKind::While { body, .. } | StmtKind::Until { body, .. } | StmtKind::For { body, .. } => {
            block_is_annotated(body)
        }
        StmtKind::Block(block) => block_is_annotated(block),
        StmtKind::Assignment { .. } | StmtKind::Return(_) | StmtKind::Expression(_) => true,
    }
}
