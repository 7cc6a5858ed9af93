//! Pass 2: tightens inferred placeholders from how they are used.
//!
//! For each function only its own body is examined; nested function
//! declarations are refined separately and never contribute constraints to
//! the enclosing function. One pass, no fixed point: a refinement made here
//! is not fed back into other functions.

use std::collections::HashMap;

use log::debug;

use crate::ast::{
    ast::Program,
    expressions::{Expr, ExprKind},
    statements::{Block, FunctionDecl, Parameter, Stmt, StmtKind},
    types::{Type, TypeAnnotation},
};

use super::{
    compat::{fold_union, iteration_type},
    infer::infer_expression,
    type_checker::{resolve_annotation, FunctionSignature, TypeChecker},
};

pub fn refine_program(checker: &mut TypeChecker, program: &Program) -> Program {
    checker.reset();

    Program {
        body: refine_stmts(checker, &program.body),
        span: program.span.clone(),
    }
}

fn resolve_or_weak(annotation: Option<&TypeAnnotation>) -> Type {
    annotation
        .and_then(|annotation| resolve_annotation(annotation).ok())
        .unwrap_or(Type::Weak)
}

fn refine_stmts(checker: &mut TypeChecker, stmts: &[Stmt]) -> Vec<Stmt> {
    stmts.iter().map(|stmt| refine_stmt(checker, stmt)).collect()
}

fn refine_block(checker: &mut TypeChecker, block: &Block) -> Block {
    Block {
        body: checker.scoped(|checker| refine_stmts(checker, &block.body)),
        span: block.span.clone(),
    }
}

fn refine_stmt(checker: &mut TypeChecker, stmt: &Stmt) -> Stmt {
    let kind = match &stmt.kind {
        StmtKind::FunctionDeclaration(function) => {
            StmtKind::FunctionDeclaration(refine_function(checker, function))
        }
        StmtKind::VariableDeclaration(declaration) => {
            checker.bind(
                &declaration.name,
                resolve_or_weak(declaration.annotation.as_ref()),
            );
            stmt.kind.clone()
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => StmtKind::If {
            condition: condition.clone(),
            then_branch: refine_block(checker, then_branch),
            else_branch: else_branch
                .as_ref()
                .map(|else_branch| Box::new(refine_stmt(checker, else_branch))),
        },
        StmtKind::While { condition, body } => StmtKind::While {
            condition: condition.clone(),
            body: refine_block(checker, body),
        },
        StmtKind::Until { condition, body } => StmtKind::Until {
            condition: condition.clone(),
            body: refine_block(checker, body),
        },
        StmtKind::For {
            variable,
            iterable,
            body,
        } => {
            let element = iteration_type(&infer_expression(checker, iterable)).unwrap_or(Type::Weak);
            let body = checker.scoped(|checker| {
                checker.bind(variable, element);
                refine_block(checker, body)
            });
            StmtKind::For {
                variable: variable.clone(),
                iterable: iterable.clone(),
                body,
            }
        }
        StmtKind::Block(block) => StmtKind::Block(refine_block(checker, block)),
        StmtKind::Assignment { .. } | StmtKind::Return(_) | StmtKind::Expression(_) => {
            stmt.kind.clone()
        }
    };

    Stmt::new(kind, stmt.span.clone())
}

fn signature_of(function: &FunctionDecl) -> FunctionSignature {
    FunctionSignature::new(
        function
            .parameters
            .iter()
            .map(|parameter| resolve_or_weak(parameter.annotation.as_ref()))
            .collect(),
        resolve_or_weak(function.return_type.as_ref()),
        false,
    )
}

fn refine_function(checker: &mut TypeChecker, function: &FunctionDecl) -> FunctionDecl {
    let signature = signature_of(function);

    // Only placeholders written by inference are candidates.
    let weak_params: Vec<String> = function
        .parameters
        .iter()
        .zip(&signature.params)
        .filter(|(parameter, ty)| parameter.inferred && **ty == Type::Weak && parameter.name != "_")
        .map(|(parameter, _)| parameter.name.clone())
        .collect();

    let constraints = checker.scoped(|checker| {
        for (parameter, ty) in function.parameters.iter().zip(&signature.params) {
            checker.bind(&parameter.name, ty.clone());
        }
        checker
            .function_env
            .insert(function.name.clone(), signature.clone());

        let mut constraints = Constraints::new(&weak_params);
        constraints.collect_stmts(checker, &function.body.body);
        constraints
    });

    let mut params = signature.params.clone();
    let parameters: Vec<Parameter> = function
        .parameters
        .iter()
        .enumerate()
        .map(|(i, parameter)| {
            let found = constraints.params.get(&parameter.name);
            match found {
                Some(found) if found.len() == 1 && weak_params.contains(&parameter.name) => {
                    debug!(
                        "refined parameter `{}` of `{}` to {}",
                        parameter.name, function.name, found[0]
                    );
                    params[i] = found[0].clone();
                    Parameter {
                        annotation: Some(TypeAnnotation::from_type(&found[0], &parameter.span.start)),
                        ..parameter.clone()
                    }
                }
                _ => parameter.clone(),
            }
        })
        .collect();

    let mut return_type = signature.return_type.clone();
    let mut return_annotation = function.return_type.clone();
    if function.return_inferred && return_type == Type::Void {
        let folded = constraints
            .returns
            .iter()
            .cloned()
            .reduce(fold_union)
            .unwrap_or(Type::Void);
        if folded != Type::Void {
            debug!("refined return type of `{}` to {}", function.name, folded);
            return_annotation = Some(TypeAnnotation::from_type(&folded, &function.body.span.start));
            return_type = folded;
        }
    }

    let refined = FunctionSignature::new(params, return_type, false);

    // Nested functions are refined with this function's refined parameters in scope.
    let body = checker.scoped(|checker| {
        for (parameter, ty) in parameters.iter().zip(&refined.params) {
            checker.bind(&parameter.name, ty.clone());
        }
        checker
            .function_env
            .insert(function.name.clone(), refined.clone());
        refine_stmts(checker, &function.body.body)
    });

    checker.function_env.insert(function.name.clone(), refined);

    FunctionDecl {
        name: function.name.clone(),
        parameters,
        return_type: return_annotation,
        return_inferred: function.return_inferred,
        body: Block {
            body,
            span: function.body.span.clone(),
        },
    }
}

/// Evidence gathered from one function body.
struct Constraints<'a> {
    weak_params: &'a [String],
    /// Distinct constraints per parameter, in the order they were found.
    params: HashMap<String, Vec<Type>>,
    returns: Vec<Type>,
}

impl<'a> Constraints<'a> {
    fn new(weak_params: &'a [String]) -> Self {
        Constraints {
            weak_params,
            params: HashMap::new(),
            returns: vec![],
        }
    }

    fn add(&mut self, name: &str, ty: Type) {
        let found = self.params.entry(name.to_string()).or_default();
        if !found.contains(&ty) {
            debug!("constraint on `{}`: {}", name, ty);
            found.push(ty);
        }
    }

    /// The parameter named by `expr` if it is still an unshadowed weak parameter.
    fn weak_param<'e>(&self, checker: &TypeChecker, expr: &'e Expr) -> Option<&'e str> {
        match &expr.kind {
            ExprKind::Identifier(name)
                if self.weak_params.contains(name)
                    && checker.type_env.get(name) == Some(&Type::Weak) =>
            {
                Some(name)
            }
            _ => None,
        }
    }

    fn collect_stmts(&mut self, checker: &mut TypeChecker, stmts: &[Stmt]) {
        for stmt in stmts {
            self.collect_stmt(checker, stmt);
        }
    }

    fn collect_block(&mut self, checker: &mut TypeChecker, block: &Block) {
        checker.scoped(|checker| self.collect_stmts(checker, &block.body));
    }

    fn collect_stmt(&mut self, checker: &mut TypeChecker, stmt: &Stmt) {
        match &stmt.kind {
            // Not entered; only its signature becomes visible.
            StmtKind::FunctionDeclaration(function) => {
                checker
                    .function_env
                    .insert(function.name.clone(), signature_of(function));
            }
            StmtKind::VariableDeclaration(declaration) => {
                self.collect_expr(checker, &declaration.value);
                checker.bind(
                    &declaration.name,
                    resolve_or_weak(declaration.annotation.as_ref()),
                );
            }
            StmtKind::Assignment { target, value } => {
                self.collect_expr(checker, target);
                self.collect_expr(checker, value);
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.collect_expr(checker, condition);
                self.collect_block(checker, then_branch);
                if let Some(else_branch) = else_branch {
                    self.collect_stmt(checker, else_branch);
                }
            }
            StmtKind::While { condition, body } | StmtKind::Until { condition, body } => {
                self.collect_expr(checker, condition);
                self.collect_block(checker, body);
            }
            StmtKind::For {
                variable,
                iterable,
                body,
            } => {
                self.collect_expr(checker, iterable);
                let element = iteration_type(&infer_expression(checker, iterable)).unwrap_or(Type::Weak);
                checker.scoped(|checker| {
                    checker.bind(variable, element);
                    self.collect_block(checker, body);
                });
            }
            StmtKind::Return(value) => match value {
                Some(value) => {
                    self.collect_expr(checker, value);
                    self.returns.push(infer_expression(checker, value));
                }
                None => self.returns.push(Type::Void),
            },
            StmtKind::Block(block) => self.collect_block(checker, block),
            StmtKind::Expression(expr) => self.collect_expr(checker, expr),
        }
    }

    fn collect_expr(&mut self, checker: &TypeChecker, expr: &Expr) {
        match &expr.kind {
            ExprKind::Binary { left, right, .. } => {
                if let Some(name) = self.weak_param(checker, left) {
                    let other = infer_expression(checker, right);
                    if other.is_concrete() {
                        self.add(name, other);
                    }
                }
                if let Some(name) = self.weak_param(checker, right) {
                    let other = infer_expression(checker, left);
                    if other.is_concrete() {
                        self.add(name, other);
                    }
                }
                self.collect_expr(checker, left);
                self.collect_expr(checker, right);
            }
            ExprKind::Index { object, index } => {
                if let Some(name) = self.weak_param(checker, object) {
                    self.add(name, Type::array(Type::Weak));
                }
                self.collect_expr(checker, object);
                self.collect_expr(checker, index);
            }
            ExprKind::Array(elements) | ExprKind::Tuple(elements) => {
                for element in elements {
                    self.collect_expr(checker, element);
                }
            }
            ExprKind::Record(fields) => {
                for (_, value) in fields {
                    self.collect_expr(checker, value);
                }
            }
            ExprKind::Unary { operand, .. } | ExprKind::TypeOf(operand) => {
                self.collect_expr(checker, operand)
            }
            ExprKind::Call { callee, arguments } => {
                self.collect_expr(checker, callee);
                for argument in arguments {
                    self.collect_expr(checker, argument);
                }
            }
            ExprKind::Member { object, .. } => self.collect_expr(checker, object),
            ExprKind::Range { start, end, .. } => {
                self.collect_expr(checker, start);
                if let Some(end) = end {
                    self.collect_expr(checker, end);
                }
            }
            ExprKind::Assert { condition, message } => {
                self.collect_expr(checker, condition);
                self.collect_expr(checker, message);
            }
            ExprKind::Integer(_)
            | ExprKind::Float(_)
            | ExprKind::Str(_)
            | ExprKind::Boolean(_)
            | ExprKind::Identifier(_) => {}
        }
    }
}
