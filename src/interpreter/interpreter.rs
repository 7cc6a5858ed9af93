use std::rc::Rc;

use log::{debug, trace};

use crate::{
    ast::{ast::Program, statements::Block},
    errors::errors::{Error, ErrorImpl},
    Position, RunOptions,
};

use super::{
    environment::{EnvRef, Environment},
    natives::install_natives,
    stmt::execute_statement,
    value::{TypedValue, Value},
};

/// How a statement finished. Errors travel separately as `Err`.
pub enum Completion {
    Normal,
    Return(TypedValue),
}

/// Tree walking evaluator.
///
/// `env` is the frame statements currently bind into. Natives live in
/// `globals`, the root every program frame descends from.
pub struct Interpreter {
    pub env: EnvRef,
    pub globals: EnvRef,
    output: Vec<String>,
    options: RunOptions,
}

impl Interpreter {
    pub fn new(options: RunOptions) -> Self {
        let globals = Environment::new(None);
        install_natives(&globals);

        Interpreter {
            env: Environment::new(Some(globals.clone())),
            globals,
            output: vec![],
            options,
        }
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn into_output(self) -> Vec<String> {
        self.output
    }

    /// Records one printed line.
    pub fn emit(&mut self, line: String) {
        if self.options.echo {
            println!("{}", line);
        }
        self.output.push(line);
    }

    pub fn run(&mut self, program: &Program) -> Result<(), Error> {
        for stmt in &program.body {
            if let Completion::Return(_) = execute_statement(self, stmt)? {
                return Err(Error::runtime(ErrorImpl::ReturnOutsideFunction, stmt.position()));
            }
        }
        debug!("program finished with {} output lines", self.output.len());
        Ok(())
    }

    /// Runs `f` with `env` as the current frame, restoring the previous frame afterwards.
    pub fn with_env<T>(&mut self, env: EnvRef, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.env, env);
        let result = f(self);
        self.env = previous;
        result
    }

    /// Runs the statements of `block` in `env`, stopping at the first `return`.
    pub fn execute_block(&mut self, block: &Block, env: EnvRef) -> Result<Completion, Error> {
        self.with_env(env, |interpreter| {
            for stmt in &block.body {
                if let Completion::Return(value) = execute_statement(interpreter, stmt)? {
                    return Ok(Completion::Return(value));
                }
            }
            Ok(Completion::Normal)
        })
    }

    /// A new frame whose parent is the current one.
    pub fn child_env(&self) -> EnvRef {
        Environment::new(Some(self.env.clone()))
    }

    pub fn call_function(
        &mut self,
        callee: &TypedValue,
        arguments: Vec<TypedValue>,
        position: &Position,
    ) -> Result<TypedValue, Error> {
        match &callee.value {
            Value::Native(native) => {
                let native = Rc::clone(native);
                trace!("calling native `{}` with {} arguments", native.name, arguments.len());
                (native.function)(self, arguments, position)
            }
            Value::Function(function) => {
                let expected = function.parameters.len();
                let received = arguments.len();
                if received > expected {
                    return Err(Error::runtime(
                        ErrorImpl::UnexpectedArguments { expected, received },
                        position.clone(),
                    ));
                }
                if received < expected {
                    return Err(Error::runtime(
                        ErrorImpl::MissingArguments { expected, received },
                        position.clone(),
                    ));
                }

                trace!("calling `{}` with {} arguments", function.name, received);

                // Fresh frame from the snapshot; the caller's frames are not reachable.
                let frame = Environment::from_values(function.closure.clone());
                {
                    let mut frame = frame.borrow_mut();
                    frame.define(&function.name, callee.clone());
                    for ((name, ty), argument) in function.parameters.iter().zip(arguments) {
                        frame.define(name, argument.retyped(ty));
                    }
                }

                match self.execute_block(&function.body, frame)? {
                    Completion::Return(value) => Ok(value.retyped(&function.return_type)),
                    Completion::Normal => Ok(TypedValue::void()),
                }
            }
            other => Err(Error::runtime(
                ErrorImpl::NotCallable {
                    type_: other.kind_name().to_string(),
                },
                position.clone(),
            )),
        }
    }
}

/// Runs a checked program and returns every printed line, including those
/// printed before a runtime error.
pub fn evaluate(program: &Program, options: &RunOptions) -> (Vec<String>, Option<Error>) {
    let mut interpreter = Interpreter::new(options.clone());
    let result = interpreter.run(program);
    (interpreter.into_output(), result.err())
}
