use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::errors::errors::ErrorImpl;

use super::value::TypedValue;

pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical frame. Lookups walk up through `parent`.
///
/// `_` is never bound: defining it is a no-op and reading it finds nothing.
#[derive(Default)]
pub struct Environment {
    values: HashMap<String, TypedValue>,
    parent: Option<EnvRef>,
}

impl Environment {
    pub fn new(parent: Option<EnvRef>) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            parent,
        }))
    }

    /// A parentless frame holding `values`.
    pub fn from_values(values: HashMap<String, TypedValue>) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values,
            parent: None,
        }))
    }

    pub fn define(&mut self, name: &str, value: TypedValue) {
        if name == "_" {
            return;
        }
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<TypedValue> {
        if name == "_" {
            return None;
        }

        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref().and_then(|parent| parent.borrow().get(name)),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Rebinds an existing variable in the nearest frame that declares it.
    pub fn set(&mut self, name: &str, value: TypedValue) -> Result<(), ErrorImpl> {
        if name == "_" {
            return Err(ErrorImpl::AssignToDiscard);
        }

        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            return Ok(());
        }

        match &self.parent {
            Some(parent) => parent.borrow_mut().set(name, value),
            None => Err(ErrorImpl::AssignToUndeclared {
                name: name.to_string(),
            }),
        }
    }

    /// Every visible binding in one map; inner frames shadow outer ones.
    pub fn flatten(&self) -> HashMap<String, TypedValue> {
        let mut values = match &self.parent {
            Some(parent) => parent.borrow().flatten(),
            None => HashMap::new(),
        };
        for (name, value) in &self.values {
            values.insert(name.clone(), value.clone());
        }
        values
    }
}
