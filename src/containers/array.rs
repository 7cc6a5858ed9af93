use std::slice::Iter;

use super::ContainerError;

/// Ordered sequence backing the language's `Array` type.
#[derive(Debug, Clone, Default)]
pub struct SchemaArray<T> {
    items: Vec<T>,
}

impl<T> SchemaArray<T> {
    pub fn new() -> Self {
        SchemaArray { items: vec![] }
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        SchemaArray { items }
    }

    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    pub fn pop(&mut self) -> Result<T, ContainerError> {
        self.items.pop().ok_or(ContainerError::Empty {
            container: "array",
            operation: "pop",
        })
    }

    pub fn get(&self, index: i64) -> Result<&T, ContainerError> {
        let position = self.check_index(index)?;
        Ok(&self.items[position])
    }

    pub fn set(&mut self, index: i64, value: T) -> Result<(), ContainerError> {
        let position = self.check_index(index)?;
        self.items[position] = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.items.iter()
    }

    fn check_index(&self, index: i64) -> Result<usize, ContainerError> {
        if index < 0 || index as usize >= self.items.len() {
            Err(ContainerError::IndexOutOfBounds {
                index,
                length: self.items.len(),
            })
        } else {
            Ok(index as usize)
        }
    }
}

impl<T: Clone> SchemaArray<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}
