//! Insertion-ordered mapping from dotted parameter names to tensors.

use std::collections::HashMap;

use crate::tensor::{RawTensor, Shape};

/// The full parameter table of a checkpoint.
///
/// Iteration follows insertion order, which the checkpoint reader sets to
/// parameter-name order. Architecture inference relies on this for its
/// "first matching entry wins" rules, so the table never reorders entries.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    entries: Vec<(String, RawTensor)>,
    index: HashMap<String, usize>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts a tensor at the end of the table.
    ///
    /// Re-inserting an existing name replaces the tensor but keeps its
    /// original position, and returns the previous tensor.
    pub fn insert(&mut self, name: impl Into<String>, tensor: RawTensor) -> Option<RawTensor> {
        let name = name.into();
        if let Some(&pos) = self.index.get(&name) {
            return Some(std::mem::replace(&mut self.entries[pos].1, tensor));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, tensor));
        None
    }

    pub fn get(&self, name: &str) -> Option<&RawTensor> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn shape(&self, name: &str) -> Option<&Shape> {
        self.get(name).map(RawTensor::shape)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawTensor)> + '_ {
        self.entries.iter().map(|(name, t)| (name.as_str(), t))
    }

    /// Parameter names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl FromIterator<(String, RawTensor)> for ParameterTable {
    fn from_iter<I: IntoIterator<Item = (String, RawTensor)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut table = ParameterTable::with_capacity(iter.size_hint().0);
        for (name, tensor) in iter {
            table.insert(name, tensor);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::DType;

    fn t(shape: &[usize]) -> RawTensor {
        RawTensor::zeros(DType::F32, shape)
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut table = ParameterTable::new();
        table.insert("z.weight", t(&[1]));
        table.insert("a.weight", t(&[2]));
        table.insert("m.weight", t(&[3]));

        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["z.weight", "a.weight", "m.weight"]);
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut table = ParameterTable::new();
        table.insert("first", t(&[1]));
        table.insert("second", t(&[2]));
        let previous = table.insert("first", t(&[5, 5]));

        assert_eq!(previous.unwrap().shape(), &Shape::from([1]));
        assert_eq!(table.len(), 2);
        assert_eq!(table.names().next(), Some("first"));
        assert_eq!(table.shape("first"), Some(&Shape::from([5, 5])));
    }

    #[test]
    fn test_lookup() {
        let table: ParameterTable = vec![("x".to_string(), t(&[4, 2]))].into_iter().collect();

        assert!(table.contains("x"));
        assert!(!table.contains("y"));
        assert!(table.get("y").is_none());
        assert_eq!(table.shape("x").and_then(Shape::as_2d), Some((4, 2)));
    }
}
