//! Table rows
//!
//! A tuple is one row: a fixed-length sequence of typed values in storage
//! order (the order columns were supplied at load, never permuted
//! afterward) plus the query membership flag. Arity and element types are
//! validated by the table at ingest, so a tuple inside a table always
//! matches its columns.

use serde::{Deserialize, Serialize};

use crate::value::DataValue;

/// One row of the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    elements: Vec<DataValue>,
    query_flag: bool,
}

impl Tuple {
    /// Create a row from its elements, outside any query
    pub fn new(elements: Vec<DataValue>) -> Self {
        Self {
            elements,
            query_flag: false,
        }
    }

    /// The element at a storage slot
    pub fn element(&self, slot: usize) -> Option<&DataValue> {
        self.elements.get(slot)
    }

    /// All elements in storage order
    pub fn elements(&self) -> &[DataValue] {
        &self.elements
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the row has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether the row is in the active query's subset
    pub fn query_flag(&self) -> bool {
        self.query_flag
    }

    pub(crate) fn set_query_flag(&mut self, flag: bool) {
        self.query_flag = flag;
    }
}

impl From<Vec<DataValue>> for Tuple {
    fn from(elements: Vec<DataValue>) -> Self {
        Self::new(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_accessors() {
        let tuple = Tuple::new(vec![DataValue::Real(1.0), DataValue::Category("a".into())]);
        assert_eq!(tuple.len(), 2);
        assert_eq!(tuple.element(0), Some(&DataValue::Real(1.0)));
        assert_eq!(tuple.element(2), None);
        assert!(!tuple.query_flag());
    }

    #[test]
    fn test_query_flag() {
        let mut tuple = Tuple::new(vec![DataValue::Real(1.0)]);
        tuple.set_query_flag(true);
        assert!(tuple.query_flag());
    }
}
