//! The weight table: deduplicated storage for complex weight values.
//!
//! Weights are referenced everywhere by [`WeightId`] handles, so comparing
//! two weights is an integer comparison. The table is append-only; slots 0
//! and 1 are seeded with the values 0 and 1 so [`WeightId::ZERO`] and
//! [`WeightId::ONE`] are valid from the start.

use crate::types::WeightId;
use crate::value::Value;

pub struct WeightTable {
    values: Vec<Value>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self {
            values: vec![Value::zero(), Value::one()],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the stored value for a handle.
    pub fn value(&self, id: WeightId) -> Value {
        self.values[id.index()]
    }

    /// Interns a value, returning the existing handle if it is already
    /// present.
    ///
    /// The scan is linear: distinct weights stay rare (a few hundred for
    /// realistic circuits), and a handle must never be duplicated.
    pub fn put(&mut self, value: Value) -> WeightId {
        if let Some(i) = self.values.iter().position(|&v| v == value) {
            return WeightId::new(i as u32);
        }
        let id = WeightId::new(self.values.len() as u32);
        self.values.push(value);
        id
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::new()
    }
}
