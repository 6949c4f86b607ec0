//! Construction-time options for `HashTable`.

use crate::error::{CollectionError, Result};

/// Bucket count of a table built with `HashTable::new()`.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// `len / capacity` ratio at which the next `put` grows the table.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Multiplicative growth step applied on resize.
pub const GROWTH_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub initial_capacity: usize,
    pub load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Rejects a zero bucket count and any load factor that is not a
    /// positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(CollectionError::InvalidConfig(
                "initial capacity must be at least 1".to_string(),
            ));
        }
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(CollectionError::InvalidConfig(format!(
                "load factor must be positive and finite, got {}",
                self.load_factor
            )));
        }
        Ok(())
    }
}

/// Next bucket count after `capacity`. Truncates `capacity * 1.5` but
/// always grows by at least one bucket.
pub(crate) fn grown_capacity(capacity: usize) -> usize {
    let scaled = (capacity as f64 * GROWTH_FACTOR) as usize;
    scaled.max(capacity.saturating_add(1))
}
