//! Per-instance sizing parameters.

use crate::error::ConfigError;

/// Number of cells a fresh (or cleared) table starts with.
pub const DEFAULT_INITIAL_CAPACITY: usize = 10;
/// Required ratio of table capacity to `len + 1`; also the growth multiplier.
pub const DEFAULT_LOAD_FACTOR: usize = 2;

/// Sizing parameters carried by each map instance.
///
/// Before every insertion the map keeps `capacity >= (len + 1) * load_factor`,
/// growing the table by `load_factor` when it would not hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapConfig {
    initial_capacity: usize,
    load_factor: usize,
}

impl MapConfig {
    pub const fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    pub fn with_initial_capacity(self, initial_capacity: usize) -> Result<Self, ConfigError> {
        if initial_capacity == 0 {
            return Err(ConfigError::ZeroInitialCapacity);
        }
        Ok(Self {
            initial_capacity,
            ..self
        })
    }

    pub fn with_load_factor(self, load_factor: usize) -> Result<Self, ConfigError> {
        if load_factor < 2 {
            return Err(ConfigError::LoadFactorTooSmall { load_factor });
        }
        Ok(Self {
            load_factor,
            ..self
        })
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn load_factor(&self) -> usize {
        self.load_factor
    }

    /// Cells needed so that `count` entries satisfy the load invariant.
    pub(crate) fn required_cells(&self, count: usize) -> usize {
        count
            .checked_mul(self.load_factor)
            .expect("capacity overflow")
    }

    /// Table size for a map about to receive `n` entries:
    /// `max((n + 1) * load_factor, initial_capacity)`.
    pub(crate) fn capacity_for(&self, n: usize) -> usize {
        let n = n.checked_add(1).expect("capacity overflow");
        self.required_cells(n).max(self.initial_capacity)
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}
