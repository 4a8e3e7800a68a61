//! Error types returned by the map and its configuration.

use core::fmt;

/// Returned by `insert` when the key is already present. The map is left
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    DuplicateKey,
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateKey => f.write_str("key already present in map"),
        }
    }
}

impl std::error::Error for InsertError {}

/// Returned by `at` when no entry matches the queried key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no entry for the requested key")
    }
}

impl std::error::Error for KeyNotFound {}

/// Rejected `MapConfig` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The table must start with at least one cell.
    ZeroInitialCapacity,
    /// Growth multiplies capacity by the load factor, so it must be at least 2.
    LoadFactorTooSmall { load_factor: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroInitialCapacity => f.write_str("initial capacity must be non-zero"),
            ConfigError::LoadFactorTooSmall { load_factor } => {
                write!(f, "load factor must be at least 2, got {load_factor}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
