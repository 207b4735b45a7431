//! Utility modules

pub mod csv_storage;
pub mod memory_storage;
pub mod validation;

pub use csv_storage::*;
pub use memory_storage::*;
pub use validation::*;
