//! # Intercompany Consolidation
//!
//! Reconciles intercompany transactions across a group of related companies
//! and produces a consolidated profit-and-loss summary with internal
//! activity eliminated.
//!
//! ## Features
//!
//! - **Classification**: every ledger row is tagged Internal (both parties in the group) or External
//! - **Pair matching**: internal rows are summed per unordered entity pair
//! - **Mismatch detection**: every pair must net to zero, otherwise the run is rejected with a full report
//! - **Eliminations**: one reversing entry per internal row
//! - **Consolidated summary**: revenue, expense and net profit from external rows only
//! - **Storage abstraction**: CSV and in-memory sources behind async traits
//!
//! ## Quick Start
//!
//! ```rust
//! use intercompany_consolidation::{consolidate, ConsolidationConfig, GroupMembers, TransactionRecord};
//! use bigdecimal::BigDecimal;
//!
//! let group = GroupMembers::new(["A", "B"]).unwrap();
//! let records = vec![
//!     TransactionRecord::revenue("T1", "A", "Customer", BigDecimal::from(1000), "Sale"),
//!     TransactionRecord::revenue("T2", "A", "B", BigDecimal::from(200), "Service to B"),
//!     TransactionRecord::expense("T3", "B", "A", BigDecimal::from(-200), "Service from A"),
//! ];
//!
//! let report = consolidate(records, &ConsolidationConfig::new(group)).unwrap();
//! assert_eq!(report.consolidated.total_revenue, BigDecimal::from(1000));
//! ```

pub mod config;
pub mod consolidation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use consolidation::*;
pub use traits::*;
pub use types::*;
