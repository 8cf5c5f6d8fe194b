//! # Raking Core
//!
//! Core data structures and types for survey raking (iterative proportional
//! fitting).
//!
//! Raking computes one weight per sample record so that the weighted
//! distribution of each target variable matches externally known population
//! shares. This crate holds the pieces every other crate in the workspace
//! shares:
//!
//! ## Key Concepts
//!
//! - **RawTargetSpec / TargetSpec**: desired category percentages per column,
//!   before and after validation against the data
//! - **IterationConfig**: iteration limit, tolerance, weight bounds and the
//!   missing-value policy
//! - **Diagnostics**: structured events delivered to a pluggable sink
//! - **Reports**: missing-value audit, fit result and summary rows
//!
//! ## Example
//!
//! ```rust
//! use raking_core::{IterationConfig, RawTargetSpec};
//!
//! let targets = RawTargetSpec::new()
//!     .categories("Gender", [("M", 50.0), ("F", 50.0)]);
//!
//! let config = IterationConfig::builder()
//!     .tol(0.05)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(targets.len(), 1);
//! assert_eq!(config.max_iter, 500);
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod report;
pub mod target;

pub use config::*;
pub use diagnostics::*;
pub use error::*;
pub use report::*;
pub use target::*;
