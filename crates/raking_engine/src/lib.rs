//! # Raking Engine
//!
//! Survey raking (iterative proportional fitting) over in-memory datasets.
//! This crate provides:
//!
//! - Target validation against the observed categories of each column
//! - Missing-value auditing of target columns
//! - The IPF loop, with optional weight trimming
//! - Unweighted / target / weighted comparison tables
//!
//! ## Example
//!
//! ```rust
//! use raking_engine::{DataSet, WeightingSession};
//! use raking_core::{IterationConfig, RawTargetSpec};
//!
//! let genders = std::iter::repeat_n("M", 60).chain(std::iter::repeat_n("F", 40));
//! let dataset = DataSet::from_column("Gender", genders);
//! let targets = RawTargetSpec::new().categories("Gender", [("M", 50.0), ("F", 50.0)]);
//!
//! let session = WeightingSession::new(dataset, &targets).unwrap();
//! let fit = session.fit(&IterationConfig::default()).unwrap();
//!
//! if fit.converged {
//!     println!("Converged after {} iterations", fit.iterations);
//! } else {
//!     println!("Best effort, max gap {:.3}", fit.max_difference);
//! }
//! ```

mod dataset;
mod engine;
mod missing;
mod schema;
mod session;
mod summary;

pub use dataset::*;
pub use engine::*;
pub use missing::*;
pub use schema::*;
pub use session::*;
pub use summary::*;
