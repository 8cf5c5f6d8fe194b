//! Diagnostic events and sinks.
//!
//! The auditor and the engine never log directly. They build a
//! [`DiagnosticEvent`] and hand it to whatever [`DiagnosticSink`] the caller
//! injected. [`TracingSink`] forwards events to `tracing`; [`CollectingSink`]
//! keeps them in memory.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// Informational
    Info,
    /// Something the caller should look at
    Warning,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Target columns contain missing values
    MissingValues {
        /// Columns with at least one missing value
        columns: Vec<String>,
    },
    /// Tolerance reached
    Converged {
        /// Number of passes performed
        iterations: usize,
    },
    /// Iteration limit reached before tolerance
    NotConverged {
        /// Number of passes performed
        iterations: usize,
        /// Largest remaining margin gap, in percentage points
        max_difference: f64,
    },
}

/// A structured diagnostic event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticEvent {
    /// Severity
    pub level: DiagnosticLevel,

    /// Structured payload
    #[serde(flatten)]
    pub kind: DiagnosticKind,

    /// Human-readable rendering
    pub message: String,
}

impl DiagnosticEvent {
    /// Warning for target columns with missing values.
    pub fn missing_values(columns: Vec<String>) -> Self {
        let message = format!(
            "Missing values found in the following target columns: [{}]",
            columns.join(", ")
        );
        Self {
            level: DiagnosticLevel::Warning,
            kind: DiagnosticKind::MissingValues { columns },
            message,
        }
    }

    /// Info event for a converged fit.
    pub fn converged(iterations: usize) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            kind: DiagnosticKind::Converged { iterations },
            message: format!("Tolerance criteria reached after {iterations} iterations"),
        }
    }

    /// Warning for a fit that hit the iteration limit.
    pub fn not_converged(iterations: usize, max_difference: f64) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            kind: DiagnosticKind::NotConverged {
                iterations,
                max_difference,
            },
            message: format!(
                "Tolerance criteria not reached after {} iterations (max difference {:.4})",
                iterations, max_difference
            ),
        }
    }

    /// Returns true for warning-level events.
    pub fn is_warning(&self) -> bool {
        self.level == DiagnosticLevel::Warning
    }
}

/// Receives diagnostic events.
///
/// # Example
///
/// ```rust
/// use raking_core::{DiagnosticEvent, DiagnosticSink};
///
/// struct StderrSink;
///
/// impl DiagnosticSink for StderrSink {
///     fn emit(&self, event: &DiagnosticEvent) {
///         eprintln!("{}", event.message);
///     }
/// }
/// ```
pub trait DiagnosticSink: Send + Sync {
    /// Handles one event.
    fn emit(&self, event: &DiagnosticEvent);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn emit(&self, event: &DiagnosticEvent) {
        (**self).emit(event);
    }
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: &DiagnosticEvent) {
        match &event.kind {
            DiagnosticKind::MissingValues { columns } => {
                warn!(columns = ?columns, "{}", event.message);
            }
            DiagnosticKind::Converged { iterations } => {
                info!(iterations, "{}", event.message);
            }
            DiagnosticKind::NotConverged {
                iterations,
                max_difference,
            } => {
                warn!(iterations, max_difference, "{}", event.message);
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events received so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Drains the events received so far.
    pub fn take(&self) -> Vec<DiagnosticEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, event: &DiagnosticEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

/// Sends every event to two sinks.
pub struct Tee<A, B>(pub A, pub B);

impl<A: DiagnosticSink, B: DiagnosticSink> DiagnosticSink for Tee<A, B> {
    fn emit(&self, event: &DiagnosticEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}
