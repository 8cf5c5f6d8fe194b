//! Missing-value audit for target columns.

use crate::DataSet;
use raking_core::{ColumnMissing, DiagnosticEvent, DiagnosticSink, MissingAudit};

/// Counts missing values in target columns.
pub struct MissingValueAuditor;

impl MissingValueAuditor {
    /// Creates a new auditor.
    pub fn new() -> Self {
        Self
    }

    /// Audits `columns` of `dataset`.
    ///
    /// Emits a warning on `sink` naming every column with at least one
    /// missing value.
    pub fn audit<'a, I>(
        &self,
        dataset: &DataSet,
        columns: I,
        sink: &dyn DiagnosticSink,
    ) -> MissingAudit
    where
        I: IntoIterator<Item = &'a str>,
    {
        let audit = MissingAudit {
            columns: columns
                .into_iter()
                .map(|column| ColumnMissing {
                    column: column.to_string(),
                    missing: dataset.missing_count(column),
                })
                .collect(),
        };

        if audit.has_missing() {
            sink.emit(&DiagnosticEvent::missing_values(audit.columns_with_missing()));
        }

        audit
    }
}

impl Default for MissingValueAuditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DataRow, DataValue};
    use pretty_assertions::assert_eq;
    use raking_core::{CollectingSink, DiagnosticKind};

    fn survey() -> DataSet {
        let rows = [
            (Some("M"), Some("North")),
            (Some("F"), None),
            (None, Some("South")),
            (Some("F"), None),
        ]
        .into_iter()
        .map(|(gender, region)| {
            let mut row = DataRow::new();
            row.insert("Gender".to_string(), DataValue::from(gender));
            row.insert("Region".to_string(), DataValue::from(region));
            row
        })
        .collect();
        DataSet::from_rows(rows)
    }

    #[test]
    fn test_counts_per_column() {
        let sink = CollectingSink::new();
        let audit = MissingValueAuditor::new().audit(&survey(), ["Gender", "Region"], &sink);

        assert_eq!(audit.missing_in("Gender"), Some(1));
        assert_eq!(audit.missing_in("Region"), Some(2));
        assert!(audit.has_missing());
    }

    #[test]
    fn test_warning_lists_affected_columns() {
        let sink = CollectingSink::new();
        MissingValueAuditor::new().audit(&survey(), ["Region", "Gender"], &sink);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_warning());
        assert_eq!(
            events[0].kind,
            DiagnosticKind::MissingValues {
                columns: vec!["Region".to_string(), "Gender".to_string()]
            }
        );
    }

    #[test]
    fn test_no_warning_when_complete() {
        let sink = CollectingSink::new();
        let dataset = DataSet::from_column("Gender", vec!["M", "F"]);
        let audit = MissingValueAuditor::new().audit(&dataset, ["Gender"], &sink);

        assert!(!audit.has_missing());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let sink = CollectingSink::new();
        let dataset = DataSet::from_column("score", vec![1.0, f64::NAN, 2.0]);
        let audit = MissingValueAuditor::new().audit(&dataset, ["score"], &sink);
        assert_eq!(audit.missing_in("score"), Some(1));
    }
}
