//! Data-quality checks run before (or instead of) the pipeline.

use std::collections::HashSet;

use reelstat_core::posts::columns;

use crate::table::Table;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityReport {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Cells that are empty after trimming.
    pub missing_cells: usize,
    /// `(column, empty cells)` for every column with at least one gap,
    /// in header order.
    pub missing_by_column: Vec<(String, usize)>,
    /// Rows identical to an earlier row.
    pub duplicate_rows: usize,
    /// Required pipeline columns the table does not have.
    pub missing_required: Vec<&'static str>,
}

impl QualityReport {
    #[must_use]
    pub fn from_table(table: &Table) -> Self {
        let headers = table.headers();

        let mut missing_by_column: Vec<(String, usize)> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let empty = table
                    .rows()
                    .iter()
                    .filter(|row| row[idx].trim().is_empty())
                    .count();
                (name.clone(), empty)
            })
            .collect();
        let missing_cells = missing_by_column.iter().map(|(_, n)| n).sum();
        missing_by_column.retain(|(_, n)| *n > 0);

        let mut seen: HashSet<&[String]> = HashSet::with_capacity(table.len());
        let duplicate_rows = table
            .rows()
            .iter()
            .filter(|row| !seen.insert(row.as_slice()))
            .count();

        let missing_required = columns::REQUIRED
            .into_iter()
            .filter(|c| !table.has_column(c))
            .collect();

        let report = Self {
            total_rows: table.len(),
            total_columns: headers.len(),
            missing_cells,
            missing_by_column,
            duplicate_rows,
            missing_required,
        };

        tracing::debug!(
            rows = report.total_rows,
            missing_cells = report.missing_cells,
            duplicate_rows = report.duplicate_rows,
            "quality report computed"
        );

        report
    }

    /// True when the pipeline can run on this table.
    #[must_use]
    pub fn is_processable(&self) -> bool {
        self.missing_required.is_empty()
    }
}
