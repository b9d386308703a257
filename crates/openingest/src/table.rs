//! Plain-text rendering of tabular data
//!
//! CSV files, spreadsheets and query results all end up as a [`Table`]
//! and are rendered the same way: a row-index column, a header line, and
//! right-aligned columns separated by two spaces.

use std::fmt;

/// Placeholder for missing cells
pub const MISSING: &str = "NaN";

/// Column gap in rendered output
const GAP: &str = "  ";

/// Header plus rows of optional cell text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create an empty table with the given column names
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with missing cells
    ///
    /// Cells beyond the header width are dropped.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as text
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn render_empty(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Empty DataFrame\nColumns: [{}]\nIndex: []",
            self.columns.join(", ")
        )
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return self.render_empty(f);
        }

        let index_width = (self.rows.len() - 1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                self.rows
                    .iter()
                    .map(|row| cell_text(&row[i]).chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut header = " ".repeat(index_width);
        for (name, width) in self.columns.iter().zip(&widths) {
            header.push_str(GAP);
            header.push_str(&pad_left(name, *width));
        }
        f.write_str(header.trim_end())?;

        for (index, row) in self.rows.iter().enumerate() {
            let mut line = pad_right(&index.to_string(), index_width);
            for (cell, width) in row.iter().zip(&widths) {
                line.push_str(GAP);
                line.push_str(&pad_left(cell_text(cell), *width));
            }
            write!(f, "\n{}", line.trim_end())?;
        }

        Ok(())
    }
}

fn cell_text(cell: &Option<String>) -> &str {
    cell.as_deref().unwrap_or(MISSING)
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{:>width$}", text, width = width)
}

fn pad_right(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}
