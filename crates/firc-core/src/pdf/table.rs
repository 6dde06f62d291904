//! Table recovery from a page's text rendering.
//!
//! Consecutive lines that split into enough cells form one table. Two line
//! layouts are understood:
//! - **Delimited**: cells separated by tabs or `|`
//! - **Whitespace**: cells separated by runs of spaces (fixed-width reports)

use crate::models::config::TableDetection;

use super::Table;

/// Settings for [`detect_tables`].
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    pub strategy: TableDetection,
    /// Minimum run of spaces separating two cells (whitespace strategy).
    pub min_gap: usize,
    /// Minimum cells for a line to count as a row.
    pub min_columns: usize,
}

/// Group the tabular lines of `text` into tables.
pub fn detect_tables(text: &str, options: TableOptions) -> Vec<Table> {
    if options.strategy == TableDetection::Off {
        return Vec::new();
    }

    let mut tables = Vec::new();
    let mut current: Vec<Vec<Option<String>>> = Vec::new();

    for line in text.lines() {
        match split_row(line, options) {
            Some(row) => current.push(row),
            None => {
                if !current.is_empty() {
                    tables.push(Table::new(std::mem::take(&mut current)));
                }
            }
        }
    }

    if !current.is_empty() {
        tables.push(Table::new(current));
    }

    tables
}

/// Split one line into cells, or `None` when it is not a table row.
pub fn split_row(line: &str, options: TableOptions) -> Option<Vec<Option<String>>> {
    let parts = match options.strategy {
        TableDetection::Off => return None,
        TableDetection::Delimited => split_delimited(line)?,
        TableDetection::Whitespace => split_whitespace_gaps(line, options.min_gap.max(1)),
    };

    if parts.len() < options.min_columns.max(2) {
        return None;
    }

    Some(
        parts
            .into_iter()
            .map(|cell| {
                let cell = cell.trim();
                (!cell.is_empty()).then(|| cell.to_string())
            })
            .collect(),
    )
}

fn split_delimited(line: &str) -> Option<Vec<&str>> {
    if !line.contains(['\t', '|']) {
        return None;
    }

    let trimmed = line.trim();
    // Drop the outer border of "| a | b |" rows
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    Some(inner.split(['\t', '|']).collect())
}

fn split_whitespace_gaps(line: &str, min_gap: usize) -> Vec<&str> {
    let line = line.trim();
    let mut parts = Vec::new();
    let mut cell_start = 0;
    let mut gap_start: Option<usize> = None;
    let mut gap_len = 0;

    for (i, c) in line.char_indices() {
        if c == ' ' || c == '\t' {
            if gap_start.is_none() {
                gap_start = Some(i);
                gap_len = 0;
            }
            // A tab always separates cells
            gap_len += if c == '\t' { min_gap } else { 1 };
        } else if let Some(start) = gap_start.take() {
            if gap_len >= min_gap {
                parts.push(&line[cell_start..start]);
                cell_start = i;
            }
        }
    }

    if !line.is_empty() {
        parts.push(&line[cell_start..]);
    }

    parts
}
