//! Plain-text rendering of query outcomes.
//!
//! Read results narrow to the `title` and `url` columns when either exists;
//! otherwise every column is shown. Columns are left-justified to the widest
//! of their header and values.

use serde_json::Value;

use common::models::query::{display_value, QueryOutcome};

const COLUMN_SEPARATOR: &str = " | ";
const RULE_SEPARATOR: &str = "-+-";

/// Renders an outcome as the text shown to the user.
pub fn render(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Status(message) => message.clone(),
        QueryOutcome::Rows { columns, rows } => render_table(columns, rows),
    }
}

/// Picks the columns to display as `(header, source index)` pairs.
pub fn display_columns(columns: &[String]) -> Vec<(String, usize)> {
    let mut title_index = None;
    let mut url_index = None;
    for (index, column) in columns.iter().enumerate() {
        match column.to_lowercase().as_str() {
            "title" => title_index = Some(index),
            "url" => url_index = Some(index),
            _ => {}
        }
    }

    if title_index.is_none() && url_index.is_none() {
        return columns.iter().cloned().zip(0..).collect();
    }

    [("title", title_index), ("url", url_index)]
        .into_iter()
        .filter_map(|(header, index)| index.map(|i| (header.to_string(), i)))
        .collect()
}

/// Renders a header line, a dash rule and one line per row.
pub fn render_table(columns: &[String], rows: &[Vec<Value>]) -> String {
    let selected = display_columns(columns);

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            selected
                .iter()
                .map(|(_, index)| row.get(*index).map(display_value).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = selected
        .iter()
        .enumerate()
        .map(|(i, (header, _))| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(join_padded(selected.iter().map(|(header, _)| header.as_str()), &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join(RULE_SEPARATOR),
    );
    for row in &cells {
        lines.push(join_padded(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn join_padded<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", value, width = *width))
        .collect::<Vec<_>>()
        .join(COLUMN_SEPARATOR)
}
