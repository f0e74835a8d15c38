use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n\t]").unwrap());

/// Class number, title, key concepts, three objectives, description.
pub const OUTLINE_COLUMNS: usize = 7;

/// A pipe-delimited table after line filtering, column hygiene and cell sanitation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One class of the course outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    /// 1-based order of the row in its source table.
    pub position: usize,
    /// The class-number cell as written (usually "1", "2", ...).
    pub number: String,
    pub title: String,
    pub key_concepts: String,
    pub objectives: [String; 3],
    pub description: String,
}

impl OutlineTable {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Each data row as (header, value) pairs, in column order.
    pub fn records(&self) -> Vec<Vec<(&str, &str)>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter().map(String::as_str))
                    .collect()
            })
            .collect()
    }

    /// Header row followed by data rows, the shape a spreadsheet upload takes.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        if self.is_empty() {
            return Vec::new();
        }
        std::iter::once(self.headers.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }

    /// Re-serialize as a markdown table with a divider line.
    pub fn to_markdown(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        out.push_str(&markdown_line(&self.headers));
        out.push('\n');
        let divider: Vec<String> = self.headers.iter().map(|_| "---".to_string()).collect();
        out.push_str(&markdown_line(&divider));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&markdown_line(row));
            out.push('\n');
        }
        out
    }
}

impl OutlineRow {
    /// Positional mapping of the first seven cells; `None` when fewer are present.
    pub fn from_cells(position: usize, cells: &[String]) -> Option<Self> {
        if cells.len() < OUTLINE_COLUMNS {
            return None;
        }
        Some(OutlineRow {
            position,
            number: cells[0].clone(),
            title: cells[1].clone(),
            key_concepts: cells[2].clone(),
            objectives: [cells[3].clone(), cells[4].clone(), cells[5].clone()],
            description: cells[6].clone(),
        })
    }
}

/// Decode the first pipe-delimited table found in `text`.
///
/// Data rows whose field count differs from the header's are dropped.
pub fn parse_table(text: &str) -> OutlineTable {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| l.contains('|') && !is_divider(l))
        .map(split_cells);

    let Some(headers) = lines.next() else {
        return OutlineTable::default();
    };

    let mut rows = Vec::new();
    for (i, cells) in lines.enumerate() {
        if cells.len() == headers.len() {
            rows.push(cells);
        } else {
            debug!(
                row = i + 1,
                fields = cells.len(),
                expected = headers.len(),
                "dropping malformed outline row"
            );
        }
    }

    // Column hygiene: drop columns empty in the header and in every row.
    let keep: Vec<usize> = (0..headers.len())
        .filter(|&c| !headers[c].is_empty() || rows.iter().any(|r| !r[c].is_empty()))
        .collect();
    let project = |cells: &[String]| -> Vec<String> { keep.iter().map(|&c| cells[c].clone()).collect() };

    OutlineTable {
        headers: project(&headers),
        rows: rows.iter().map(|r| project(r)).collect(),
    }
}

/// Parse the outline table into fixed-shape rows, in source order.
pub fn parse_outline(text: &str) -> Vec<OutlineRow> {
    let table = parse_table(text);
    rows_from_cells(&table.rows)
}

/// Rows read back from the outline spreadsheet: header first, short rows skipped.
pub fn rows_from_values(values: &[Vec<String>]) -> Vec<OutlineRow> {
    let data: Vec<Vec<String>> = values
        .iter()
        .skip(1)
        .map(|row| row.iter().map(|c| sanitize_cell(c)).collect())
        .collect();
    rows_from_cells(&data)
}

fn rows_from_cells(rows: &[Vec<String>]) -> Vec<OutlineRow> {
    let mut out = Vec::with_capacity(rows.len());
    for cells in rows {
        match OutlineRow::from_cells(out.len() + 1, cells) {
            Some(row) => out.push(row),
            None => debug!(fields = cells.len(), "skipping outline row with too few columns"),
        }
    }
    out
}

/// Replace each carriage return, newline and tab with a space, then trim.
pub fn sanitize_cell(cell: &str) -> String {
    CONTROL_RE.replace_all(cell, " ").trim().to_string()
}

/// `|---|:---:|` style lines: only pipes, dashes, colons and spaces, with at least one dash.
fn is_divider(line: &str) -> bool {
    line.contains('-') && line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' ' | '\t'))
}

fn split_cells(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(sanitize_cell).collect()
}

fn markdown_line(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

// ── Tests ──
