//! Plain column layouts of the terminal output.
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::common::expr::float_repr;
use crate::common::utils::str::{truncate_chars, visible_width};

/// Width used when the terminal width cannot be determined.
pub const DEFAULT_COLUMNS: usize = 80;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
    Empty,
}

impl CellValue {
    fn is_number(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Int(value) => write!(f, "{value}"),
            CellValue::Float(value) => f.write_str(&float_repr(*value)),
            CellValue::Text(value) => f.write_str(value),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Int(value as i64)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map(CellValue::Float).unwrap_or(CellValue::Empty)
    }
}

/// Rows of `info` or `list`, one column per `--display` character.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub titles: Vec<&'static str>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(titles: Vec<&'static str>) -> Self {
        Self {
            titles,
            rows: Vec::new(),
        }
    }
}

/// Formats `table` into lines. Numbers are right aligned, everything else is
/// left aligned, columns are separated by a single space and every line is
/// cut to `width - 1` characters.
pub fn render_columns(table: &Table, titles: bool, width: usize) -> Vec<String> {
    let widths: Vec<usize> = (0..table.titles.len())
        .map(|index| {
            let values = table
                .rows
                .iter()
                .filter_map(|row| row.get(index))
                .map(|value| value.to_string().chars().count())
                .max()
                .unwrap_or(0);
            if titles {
                values.max(table.titles[index].chars().count())
            } else {
                values
            }
        })
        .collect();

    let finish = |parts: Vec<String>| -> String {
        let line = parts.join(" ");
        truncate_chars(line.trim_end(), width.saturating_sub(1)).to_string()
    };

    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    if titles {
        lines.push(finish(
            table
                .titles
                .iter()
                .zip(&widths)
                .map(|(title, width)| format!("{title:<width$}"))
                .collect(),
        ));
    }
    for row in &table.rows {
        lines.push(finish(
            row.iter()
                .zip(&widths)
                .map(|(value, width)| {
                    if value.is_number() {
                        format!("{:>width$}", value.to_string())
                    } else {
                        format!("{:<width$}", value.to_string())
                    }
                })
                .collect(),
        ));
    }
    lines
}

/// Lays out `strings` column by column like `ls`, so that the lines fit into
/// `width` characters. Colored strings are measured by their visible width.
pub fn printcols(strings: &[String], width: usize) -> String {
    if strings.is_empty() {
        return String::new();
    }
    let max_width = strings.iter().map(|s| visible_width(s)).max().unwrap_or(0);
    let ncols = (width / (max_width + 2)).max(1);
    let nrows = strings.len().div_ceil(ncols);

    let mut lines = Vec::with_capacity(nrows);
    for row in 0..nrows {
        let mut line = String::new();
        for col in 0..ncols {
            if let Some(value) = strings.get(col * nrows + row) {
                line.push_str(value);
                line.push_str(&" ".repeat(max_width - visible_width(value) + 2));
            }
        }
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// Width of the terminal, falling back to the `COLUMNS` variable and then to
/// a default of 80 characters.
pub fn get_cols() -> usize {
    terminal_columns(
        terminal_size::terminal_size().map(|(width, _)| width.0 as usize),
        std::env::var("COLUMNS").ok().as_deref(),
    )
}

fn terminal_columns(terminal: Option<usize>, env: Option<&str>) -> usize {
    terminal
        .filter(|width| *width > 0)
        .or_else(|| env.and_then(|value| value.trim().parse().ok()))
        .filter(|width| *width > 0)
        .unwrap_or(DEFAULT_COLUMNS)
}

#[cfg(test)]
mod tests {
    use super::{CellValue, Table, printcols, render_columns, terminal_columns};

    fn table() -> Table {
        Table {
            titles: vec!["NAME", "CARDIN", "R"],
            rows: vec![
                vec!["ising".into(), CellValue::Int(120), CellValue::Int(3)],
                vec!["heisenberg".into(), CellValue::Int(8), CellValue::Int(0)],
            ],
        }
    }

    #[test]
    fn test_render_alignment() {
        let lines = render_columns(&table(), false, 80);
        assert_eq!(lines, vec!["ising      120 3", "heisenberg   8 0"]);
    }

    #[test]
    fn test_render_titles() {
        let lines = render_columns(&table(), true, 80);
        insta::assert_snapshot!(lines.join("\n"), @r###"
        NAME       CARDIN R
        ising         120 3
        heisenberg      8 0
        "###);
    }

    #[test]
    fn test_render_truncates() {
        let lines = render_columns(&table(), false, 8);
        assert_eq!(lines, vec!["ising  ", "heisenb"]);
    }

    #[test]
    fn test_render_floats_and_empty() {
        let table = Table {
            titles: vec!["NAME", "ACC", "TARGET"],
            rows: vec![
                vec!["a.h5".into(), CellValue::Float(0.5), CellValue::Float(0.01)],
                vec!["bb.h5".into(), CellValue::Empty, CellValue::Float(1e-5)],
            ],
        };
        let lines = render_columns(&table, false, 80);
        assert_eq!(lines, vec!["a.h5  0.5  0.01", "bb.h5     1e-05"]);
    }

    #[test]
    fn test_printcols() {
        let strings: Vec<String> = ["cardin (n)", "create (c)", "delete (d)", "info (i)", "list (l)"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            printcols(&strings, 30),
            "cardin (n)  info (i)\ncreate (c)  list (l)\ndelete (d)"
        );
        assert_eq!(printcols(&strings, 5).lines().count(), 5);
        assert_eq!(printcols(&[], 80), "");
    }

    #[test]
    fn test_printcols_ignores_colors() {
        let strings = vec!["\x1b[1mab\x1b[0m".to_string(), "cd".to_string()];
        assert_eq!(printcols(&strings, 80), "\x1b[1mab\x1b[0m  cd");
    }

    #[test]
    fn test_terminal_columns() {
        assert_eq!(terminal_columns(Some(120), Some("100")), 120);
        assert_eq!(terminal_columns(None, Some("100")), 100);
        assert_eq!(terminal_columns(None, Some("wide")), 80);
        assert_eq!(terminal_columns(None, None), 80);
    }
}
