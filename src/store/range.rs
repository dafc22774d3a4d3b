use std::fmt;

/// An A1-notation range such as `Sheet1!F2:F` or `Sheet1!A1`.
///
/// Columns and rows are zero-based internally. An open-ended range (`F2:F`) has no
/// `end_row` and runs to the last populated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRange {
    pub sheet: String,
    pub start_col: usize,
    pub start_row: usize,
    pub end_col: usize,
    pub end_row: Option<usize>,
}

impl CellRange {
    /// A single-column range from `row` to the bottom of the sheet.
    pub fn column_from(sheet: &str, col: usize, row: usize) -> Self {
        Self {
            sheet: sheet.to_string(),
            start_col: col,
            start_row: row,
            end_col: col,
            end_row: None,
        }
    }

    /// The top-left anchor used as an append target.
    pub fn anchor(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            start_col: 0,
            start_row: 0,
            end_col: 0,
            end_row: Some(0),
        }
    }

    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sheet = if needs_quotes(&self.sheet) {
            format!("'{}'", self.sheet.replace('\'', "''"))
        } else {
            self.sheet.clone()
        };
        let start = format!("{}{}", column_name(self.start_col), self.start_row + 1);
        let single = self.start_col == self.end_col && self.end_row == Some(self.start_row);
        if single {
            return write!(f, "{sheet}!{start}");
        }
        match self.end_row {
            Some(row) => write!(f, "{sheet}!{start}:{}{}", column_name(self.end_col), row + 1),
            None => write!(f, "{sheet}!{start}:{}", column_name(self.end_col)),
        }
    }
}

/// Sheet names with anything but word characters, or that read as a cell
/// (`A1`, `R1C1`), must be quoted.
fn needs_quotes(sheet: &str) -> bool {
    !sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') || is_cell_reference(sheet)
}

fn is_cell_reference(name: &str) -> bool {
    let split = name.find(|c: char| c.is_ascii_digit()).unwrap_or(name.len());
    let (letters, digits) = name.split_at(split);
    // Sheets columns stop at ZZZ.
    let a1 = (1..=3).contains(&letters.len())
        && !digits.is_empty()
        && letters.chars().all(|c| c.is_ascii_alphabetic())
        && digits.chars().all(|c| c.is_ascii_digit());

    let upper = name.to_ascii_uppercase();
    let r1c1 = upper
        .strip_prefix('R')
        .and_then(|rest| rest.split_once('C'))
        .is_some_and(|(row, col)| {
            row.chars().all(|c| c.is_ascii_digit()) && col.chars().all(|c| c.is_ascii_digit())
        });

    a1 || r1c1
}

pub fn column_name(col: usize) -> String {
    let mut n = col + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    name.iter().rev().collect()
}
