use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{CellRange, SheetStore};

/// An in-process sheet store.
/// Backs `serve --in-memory` for local runs and stands in for the remote store in tests.
#[derive(Default)]
pub struct MemoryStore {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    reads: AtomicUsize,
    appends: AtomicUsize,
    fail_appends: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty tab named `sheet`.
    pub fn with_sheet(self, sheet: &str) -> Self {
        self.with_rows(sheet, Vec::new())
    }

    /// Seed `sheet` with `rows`, replacing whatever it held.
    pub fn with_rows(self, sheet: &str, rows: Vec<Vec<String>>) -> Self {
        if let Ok(mut sheets) = self.sheets.lock() {
            sheets.insert(sheet.to_string(), rows);
        }
        self
    }

    /// Make every subsequent append fail the way a quota or permission error would.
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn append_count(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    pub fn rows(&self, sheet: &str) -> anyhow::Result<Vec<Vec<String>>> {
        let sheets = self
            .sheets
            .lock()
            .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))?;
        Ok(sheets.get(sheet).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl SheetStore for MemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn read_range(&self, range: &CellRange) -> anyhow::Result<Vec<Vec<String>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let sheets = self
            .sheets
            .lock()
            .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))?;
        let Some(grid) = sheets.get(&range.sheet) else {
            anyhow::bail!("Unable to parse range: {range}");
        };

        let last_row = match range.end_row {
            Some(r) => (r + 1).min(grid.len()),
            None => grid.len(),
        };

        let mut out: Vec<Vec<String>> = grid
            .iter()
            .take(last_row)
            .skip(range.start_row)
            .map(|row| {
                let mut cells: Vec<String> = row
                    .iter()
                    .skip(range.start_col)
                    .take(range.width())
                    .cloned()
                    .collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while out.last().is_some_and(|r| r.is_empty()) {
            out.pop();
        }

        Ok(out)
    }

    async fn append_rows(&self, range: &CellRange, rows: &[Vec<String>]) -> anyhow::Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            anyhow::bail!("Quota exceeded for quota metric 'Write requests'");
        }

        let mut sheets = self
            .sheets
            .lock()
            .map_err(|_| anyhow::anyhow!("in-memory store lock poisoned"))?;
        let grid = sheets.entry(range.sheet.clone()).or_default();

        // Append lands after the last row holding any value.
        while grid.last().is_some_and(|r| r.iter().all(|c| c.is_empty())) {
            grid.pop();
        }
        for row in rows {
            let mut padded = vec![String::new(); range.start_col];
            padded.extend(row.iter().cloned());
            grid.push(padded);
        }

        self.appends.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Appended {} row(s) to {}", rows.len(), range.sheet);
        Ok(())
    }
}
