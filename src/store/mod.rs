pub mod auth;
pub mod google;
pub mod memory;
pub mod range;

use async_trait::async_trait;

pub use range::CellRange;

/// A remote tabular store addressed by A1 ranges.
///
/// Implementations make no atomicity promise across calls: a read followed by an
/// append can interleave with another caller's read and append.
#[async_trait]
pub trait SheetStore: Send + Sync {
    fn name(&self) -> &str;

    /// Cell values inside `range`, row by row. Trailing empty rows are omitted.
    async fn read_range(&self, range: &CellRange) -> anyhow::Result<Vec<Vec<String>>>;

    /// Append `rows` after the last populated row of the table anchored at `range`.
    async fn append_rows(&self, range: &CellRange, rows: &[Vec<String>]) -> anyhow::Result<()>;
}
