//! FILENAME: report-model/src/range.rs
//! PURPOSE: Rectangular cell ranges, used for merged-cell regions.

use serde::{Deserialize, Serialize};

/// An inclusive rectangular range of cells. Row and column indices are
/// 0-based within their grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub row1: u32,
    pub col1: u32,
    pub row2: u32,
    pub col2: u32,
}

impl CellRange {
    pub fn new(row1: u32, col1: u32, row2: u32, col2: u32) -> Self {
        CellRange { row1, col1, row2, col2 }
    }

    pub fn single(row: u32, col: u32) -> Self {
        CellRange::new(row, col, row, col)
    }

    /// Returns a copy of the range shifted down by `rows`. Used when a
    /// template row block is replicated at a new position in a layout grid.
    pub fn shifted(&self, rows: u32) -> Self {
        CellRange::new(self.row1 + rows, self.col1, self.row2 + rows, self.col2)
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.row1 && row <= self.row2 && col >= self.col1 && col <= self.col2
    }

    pub fn row_count(&self) -> u32 {
        self.row2 - self.row1 + 1
    }

    pub fn col_count(&self) -> u32 {
        self.col2 - self.col1 + 1
    }
}
