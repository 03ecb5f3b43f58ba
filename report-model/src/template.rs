//! FILENAME: report-model/src/template.rs
//! PURPOSE: The template grid a report section is authored on.
//! CONTEXT: A template is a small dense band of rows: explicit row heights
//! and column widths in model units, sparse cell contents, and merged-cell
//! ranges. Positional lookups follow the canvas-table conventions: a row
//! spanning [start, end] owns the positions start < p <= end.

use crate::cell::TemplateCell;
use crate::range::CellRange;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default row height and column width for freshly added rows/columns,
/// in model units (1440 per inch).
pub const DEFAULT_ROW_HEIGHT: i32 = 285;
pub const DEFAULT_COL_WIDTH: i32 = 1200;

/// A band of template rows. Cells are stored sparsely; an absent entry is
/// an empty cell with the default style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TemplateGrid {
    row_heights: Vec<i32>,
    col_widths: Vec<i32>,
    // JSON maps need string keys, so the sparse map serializes as a
    // coordinate-sorted entry list.
    #[serde(with = "cell_entries")]
    cells: HashMap<(u32, u32), TemplateCell>,
    merged: Vec<CellRange>,
}

mod cell_entries {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        cells: &HashMap<(u32, u32), TemplateCell>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<(u32, u32, &TemplateCell)> = cells
            .iter()
            .map(|(&(row, col), cell)| (row, col, cell))
            .collect();
        entries.sort_by_key(|&(row, col, _)| (row, col));
        serde::Serialize::serialize(&entries, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<(u32, u32), TemplateCell>, D::Error> {
        let entries: Vec<(u32, u32, TemplateCell)> =
            serde::Deserialize::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|(row, col, cell)| ((row, col), cell))
            .collect())
    }
}

impl TemplateGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        TemplateGrid {
            row_heights: vec![DEFAULT_ROW_HEIGHT; rows],
            col_widths: vec![DEFAULT_COL_WIDTH; cols],
            cells: HashMap::new(),
            merged: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_heights.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_widths.len()
    }

    pub fn row_height(&self, row: usize) -> i32 {
        self.row_heights.get(row).copied().unwrap_or(0)
    }

    pub fn col_width(&self, col: usize) -> i32 {
        self.col_widths.get(col).copied().unwrap_or(0)
    }

    pub fn set_row_height(&mut self, row: usize, height: i32) {
        if let Some(h) = self.row_heights.get_mut(row) {
            *h = height;
        }
    }

    pub fn set_col_width(&mut self, col: usize, width: i32) {
        if let Some(w) = self.col_widths.get_mut(col) {
            *w = width;
        }
    }

    pub fn row_heights(&self) -> &[i32] {
        &self.row_heights
    }

    pub fn col_widths(&self) -> &[i32] {
        &self.col_widths
    }

    /// Total height of the band: the sum of all row heights.
    pub fn height(&self) -> i32 {
        self.row_heights.iter().sum()
    }

    pub fn set_cell(&mut self, row: u32, col: u32, cell: TemplateCell) {
        self.cells.insert((row, col), cell);
    }

    pub fn get_cell(&self, row: u32, col: u32) -> Option<&TemplateCell> {
        self.cells.get(&(row, col))
    }

    pub fn merge(&mut self, range: CellRange) {
        self.merged.push(range);
    }

    pub fn merged_ranges(&self) -> &[CellRange] {
        &self.merged
    }

    /// Position of the top edge of row `idx`: the sum of the heights of all
    /// rows above it. `idx` is clamped to [0, row_count], so passing
    /// `row_count` yields the total band height.
    pub fn row_pos_by_idx(&self, idx: usize) -> i32 {
        let idx = idx.min(self.row_heights.len());
        self.row_heights[..idx].iter().sum()
    }

    /// Index of the row containing vertical position `pos`. Positions at or
    /// before the top edge map to row 0; a row spanning [start, end] owns
    /// start < pos <= end; positions past the bottom clamp to the last row.
    pub fn row_idx_by_pos(&self, pos: i32) -> usize {
        Self::idx_by_pos(&self.row_heights, pos)
    }

    /// Index of the column containing horizontal position `pos`, with the
    /// same edge conventions as `row_idx_by_pos`.
    pub fn col_idx_by_pos(&self, pos: i32) -> usize {
        Self::idx_by_pos(&self.col_widths, pos)
    }

    fn idx_by_pos(sizes: &[i32], pos: i32) -> usize {
        if pos <= 0 || sizes.is_empty() {
            return 0;
        }
        let mut end = 0i32;
        for (idx, size) in sizes.iter().enumerate() {
            end += size;
            if pos <= end {
                return idx;
            }
        }
        sizes.len() - 1
    }
}
