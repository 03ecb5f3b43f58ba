//! FILENAME: report-engine/src/lib.rs
//! PURPOSE: Banded-report pagination engine.
//! CONTEXT: Turns a section registry (templated bands) plus a grouped row
//! cursor into a sequence of laid-out pages. Three layers: the pager
//! decides which section occurrences land on each page, the view
//! materializes one page into a flat tagged grid, and the resolver
//! evaluates cell formulas lazily against the data. `ReportLayoutEngine`
//! ties them together behind the surface the application drives.

pub mod cursor;
pub mod definition;
pub mod engine;
pub mod error;
pub mod pager;
pub mod resolve;
pub mod view;

pub use cursor::{GroupedRowCursor, MemoryCursor};
pub use definition::{Section, SectionRegistry, SectionType};
pub use engine::ReportLayoutEngine;
pub use error::ReportError;
pub use pager::{layout_page, layout_report, PageLayoutInfo, PageSegmentInfo, PageState};
pub use resolve::{
    resolve_cell, ReportVariables, ResolvedCell, PROP_REPORT_CURRENT_DATE,
    PROP_REPORT_DATA_SOURCE, PROP_REPORT_PAGE_COUNT, PROP_REPORT_PAGE_NUMBER,
};
pub use view::{materialize_page, LayoutCell, LayoutGrid, LayoutRow, RowTag};
