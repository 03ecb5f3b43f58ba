//! FILENAME: report-engine/src/resolve.rs
//! PURPOSE: Lazy per-cell resolution: formatting fetch plus formula
//! evaluation against the originating data row.
//! CONTEXT: Materialized pages carry only placeholder content; when a
//! consumer actually needs a cell (render or measurement time), this is
//! where the template's full formatting is fetched and leading-`=` content
//! is evaluated in the scope of the originating section's group. Broken
//! formulas render blank; a bad cell must never abort a page.

use crate::cursor::GroupedRowCursor;
use crate::definition::SectionRegistry;
use crate::view::RowTag;
use report_model::{CellStyle, MIME_PLAIN_TEXT};

// Report-scope properties, addressable from formulas by name.
pub const PROP_REPORT_PAGE_NUMBER: &str = "report.page.number";
pub const PROP_REPORT_PAGE_COUNT: &str = "report.page.count";
pub const PROP_REPORT_CURRENT_DATE: &str = "report.current.date";
pub const PROP_REPORT_DATA_SOURCE: &str = "report.data.source";

/// Ambient values published to the cursor before every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportVariables {
    pub page_number: i32,
    pub page_count: i32,
    pub current_date: String,
    pub data_source: String,
}

/// A fully resolved cell: final content plus the template's complete
/// formatting, applied here for the first time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedCell {
    pub content: String,
    pub mime_type: String,
    pub style: CellStyle,
}

/// Resolves one cell of a materialized row. Unknown tags and out-of-range
/// columns resolve to an empty default cell rather than failing.
pub fn resolve_cell(
    tag: &RowTag,
    column: usize,
    registry: &SectionRegistry,
    cursor: &mut dyn GroupedRowCursor,
    variables: &ReportVariables,
) -> ResolvedCell {
    cursor.set_property(PROP_REPORT_PAGE_NUMBER, &variables.page_number.to_string());
    cursor.set_property(PROP_REPORT_PAGE_COUNT, &variables.page_count.to_string());
    cursor.set_property(PROP_REPORT_CURRENT_DATE, &variables.current_date);
    cursor.set_property(PROP_REPORT_DATA_SOURCE, &variables.data_source);

    let section = match registry.get(tag.section_idx) {
        Some(section) => section,
        None => return ResolvedCell::default(),
    };

    let cell = match section
        .template
        .get_cell(tag.template_row_idx as u32, column as u32)
    {
        Some(cell) => cell,
        None => return ResolvedCell::default(),
    };

    let mut resolved = ResolvedCell {
        content: cell.content.clone(),
        mime_type: cell.mime_type.clone(),
        style: cell.style.clone(),
    };

    // Only plain text is ever treated as a formula.
    if resolved.mime_type != MIME_PLAIN_TEXT {
        return resolved;
    }

    let text = resolved.content.trim();
    if !text.starts_with('=') {
        return resolved;
    }

    // A lone "=" is a literal symbol.
    let expr = &text[1..];
    if expr.is_empty() {
        return resolved;
    }

    // Aggregates in this cell scope over the section's own group.
    cursor.set_group(&section.name);

    resolved.content = cursor
        .eval(tag.model_row_idx, expr)
        .unwrap_or_default();

    resolved
}
