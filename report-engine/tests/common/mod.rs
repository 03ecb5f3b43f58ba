//! FILENAME: tests/common/mod.rs
//! Fixtures for report-engine integration tests.

#![allow(dead_code)]

use report_engine::{MemoryCursor, PageLayoutInfo, Section, SectionType};
use report_model::{PageGeometry, TemplateCell, TemplateGrid};

/// A one-band template with the given row heights and column widths.
pub fn template(heights: &[i32], widths: &[i32]) -> TemplateGrid {
    let mut grid = TemplateGrid::new(heights.len(), widths.len());
    for (idx, h) in heights.iter().enumerate() {
        grid.set_row_height(idx, *h);
    }
    for (idx, w) in widths.iter().enumerate() {
        grid.set_col_width(idx, *w);
    }
    grid
}

/// A single-row section of the given height with two 900-unit columns.
pub fn band(section_type: SectionType, height: i32) -> Section {
    Section::new(section_type, template(&[height], &[900, 900]))
}

/// Page with a 2000 x 1000 printable area and a 100-unit margin frame.
pub fn standard_geometry() -> PageGeometry {
    PageGeometry::new(2200, 1200, 100, 100, 100, 100)
}

/// Cursor over `n` rows with a single "value" column holding the 1-based
/// row number.
pub fn plain_cursor(n: usize) -> MemoryCursor {
    let rows = (1..=n).map(|i| vec![i.to_string()]).collect();
    MemoryCursor::new(vec!["value".to_string()], rows)
}

/// Cursor over region/amount rows, sorted by region as the derived ORDER
/// BY would produce. `regions` gives each region's name and row count;
/// amounts are 10, 20, 30, ... per region.
pub fn sales_cursor(regions: &[(&str, usize)]) -> MemoryCursor {
    let columns = vec!["region".to_string(), "amount".to_string()];
    let mut rows = Vec::new();
    for (region, count) in regions {
        for i in 1..=*count {
            rows.push(vec![region.to_string(), (i * 10).to_string()]);
        }
    }
    MemoryCursor::new(columns, rows)
}

/// Registers the region group under both the header and footer names,
/// the way the engine's group population does.
pub fn add_region_groups(cursor: &mut MemoryCursor) {
    use report_engine::GroupedRowCursor;
    cursor.add_group("gh_region", &["region".to_string()]);
    cursor.add_group("gf_region", &["region".to_string()]);
}

/// Section list for a grouped sales report: region header/footer around a
/// detail band with region and amount formula cells, plus a SUM footer.
pub fn sales_sections(detail_height: i32) -> Vec<Section> {
    let mut detail_template = template(&[detail_height], &[900, 900]);
    detail_template.set_cell(0, 0, TemplateCell::new_formula("region"));
    detail_template.set_cell(0, 1, TemplateCell::new_formula("amount"));

    let mut footer_template = template(&[30], &[900, 900]);
    footer_template.set_cell(0, 0, TemplateCell::new_text("Total"));
    footer_template.set_cell(0, 1, TemplateCell::new_formula("SUM(amount)"));

    vec![
        Section::new(SectionType::GroupHeader, template(&[30], &[900, 900]))
            .named("gh_region")
            .with_group("region", false),
        Section::new(SectionType::Detail, detail_template),
        Section::new(SectionType::GroupFooter, footer_template)
            .named("gf_region")
            .with_group("region", false),
    ]
}

/// All detail-band row ranges across the returned pages, in page order.
pub fn detail_ranges(pages: &[PageLayoutInfo], detail_section_idx: usize) -> Vec<(i32, i32)> {
    pages
        .iter()
        .flat_map(|p| p.segments.iter())
        .filter(|s| s.section_idx == detail_section_idx)
        .map(|s| (s.row_start, s.row_end))
        .collect()
}

/// Asserts the ranges tile `[1, last_row]` exactly: contiguous, disjoint,
/// gap-free.
pub fn assert_row_coverage(ranges: &[(i32, i32)], last_row: i32) {
    let mut expected_start = 1;
    for &(start, end) in ranges {
        assert_eq!(start, expected_start, "gap or overlap before row {}", start);
        assert!(end >= start, "inverted range ({}, {})", start, end);
        expected_start = end + 1;
    }
    assert_eq!(expected_start, last_row + 1, "coverage stops short");
}
