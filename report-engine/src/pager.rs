//! FILENAME: report-engine/src/pager.rs
//! PURPOSE: The pagination pass: data rows to per-page section segments.
//! CONTEXT: `layout_page` walks the registry once per data row, deciding
//! which sections occur for that row (report boundaries, group boundaries,
//! the detail band) and accumulating their template heights until the page
//! overflows or a section forces an explicit break. The scan is resumable:
//! its position is an explicit `PageState` value threaded between calls,
//! so laying out a whole report is just calling `layout_page` until it
//! returns None.

use crate::cursor::GroupedRowCursor;
use crate::definition::{SectionRegistry, SectionType};
use report_model::{PageGeometry, Rect};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One placed occurrence of a section on a page. `row_start..=row_end` are
/// the 1-based data rows the occurrence covers: a range for the detail
/// band, a single contextual row for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSegmentInfo {
    pub section_idx: usize,
    pub row_start: i32,
    pub row_end: i32,
}

impl PageSegmentInfo {
    pub fn new(section_idx: usize, row_start: i32, row_end: i32) -> Self {
        PageSegmentInfo {
            section_idx,
            row_start,
            row_end,
        }
    }
}

/// The layout of one page: its geometry plus the ordered segments placed
/// on it. Pure layout, nothing rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLayoutInfo {
    pub page_rect: Rect,
    pub layout_rect: Rect,
    pub segments: SmallVec<[PageSegmentInfo; 8]>,
}

impl PageLayoutInfo {
    pub fn new(geometry: &PageGeometry) -> Self {
        PageLayoutInfo {
            page_rect: geometry.page_rect(),
            layout_rect: geometry.layout_rect(),
            segments: SmallVec::new(),
        }
    }
}

/// Where the next `layout_page` call resumes: the section to continue at
/// within the registry, and the current 1-based data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub section_idx: usize,
    pub row_idx: i32,
}

impl PageState {
    pub fn initial() -> Self {
        PageState {
            section_idx: 0,
            row_idx: 1,
        }
    }
}

/// Lays out one page starting from `state`, leaving the cursor positioned
/// on the row the next page resumes at. Returns the page plus the state to
/// pass back in, or None when the report is fully laid out.
///
/// Without a cursor, or with a cursor already at end-of-data, the result
/// is a single page with an empty segment list.
pub fn layout_page(
    cursor: Option<&mut (dyn GroupedRowCursor + '_)>,
    registry: &SectionRegistry,
    geometry: &PageGeometry,
    state: PageState,
) -> Option<(PageLayoutInfo, PageState)> {
    let sections = registry.sections();
    let mut info = PageLayoutInfo::new(geometry);
    let mut section_idx = state.section_idx;
    let mut row_idx = state.row_idx;

    if section_idx >= sections.len() {
        return None;
    }

    let cursor = match cursor {
        Some(cursor) if !cursor.eof() => cursor,
        // No data: one blank page, then done on the next call.
        _ => {
            return Some((
                info,
                PageState {
                    section_idx: sections.len(),
                    row_idx,
                },
            ))
        }
    };

    // Page headers and footers cost the same on every page, so the space
    // left for everything else is fixed for the whole run.
    let usable_height = geometry.layout_rect().height
        - registry.total_height_of(SectionType::PageHeader)
        - registry.total_height_of(SectionType::PageFooter);

    let mut detail_segment = PageSegmentInfo::new(0, row_idx, row_idx);
    let mut total_height = 0i32;
    let mut section_count = 0usize;
    let mut save_detail = false;
    let mut report_ended = false;
    let mut page_break = false;

    // Each outer iteration handles one data row; the scan ends when the
    // page fills up or the data runs out. After end-of-data one extra pass
    // flushes the pending detail segment and places the report footer.
    // At least one section occurrence is always kept on a page so a
    // section taller than the page cannot loop forever.
    loop {
        let report_beginning = row_idx == 1;

        let mut it = section_idx;
        while it < sections.len() {
            let section = &sections[it];
            page_break = false;

            let mut group_beginning = false;
            let mut group_ending = false;
            if cursor.set_group(&section.name) {
                group_beginning = cursor.begin_of_group();
                group_ending = cursor.end_of_group();
            }

            let section_height = section.height();

            match section.section_type {
                SectionType::ReportHeader if report_beginning && !report_ended => {
                    section_count += 1;
                    info.segments.push(PageSegmentInfo::new(it, row_idx, row_idx));
                    detail_segment.row_start = row_idx;
                    detail_segment.row_end = row_idx;
                    total_height += section_height;
                    page_break = section.page_break;
                }
                SectionType::GroupHeader if group_beginning && !report_ended => {
                    section_count += 1;
                    if save_detail {
                        info.segments.push(detail_segment);
                        save_detail = false;
                    }
                    info.segments.push(PageSegmentInfo::new(it, row_idx, row_idx));
                    total_height += section_height;
                    page_break = section.page_break;
                }
                SectionType::Detail if !report_ended => {
                    section_count += 1;
                    if !save_detail {
                        detail_segment.row_start = row_idx;
                        detail_segment.row_end = row_idx;
                        save_detail = true;
                    }
                    // Only the end advances; the start stays put so
                    // consecutive detail rows coalesce into one segment.
                    detail_segment.section_idx = it;
                    detail_segment.row_end = row_idx;
                    total_height += section_height;
                    page_break = section.page_break;
                }
                SectionType::GroupFooter if group_ending && !report_ended => {
                    section_count += 1;
                    if save_detail {
                        info.segments.push(detail_segment);
                        save_detail = false;
                    }
                    info.segments.push(PageSegmentInfo::new(it, row_idx, row_idx));
                    total_height += section_height;
                    page_break = section.page_break;
                }
                SectionType::ReportFooter if report_ended => {
                    section_count += 1;
                    if save_detail {
                        info.segments.push(detail_segment);
                        save_detail = false;
                    }
                    // The cursor has already advanced past the data, so the
                    // footer's row context is the last real row.
                    info.segments
                        .push(PageSegmentInfo::new(it, row_idx - 1, row_idx - 1));
                    total_height += section_height;
                    page_break = section.page_break;
                }
                _ => {}
            }

            // Once the data has run out, any detail rows still pending are
            // flushed here; this only happens when there is no report
            // footer to flush them.
            if report_ended && save_detail {
                info.segments.push(detail_segment);
                save_detail = false;
            }

            if page_break {
                // A break on the detail band flushes the open segment so
                // its rows stay on this page.
                if save_detail {
                    info.segments.push(detail_segment);
                    save_detail = false;
                }

                section_idx = it + 1;
                if section_idx < sections.len() {
                    return Some((info, PageState { section_idx, row_idx }));
                }
                // Break on the last section: the row has to advance before
                // this page is returned.
                break;
            }

            if total_height > usable_height && section_count > 1 {
                // The page overflowed: the most recent addition comes back
                // off and the next page resumes with it. A multi-row detail
                // segment splits so only its last row is deferred.
                if save_detail {
                    if detail_segment.row_start == detail_segment.row_end {
                        info.segments.push(detail_segment);
                    } else {
                        let mut kept = detail_segment;
                        let mut deferred = detail_segment;
                        kept.row_end = detail_segment.row_end - 1;
                        deferred.row_start = detail_segment.row_end;
                        info.segments.push(kept);
                        info.segments.push(deferred);
                    }
                }

                section_idx = it;
                if let Some(deferred) = info.segments.pop() {
                    row_idx = deferred.row_start;
                }

                return Some((info, PageState { section_idx, row_idx }));
            }

            it += 1;
        }

        section_idx = 0;
        row_idx += 1;
        cursor.skip(1);

        if report_ended {
            break;
        }

        if cursor.eof() {
            report_ended = true;
        }

        if page_break && !report_ended {
            return Some((info, PageState { section_idx, row_idx }));
        }
    }

    // Leftover segments form the final, partially filled page.
    if !info.segments.is_empty() {
        return Some((
            info,
            PageState {
                section_idx: sections.len(),
                row_idx,
            },
        ));
    }

    None
}

/// Lays out the whole report from the first row.
pub fn layout_report(
    mut cursor: Option<&mut dyn GroupedRowCursor>,
    registry: &SectionRegistry,
    geometry: &PageGeometry,
) -> Vec<PageLayoutInfo> {
    if let Some(ref mut cursor) = cursor {
        cursor.go_first();
    }

    let mut pages = Vec::new();
    let mut state = PageState::initial();

    loop {
        // Explicit reborrow: the trait object has to be lent to each call
        // for that call only, not for the lifetime of the loop.
        let page_cursor = cursor.as_deref_mut();
        match layout_page(page_cursor, registry, geometry, state) {
            Some((info, next_state)) => {
                pages.push(info);
                state = next_state;
            }
            None => break,
        }
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::MemoryCursor;
    use crate::definition::Section;
    use report_model::TemplateGrid;

    fn template(height: i32) -> TemplateGrid {
        let mut grid = TemplateGrid::new(1, 2);
        grid.set_row_height(0, height);
        grid
    }

    // One column of `n` rows, no groups.
    fn rows_cursor(n: usize) -> MemoryCursor {
        let rows = (0..n).map(|i| vec![format!("{}", i)]).collect();
        MemoryCursor::new(vec!["value".to_string()], rows)
    }

    fn geometry(layout_height: i32) -> PageGeometry {
        PageGeometry::new(2000, layout_height + 200, 0, 0, 100, 100)
    }

    #[test]
    fn test_detail_rows_coalesce_and_split() {
        // usable = 1000 - 100 - 80 = 820; 16 detail rows of 50 fit.
        let registry = SectionRegistry::from_sections(vec![
            Section::new(SectionType::PageHeader, template(100)),
            Section::new(SectionType::Detail, template(50)),
            Section::new(SectionType::PageFooter, template(80)),
        ])
        .unwrap();

        let mut cursor = rows_cursor(40);
        let pages = layout_report(Some(&mut cursor), &registry, &geometry(1000));

        assert_eq!(pages.len(), 3);
        let ranges: Vec<(i32, i32)> = pages
            .iter()
            .map(|p| (p.segments[0].row_start, p.segments[0].row_end))
            .collect();
        assert_eq!(ranges, vec![(1, 16), (17, 32), (33, 40)]);

        // Each page holds a single coalesced detail segment.
        for page in &pages {
            assert_eq!(page.segments.len(), 1);
        }
    }

    #[test]
    fn test_no_cursor_yields_single_blank_page() {
        let registry =
            SectionRegistry::from_sections(vec![Section::new(SectionType::Detail, template(50))])
                .unwrap();

        let pages = layout_report(None, &registry, &geometry(1000));
        assert_eq!(pages.len(), 1);
        assert!(pages[0].segments.is_empty());
    }

    #[test]
    fn test_empty_data_yields_single_blank_page() {
        let registry = SectionRegistry::from_sections(vec![
            Section::new(SectionType::ReportHeader, template(60)),
            Section::new(SectionType::Detail, template(50)),
        ])
        .unwrap();

        let mut cursor = rows_cursor(0);
        let pages = layout_report(Some(&mut cursor), &registry, &geometry(1000));
        assert_eq!(pages.len(), 1);
        assert!(pages[0].segments.is_empty());
    }

    #[test]
    fn test_oversized_section_still_makes_progress() {
        // Detail is taller than the usable area; every row still lands on
        // its own page and the run terminates.
        let registry =
            SectionRegistry::from_sections(vec![Section::new(SectionType::Detail, template(5000))])
                .unwrap();

        let mut cursor = rows_cursor(3);
        let pages = layout_report(Some(&mut cursor), &registry, &geometry(1000));

        assert_eq!(pages.len(), 3);
        for (idx, page) in pages.iter().enumerate() {
            assert_eq!(page.segments.len(), 1);
            assert_eq!(page.segments[0].row_start, idx as i32 + 1);
            assert_eq!(page.segments[0].row_end, idx as i32 + 1);
        }
    }

    #[test]
    fn test_report_header_and_footer_placement() {
        let registry = SectionRegistry::from_sections(vec![
            Section::new(SectionType::ReportHeader, template(60)),
            Section::new(SectionType::Detail, template(50)),
            Section::new(SectionType::ReportFooter, template(40)),
        ])
        .unwrap();

        let mut cursor = rows_cursor(3);
        let pages = layout_report(Some(&mut cursor), &registry, &geometry(1000));

        assert_eq!(pages.len(), 1);
        let segments = &pages[0].segments;
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].section_idx, 0); // report header
        assert_eq!((segments[1].row_start, segments[1].row_end), (1, 3));
        // Footer context is the last data row.
        assert_eq!(segments[2].section_idx, 2);
        assert_eq!((segments[2].row_start, segments[2].row_end), (3, 3));
    }

    #[test]
    fn test_resumable_state_round_trip() {
        let registry = SectionRegistry::from_sections(vec![
            Section::new(SectionType::Detail, template(50)),
        ])
        .unwrap();
        let geometry = geometry(1000);

        let mut cursor = rows_cursor(50);
        cursor.go_first();

        let (first, state) =
            layout_page(Some(&mut cursor), &registry, &geometry, PageState::initial()).unwrap();
        assert_eq!(first.segments[0].row_start, 1);
        assert_eq!(state.row_idx, first.segments[0].row_end + 1);
        assert_eq!(state.section_idx, 0);

        let (second, _) = layout_page(Some(&mut cursor), &registry, &geometry, state).unwrap();
        assert_eq!(second.segments[0].row_start, state.row_idx);
    }

    #[test]
    fn test_group_header_footer_segments() {
        let registry = SectionRegistry::from_sections(vec![
            Section::new(SectionType::GroupHeader, template(30))
                .named("gh_region")
                .with_group("region", false),
            Section::new(SectionType::Detail, template(50)),
            Section::new(SectionType::GroupFooter, template(30))
                .named("gf_region")
                .with_group("region", false),
        ])
        .unwrap();

        let columns = vec!["region".to_string(), "amount".to_string()];
        let rows = vec![
            vec!["East".to_string(), "10".to_string()],
            vec!["East".to_string(), "20".to_string()],
            vec!["West".to_string(), "5".to_string()],
        ];
        let mut cursor = MemoryCursor::new(columns, rows);
        cursor.add_group("gh_region", &["region".to_string()]);
        cursor.add_group("gf_region", &["region".to_string()]);

        let pages = layout_report(Some(&mut cursor), &registry, &geometry(1000));
        assert_eq!(pages.len(), 1);

        let kinds: Vec<(usize, i32, i32)> = pages[0]
            .segments
            .iter()
            .map(|s| (s.section_idx, s.row_start, s.row_end))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (0, 1, 1), // header East
                (1, 1, 2), // detail East
                (2, 2, 2), // footer East
                (0, 3, 3), // header West
                (1, 3, 3), // detail West
                (2, 3, 3), // footer West
            ]
        );
    }

    #[test]
    fn test_explicit_page_break_on_group_footer() {
        let registry = SectionRegistry::from_sections(vec![
            Section::new(SectionType::GroupHeader, template(30))
                .named("gh_region")
                .with_group("region", false),
            Section::new(SectionType::Detail, template(50)),
            Section::new(SectionType::GroupFooter, template(30))
                .named("gf_region")
                .with_group("region", false)
                .with_page_break(true),
        ])
        .unwrap();

        let columns = vec!["region".to_string()];
        let rows = vec![
            vec!["East".to_string()],
            vec!["East".to_string()],
            vec!["West".to_string()],
        ];
        let mut cursor = MemoryCursor::new(columns, rows);
        cursor.add_group("gh_region", &["region".to_string()]);
        cursor.add_group("gf_region", &["region".to_string()]);

        let pages = layout_report(Some(&mut cursor), &registry, &geometry(1000));

        // Plenty of usable height remains, but each group still gets its
        // own page.
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].segments.last().unwrap().section_idx, 2);
        assert_eq!(pages[1].segments[0].section_idx, 0);
        assert_eq!(pages[1].segments[0].row_start, 3);
    }
}
