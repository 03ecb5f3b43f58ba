//! FILENAME: report-engine/src/engine.rs
//! PURPOSE: The report layout engine: the surface the editor, print, and
//! export layers drive.
//! CONTEXT: Owns the cursor and the validated registry, derives the query
//! and sort order, runs the pagination pass, and caches the resulting page
//! layouts. Pages are materialized on demand from the cache; cell values
//! resolve lazily on top of that. Cursor population may be asynchronous:
//! callers that do not block register a layout-updated callback and call
//! `on_cursor_loaded` when the data arrives.

use crate::cursor::GroupedRowCursor;
use crate::definition::{Section, SectionRegistry, SectionType};
use crate::error::ReportError;
use crate::pager::{layout_report, PageLayoutInfo};
use crate::resolve::{resolve_cell, ReportVariables, ResolvedCell};
use crate::view::{materialize_page, LayoutGrid, RowTag};
use log::{debug, info, warn};
use report_model::{PageGeometry, Rect};

type LayoutUpdatedCallback = Box<dyn Fn()>;

pub struct ReportLayoutEngine {
    cursor: Box<dyn GroupedRowCursor>,
    registry: Option<SectionRegistry>,
    geometry: PageGeometry,
    data_source: String,
    data_filter: String,
    data_order: String,
    cache_pages: Vec<PageLayoutInfo>,
    variables: ReportVariables,
    block: bool,
    layout_updated: Option<LayoutUpdatedCallback>,
}

impl ReportLayoutEngine {
    pub fn new(cursor: Box<dyn GroupedRowCursor>) -> Self {
        ReportLayoutEngine {
            cursor,
            registry: None,
            geometry: PageGeometry::default(),
            data_source: String::new(),
            data_filter: String::new(),
            data_order: String::new(),
            cache_pages: Vec::new(),
            variables: ReportVariables::default(),
            block: false,
            layout_updated: None,
        }
    }

    /// Configures the engine for a layout run. Sections are validated into
    /// a registry and the sort order is derived from the group structure,
    /// with `order_tail` appended after the group fields. Fails before any
    /// page is produced if the configuration is unusable.
    pub fn init(
        &mut self,
        sections: Vec<Section>,
        data_source: &str,
        data_filter: &str,
        order_tail: &str,
        geometry: PageGeometry,
        reset_model: bool,
    ) -> Result<(), ReportError> {
        if reset_model {
            self.reset();
        }

        if data_source.is_empty() {
            return Err(ReportError::MissingDataSource);
        }

        let registry = SectionRegistry::from_sections(sections)?;
        self.data_order = registry.sort_expression(order_tail);
        self.registry = Some(registry);
        self.data_source = data_source.to_string();
        self.data_filter = data_filter.to_string();
        self.geometry = geometry;
        Ok(())
    }

    /// Registered callback fires once pagination completes, on both the
    /// blocking and the asynchronous population paths.
    pub fn set_layout_updated(&mut self, callback: impl Fn() + 'static) {
        self.layout_updated = Some(Box::new(callback));
    }

    /// Sets the date published to formulas as `report.current.date`. Date
    /// formatting is a locale concern, so the caller supplies it as text.
    pub fn set_current_date(&mut self, date: impl Into<String>) {
        self.variables.current_date = date.into();
    }

    /// Populates the cursor and runs the full pagination pass. A no-op if
    /// the page cache is already populated; `reset` first to force a
    /// re-layout.
    pub fn execute(&mut self, block: bool) {
        if !self.cache_pages.is_empty() {
            return;
        }
        self.block = block;
        self.populate_cache();
    }

    /// Re-entry point for asynchronous population: call when the cursor
    /// reports loaded after a non-blocking `execute`.
    pub fn on_cursor_loaded(&mut self) {
        if self.cache_pages.is_empty() {
            self.populate_cache();
        }
    }

    /// Discards the page cache and the cursor's query; the next `execute`
    /// runs a fresh layout.
    pub fn reset(&mut self) {
        self.cache_pages.clear();
        self.cursor.set_query("");
    }

    pub fn is_ready(&self) -> bool {
        self.cursor.is_loaded() && !self.cache_pages.is_empty()
    }

    pub fn get_page_count(&self) -> usize {
        self.cache_pages.len()
    }

    pub fn get_page_sizes(&self) -> Vec<Rect> {
        self.cache_pages.iter().map(|p| p.page_rect).collect()
    }

    /// Materializes one page from the cache. Out-of-range indices yield a
    /// stock blank page at the configured geometry.
    pub fn get_page_by_idx(&self, page_idx: usize) -> LayoutGrid {
        let info = self.cache_pages.get(page_idx);
        match (info, self.registry.as_ref()) {
            (Some(info), Some(registry)) => materialize_page(info, registry),
            _ => LayoutGrid::empty(self.geometry.page_rect(), self.geometry.layout_rect()),
        }
    }

    /// Resolves one cell of a materialized page, with the page number and
    /// count injected for that page.
    pub fn resolve_cell(&mut self, page_idx: usize, tag: &RowTag, column: usize) -> ResolvedCell {
        let registry = match self.registry.as_ref() {
            Some(registry) => registry,
            None => return ResolvedCell::default(),
        };

        let variables = ReportVariables {
            page_number: page_idx as i32 + 1,
            ..self.variables.clone()
        };

        resolve_cell(tag, column, registry, self.cursor.as_mut(), &variables)
    }

    fn populate_cache(&mut self) {
        self.cache_pages.clear();

        let registry = match self.registry.as_ref() {
            Some(registry) => registry,
            None => return,
        };

        if !self.cursor.is_loaded() {
            let query = build_query(&self.data_source, &self.data_filter, &self.data_order);
            debug!("report query: {}", query);
            self.cursor.set_query(&query);
            self.cursor.execute(self.block);
        }

        if !self.cursor.is_loaded() {
            // Either the query failed or a non-blocking load is still in
            // flight; the notification fires either way and callers see
            // zero pages until the cursor comes back loaded.
            warn!("report cursor not loaded, layout skipped");
            self.fire_layout_updated();
            return;
        }

        populate_groups(self.cursor.as_mut(), registry);

        self.cache_pages = layout_report(Some(self.cursor.as_mut()), registry, &self.geometry);

        self.variables.page_count = self.cache_pages.len() as i32;
        self.variables.data_source = self.data_source.clone();

        info!(
            "report layout complete: {} pages from {}",
            self.cache_pages.len(),
            self.data_source
        );
        self.fire_layout_updated();
    }

    fn fire_layout_updated(&self) {
        if let Some(callback) = &self.layout_updated {
            callback();
        }
    }
}

fn build_query(data_source: &str, data_filter: &str, data_order: &str) -> String {
    let mut query = format!("SELECT * FROM {}", data_source);
    if !data_filter.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(data_filter);
    }
    if !data_order.is_empty() {
        query.push_str(" ORDER BY ");
        query.push_str(data_order);
    }
    query
}

/// Registers the report's groups on the cursor. Header keys accumulate
/// outer to inner; footers are visited in reversed registry order, so the
/// outermost footer registers first and each footer ends up with the same
/// key columns as its header.
fn populate_groups(cursor: &mut dyn GroupedRowCursor, registry: &SectionRegistry) {
    cursor.remove_all_groups();

    let mut header_fields: Vec<String> = Vec::new();
    for section in registry.sections() {
        if section.section_type != SectionType::GroupHeader || section.group_field.is_empty() {
            continue;
        }
        header_fields.push(section.group_field.clone());
        if !cursor.add_group(&section.name, &header_fields) {
            warn!("group column not found for section {}", section.name);
        }
    }

    let mut footer_fields: Vec<String> = Vec::new();
    for section in registry.sections().iter().rev() {
        if section.section_type != SectionType::GroupFooter || section.group_field.is_empty() {
            continue;
        }
        footer_fields.push(section.group_field.clone());
        if !cursor.add_group(&section.name, &footer_fields) {
            warn!("group column not found for section {}", section.name);
        }
    }
}
