//! FILENAME: report-engine/src/definition.rs
//! PURPOSE: Report sections and the validated section registry.
//! CONTEXT: A report is configured as a list of named, typed template bands.
//! The registry is the validated form the pager runs against: inactive
//! sections are dropped, the canonical band order is enforced, and the
//! group header/footer structure is checked up front so layout never has
//! to deal with a malformed configuration.

use crate::error::ReportError;
use report_model::TemplateGrid;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The kind of band a section is. The registry keeps sections in this
/// order: report header, page header, group headers outer to inner, the
/// detail band, group footers inner to outer, page footer, report footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionType {
    ReportHeader,
    PageHeader,
    GroupHeader,
    Detail,
    GroupFooter,
    PageFooter,
    ReportFooter,
}

impl SectionType {
    /// Canonical section label, also used as the default group name on
    /// the cursor for sections without an explicit group.
    pub fn default_name(&self) -> &'static str {
        match self {
            SectionType::ReportHeader => "report.header",
            SectionType::PageHeader => "report.page.header",
            SectionType::GroupHeader => "report.group.header",
            SectionType::Detail => "report.detail",
            SectionType::GroupFooter => "report.group.footer",
            SectionType::PageFooter => "report.page.footer",
            SectionType::ReportFooter => "report.footer",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SectionType::ReportHeader => 0,
            SectionType::PageHeader => 1,
            SectionType::GroupHeader => 2,
            SectionType::Detail => 3,
            SectionType::GroupFooter => 4,
            SectionType::PageFooter => 5,
            SectionType::ReportFooter => 6,
        }
    }
}

/// One named template band of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub section_type: SectionType,
    /// Column the group breaks on; empty for non-group sections.
    pub group_field: String,
    pub sort_descending: bool,
    /// Forces a new page immediately after this section is placed.
    pub page_break: bool,
    /// Inactive sections never enter the registry.
    pub active: bool,
    pub template: TemplateGrid,
}

impl Section {
    pub fn new(section_type: SectionType, template: TemplateGrid) -> Self {
        Section {
            name: section_type.default_name().to_string(),
            section_type,
            group_field: String::new(),
            sort_descending: false,
            page_break: false,
            active: true,
            template,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_group(mut self, field: impl Into<String>, sort_descending: bool) -> Self {
        self.group_field = field.into();
        self.sort_descending = sort_descending;
        self
    }

    pub fn with_page_break(mut self, page_break: bool) -> Self {
        self.page_break = page_break;
        self
    }

    /// Total template height of one occurrence of this section.
    pub fn height(&self) -> i32 {
        self.template.height()
    }
}

/// The validated, canonically ordered list of active sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    /// Builds a registry from a raw section list. Inactive sections are
    /// dropped; the rest are stably reordered into canonical band order,
    /// so group headers keep their outer-to-inner order and group footers
    /// their inner-to-outer order as authored. Fails on an empty list,
    /// anything other than exactly one detail band, mismatched group
    /// header/footer counts, duplicate names, or a duplicated
    /// header/footer singleton.
    pub fn from_sections(sections: Vec<Section>) -> Result<Self, ReportError> {
        let mut sections: Vec<Section> = sections.into_iter().filter(|s| s.active).collect();

        if sections.is_empty() {
            return Err(ReportError::EmptyRegistry);
        }

        let mut names = HashSet::new();
        for section in &sections {
            if !names.insert(section.name.clone()) {
                return Err(ReportError::DuplicateSection(section.name.clone()));
            }
        }

        let count_of = |sections: &[Section], t: SectionType| {
            sections.iter().filter(|s| s.section_type == t).count()
        };

        let detail_count = count_of(&sections, SectionType::Detail);
        if detail_count != 1 {
            return Err(ReportError::DetailCount(detail_count));
        }

        let headers = count_of(&sections, SectionType::GroupHeader);
        let footers = count_of(&sections, SectionType::GroupFooter);
        if headers != footers {
            return Err(ReportError::GroupMismatch { headers, footers });
        }

        for t in [
            SectionType::ReportHeader,
            SectionType::PageHeader,
            SectionType::PageFooter,
            SectionType::ReportFooter,
        ] {
            if count_of(&sections, t) > 1 {
                return Err(ReportError::DuplicateSingleton(t.default_name()));
            }
        }

        sections.sort_by_key(|s| s.section_type.rank());
        Ok(SectionRegistry { sections })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Section> {
        self.sections.get(idx)
    }

    /// Sum of template heights of all sections of the given type. Page
    /// header and footer heights are a fixed per-page cost, so the pager
    /// computes usable height from these.
    pub fn total_height_of(&self, section_type: SectionType) -> i32 {
        self.sections
            .iter()
            .filter(|s| s.section_type == section_type)
            .map(|s| s.height())
            .sum()
    }

    /// The ORDER BY expression the data source must be executed with:
    /// group fields outer to inner, each with its direction, followed by
    /// any caller-supplied tail ordering.
    pub fn sort_expression(&self, tail: &str) -> String {
        let mut expr = String::new();
        for section in &self.sections {
            if section.section_type != SectionType::GroupHeader || section.group_field.is_empty() {
                continue;
            }
            if !expr.is_empty() {
                expr.push(',');
            }
            expr.push_str(&section.group_field);
            if section.sort_descending {
                expr.push_str(" DESC");
            }
        }
        if !tail.is_empty() {
            if !expr.is_empty() {
                expr.push(',');
            }
            expr.push_str(tail);
        }
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(section_type: SectionType) -> Section {
        Section::new(section_type, TemplateGrid::new(1, 2))
    }

    #[test]
    fn test_registry_reorders_to_canonical_order() {
        let registry = SectionRegistry::from_sections(vec![
            band(SectionType::PageFooter),
            band(SectionType::Detail),
            band(SectionType::PageHeader),
            band(SectionType::ReportHeader),
        ])
        .unwrap();

        let order: Vec<SectionType> = registry
            .sections()
            .iter()
            .map(|s| s.section_type)
            .collect();
        assert_eq!(
            order,
            vec![
                SectionType::ReportHeader,
                SectionType::PageHeader,
                SectionType::Detail,
                SectionType::PageFooter,
            ]
        );
    }

    #[test]
    fn test_group_order_is_stable() {
        let registry = SectionRegistry::from_sections(vec![
            band(SectionType::GroupHeader)
                .named("gh_region")
                .with_group("region", false),
            band(SectionType::GroupHeader)
                .named("gh_city")
                .with_group("city", false),
            band(SectionType::Detail),
            band(SectionType::GroupFooter)
                .named("gf_city")
                .with_group("city", false),
            band(SectionType::GroupFooter)
                .named("gf_region")
                .with_group("region", false),
        ])
        .unwrap();

        let names: Vec<&str> = registry.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["gh_region", "gh_city", "report.detail", "gf_city", "gf_region"]
        );
    }

    #[test]
    fn test_inactive_sections_dropped() {
        let mut inactive = band(SectionType::ReportHeader);
        inactive.active = false;

        let registry =
            SectionRegistry::from_sections(vec![inactive, band(SectionType::Detail)]).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(0).unwrap().section_type, SectionType::Detail);
    }

    #[test]
    fn test_validation_failures() {
        assert_eq!(
            SectionRegistry::from_sections(vec![]),
            Err(ReportError::EmptyRegistry)
        );

        assert_eq!(
            SectionRegistry::from_sections(vec![band(SectionType::PageHeader)]),
            Err(ReportError::DetailCount(0))
        );

        assert_eq!(
            SectionRegistry::from_sections(vec![
                band(SectionType::Detail),
                band(SectionType::GroupHeader).named("gh").with_group("a", false),
            ]),
            Err(ReportError::GroupMismatch {
                headers: 1,
                footers: 0
            })
        );

        assert_eq!(
            SectionRegistry::from_sections(vec![
                band(SectionType::Detail).named("dup"),
                band(SectionType::PageHeader).named("dup"),
            ]),
            Err(ReportError::DuplicateSection("dup".to_string()))
        );

        assert_eq!(
            SectionRegistry::from_sections(vec![
                band(SectionType::Detail),
                band(SectionType::PageFooter).named("pf1"),
                band(SectionType::PageFooter).named("pf2"),
            ]),
            Err(ReportError::DuplicateSingleton("report.page.footer"))
        );
    }

    #[test]
    fn test_sort_expression() {
        let registry = SectionRegistry::from_sections(vec![
            band(SectionType::GroupHeader)
                .named("gh_region")
                .with_group("region", false),
            band(SectionType::GroupHeader)
                .named("gh_city")
                .with_group("city", true),
            band(SectionType::Detail),
            band(SectionType::GroupFooter)
                .named("gf_city")
                .with_group("city", true),
            band(SectionType::GroupFooter)
                .named("gf_region")
                .with_group("region", false),
        ])
        .unwrap();

        assert_eq!(registry.sort_expression(""), "region,city DESC");
        assert_eq!(
            registry.sort_expression("order_id"),
            "region,city DESC,order_id"
        );
    }
}
