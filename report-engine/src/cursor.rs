//! FILENAME: report-engine/src/cursor.rs
//! PURPOSE: The grouped row cursor the pager consumes.
//! CONTEXT: The cursor is the only view the engine has of the data source:
//! a forward-moving position over sorted rows, with named groups whose
//! begin/end boundaries are detected by comparing adjacent rows' key
//! values. `MemoryCursor` is the in-process implementation backed by a
//! plain row table; a database-backed source implements the same trait.

use rustc_hash::FxHashMap;

/// Row cursor over a grouped, sorted data source. Row indices passed to
/// `eval` are 1-based, matching the pager's data-row numbering.
///
/// The stream must already be physically ordered by the concatenation of
/// the group fields, outer to inner; boundary detection assumes it and
/// nothing here re-sorts.
pub trait GroupedRowCursor {
    fn go_first(&mut self);
    fn skip(&mut self, delta: i32);
    fn eof(&self) -> bool;

    /// Selects the named group for subsequent `begin_of_group` /
    /// `end_of_group` / aggregate calls. Returns false if no group with
    /// that name has been registered.
    fn set_group(&mut self, name: &str) -> bool;
    fn begin_of_group(&self) -> bool;
    fn end_of_group(&self) -> bool;

    /// Registers a group keyed by the given columns (cumulative, outer to
    /// inner). Returns false if a column does not exist.
    fn add_group(&mut self, name: &str, fields: &[String]) -> bool;

    /// Drops all registered groups, reinstalling the implicit per-row and
    /// whole-table groups under their canonical section labels.
    fn remove_all_groups(&mut self);

    fn is_loaded(&self) -> bool;
    fn execute(&mut self, block: bool);
    fn set_query(&mut self, query: &str);

    /// Evaluates an expression in the context of the given 1-based row:
    /// a report property, an aggregate over the current group's extent,
    /// or a column reference. Returns None when the expression cannot be
    /// resolved; the resolver renders that as blank.
    fn eval(&mut self, row_idx: i32, expr: &str) -> Option<String>;

    /// Publishes a report-scope value (page number, page count, ...) so
    /// formulas can reference it by property name.
    fn set_property(&mut self, name: &str, value: &str);
}

/// How a registered group derives its key from a row.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GroupKind {
    /// The whole table is one group (report header/footer scope).
    WholeTable,
    /// Every row begins and ends its own group (detail scope).
    EveryRow,
    /// Key is the tuple of values in these columns.
    Key(Vec<usize>),
}

/// In-memory cursor over a table of text values.
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    pos: usize,
    groups: FxHashMap<String, GroupKind>,
    current_group: Option<String>,
    properties: FxHashMap<String, String>,
    query: String,
    loaded: bool,
    fail_on_execute: bool,
}

impl MemoryCursor {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut cursor = MemoryCursor {
            columns,
            rows,
            pos: 0,
            groups: FxHashMap::default(),
            current_group: None,
            properties: FxHashMap::default(),
            query: String::new(),
            loaded: false,
            fail_on_execute: false,
        };
        cursor.remove_all_groups();
        cursor
    }

    /// Makes the next `execute` leave the cursor unloaded, simulating a
    /// failed query.
    pub fn fail_on_execute(&mut self, fail: bool) {
        self.fail_on_execute = fail;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    // Column names match without regard to case, like the SQL layer that
    // feeds the cursor.
    fn column_idx(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    fn value(&self, pos: usize, col: usize) -> Option<&str> {
        self.rows.get(pos)?.get(col).map(|s| s.as_str())
    }

    fn key_at(&self, pos: usize, cols: &[usize]) -> Option<Vec<&str>> {
        if pos >= self.rows.len() {
            return None;
        }
        cols.iter().map(|&c| self.value(pos, c)).collect()
    }

    /// The half-open row range of the current group occurrence containing
    /// `pos`. Used as the extent for aggregate evaluation.
    fn group_extent(&self, pos: usize) -> (usize, usize) {
        if self.rows.is_empty() {
            return (0, 0);
        }
        let pos = pos.min(self.rows.len() - 1);

        let kind = self
            .current_group
            .as_ref()
            .and_then(|name| self.groups.get(name));

        match kind {
            Some(GroupKind::EveryRow) => (pos, pos + 1),
            Some(GroupKind::Key(cols)) => {
                let key = self.key_at(pos, cols);
                let mut start = pos;
                while start > 0 && self.key_at(start - 1, cols) == key {
                    start -= 1;
                }
                let mut end = pos + 1;
                while end < self.rows.len() && self.key_at(end, cols) == key {
                    end += 1;
                }
                (start, end)
            }
            // No group selected behaves like the whole-table group.
            Some(GroupKind::WholeTable) | None => (0, self.rows.len()),
        }
    }

    fn format_number(n: f64) -> String {
        if n.fract() == 0.0 && n.abs() < 1e15 {
            format!("{:.0}", n)
        } else {
            format!("{}", n)
        }
    }

    /// Strips an optional `[...]` wrapper from a column reference.
    fn strip_brackets(name: &str) -> &str {
        let name = name.trim();
        if name.starts_with('[') && name.ends_with(']') && name.len() >= 2 {
            name[1..name.len() - 1].trim()
        } else {
            name
        }
    }

    fn eval_aggregate(&self, row_idx: i32, func: &str, arg: &str) -> Option<String> {
        let pos = (row_idx - 1).max(0) as usize;

        // COUNT takes no column: it counts the rows in the group extent.
        // A column argument is accepted but only has to exist.
        if func.eq_ignore_ascii_case("count") {
            let arg = Self::strip_brackets(arg);
            if !arg.is_empty() && self.column_idx(arg).is_none() {
                return None;
            }
            let (start, end) = self.group_extent(pos);
            return Some(Self::format_number((end - start) as f64));
        }

        let col = self.column_idx(Self::strip_brackets(arg))?;
        let (start, end) = self.group_extent(pos);

        let values: Vec<f64> = (start..end)
            .filter_map(|p| self.value(p, col))
            .filter_map(|v| v.trim().parse::<f64>().ok())
            .collect();

        if func.eq_ignore_ascii_case("sum") {
            return Some(Self::format_number(values.iter().sum()));
        }
        if func.eq_ignore_ascii_case("avg") {
            if values.is_empty() {
                return None;
            }
            let sum: f64 = values.iter().sum();
            return Some(Self::format_number(sum / values.len() as f64));
        }
        if func.eq_ignore_ascii_case("min") {
            return values
                .iter()
                .copied()
                .reduce(f64::min)
                .map(Self::format_number);
        }
        if func.eq_ignore_ascii_case("max") {
            return values
                .iter()
                .copied()
                .reduce(f64::max)
                .map(Self::format_number);
        }
        None
    }
}

impl GroupedRowCursor for MemoryCursor {
    fn go_first(&mut self) {
        self.pos = 0;
    }

    fn skip(&mut self, delta: i32) {
        if delta >= 0 {
            self.pos = self.pos.saturating_add(delta as usize);
        } else {
            self.pos = self.pos.saturating_sub((-delta) as usize);
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.rows.len()
    }

    fn set_group(&mut self, name: &str) -> bool {
        if self.groups.contains_key(name) {
            self.current_group = Some(name.to_string());
            true
        } else {
            false
        }
    }

    fn begin_of_group(&self) -> bool {
        if self.eof() {
            return false;
        }
        let kind = match self
            .current_group
            .as_ref()
            .and_then(|name| self.groups.get(name))
        {
            Some(kind) => kind,
            None => return false,
        };
        match kind {
            GroupKind::EveryRow => true,
            GroupKind::WholeTable => self.pos == 0,
            GroupKind::Key(cols) => {
                self.pos == 0 || self.key_at(self.pos, cols) != self.key_at(self.pos - 1, cols)
            }
        }
    }

    fn end_of_group(&self) -> bool {
        if self.eof() {
            return false;
        }
        let kind = match self
            .current_group
            .as_ref()
            .and_then(|name| self.groups.get(name))
        {
            Some(kind) => kind,
            None => return false,
        };
        match kind {
            GroupKind::EveryRow => true,
            GroupKind::WholeTable => self.pos + 1 == self.rows.len(),
            GroupKind::Key(cols) => {
                self.pos + 1 == self.rows.len()
                    || self.key_at(self.pos, cols) != self.key_at(self.pos + 1, cols)
            }
        }
    }

    fn add_group(&mut self, name: &str, fields: &[String]) -> bool {
        if fields.is_empty() {
            self.groups.insert(name.to_string(), GroupKind::WholeTable);
            return true;
        }
        let mut cols = Vec::with_capacity(fields.len());
        for field in fields {
            match self.column_idx(field) {
                Some(idx) => cols.push(idx),
                None => return false,
            }
        }
        self.groups.insert(name.to_string(), GroupKind::Key(cols));
        true
    }

    fn remove_all_groups(&mut self) {
        self.groups.clear();
        self.current_group = None;

        // Implicit groups under the canonical section labels: every row is
        // its own detail group, the report header/footer span the table.
        self.groups
            .insert("report.detail".to_string(), GroupKind::EveryRow);
        self.groups
            .insert("report.header".to_string(), GroupKind::WholeTable);
        self.groups
            .insert("report.footer".to_string(), GroupKind::WholeTable);
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn execute(&mut self, _block: bool) {
        self.loaded = !self.fail_on_execute;
        self.pos = 0;
    }

    fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        if query.is_empty() {
            self.loaded = false;
        }
    }

    fn eval(&mut self, row_idx: i32, expr: &str) -> Option<String> {
        let expr = expr.trim();
        if expr.is_empty() {
            return None;
        }

        // Report properties shadow columns.
        if let Some(value) = self.properties.get(expr) {
            return Some(value.clone());
        }

        // Aggregate call: NAME(arg).
        if let Some(open) = expr.find('(') {
            if expr.ends_with(')') {
                let func = expr[..open].trim();
                let arg = &expr[open + 1..expr.len() - 1];
                return self.eval_aggregate(row_idx, func, arg);
            }
        }

        // Plain column reference, optionally bracketed.
        let col = self.column_idx(Self::strip_brackets(expr))?;
        let pos = row_idx - 1;
        if pos < 0 {
            return None;
        }
        self.value(pos as usize, col).map(|v| v.to_string())
    }

    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }
}
