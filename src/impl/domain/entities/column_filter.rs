use std::collections::{BTreeMap, BTreeSet};

/// "Row's canonical value at `column` must be one of `allowed_values`."
///
/// An empty `allowed_values` would mean "show nothing"; the grid never
/// installs such a filter, because unchecking every value in the UI is
/// treated as clearing the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFilter {
    pub column: String,
    pub allowed_values: BTreeSet<String>,
}

/// Active filters, at most one per column. Applied as a logical AND.
pub type FilterSet = BTreeMap<String, ColumnFilter>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub ascending: bool,
}

// --

impl ColumnFilter {
    pub fn new<I, S>(column: &str, allowed_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.to_string(),
            allowed_values: allowed_values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, canonical_value: &str) -> bool {
        self.allowed_values.contains(canonical_value)
    }
}
