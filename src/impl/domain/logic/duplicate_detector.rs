use std::collections::{HashMap, HashSet};

use crate::entities::{Row, RowId};

/// Flags rows whose canonical values match another row's on every column
/// except `ignore_columns`. Both members of a pair are always flagged.
pub(crate) struct DuplicateDetector<'a> {
    columns: Vec<&'a str>,
}

impl<'a> DuplicateDetector<'a> {
    pub(crate) fn new(columns: &'a [String], ignore_columns: &[String]) -> Self {
        Self {
            columns: columns
                .iter()
                .filter(|c| !ignore_columns.contains(c))
                .map(String::as_str)
                .collect(),
        }
    }

    pub(crate) fn process(&self, rows: &[Row]) -> HashSet<RowId> {
        let groups: HashMap<Vec<String>, Vec<RowId>> =
            rows.iter().fold(HashMap::new(), |mut map, row| {
                let key = self
                    .columns
                    .iter()
                    .map(|c| row.get(c).canonical_string())
                    .collect();
                map.entry(key).or_default().push(row.id);
                map
            });
        groups
            .into_values()
            .filter(|ids| ids.len() > 1)
            .flatten()
            .collect()
    }
}
