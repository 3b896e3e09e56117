use std::collections::HashMap;

use super::row::CellValue;

/// A record read from an import file, before the database has assigned it an
/// id. Derived period columns sit alongside the original fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRecord {
    pub fields: HashMap<String, CellValue>,
}
