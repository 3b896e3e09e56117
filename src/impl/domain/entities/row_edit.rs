use super::row::{CellValue, RowId};

/// A cell change waiting to be written back by the database layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEdit {
    pub id: RowId,
    pub column: String,
    pub value: CellValue,
}
