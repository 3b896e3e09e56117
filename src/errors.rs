use fractic_server_error::{define_client_error, define_internal_error};

use crate::entities::RowId;

// IO-related.
define_client_error!(ReadError, "Error reading file.");

// Parsing-related.
define_client_error!(InvalidCsv, "Invalid CSV format.");
define_client_error!(InvalidCsvContent, "Invalid CSV content: {details}.", { details: &str });
define_client_error!(InvalidRon, "Invalid {ron_type} (invalid RON format).", { ron_type: &str });
define_client_error!(InvalidGridConfig, "Invalid grid config: {details}.", { details: &str });

// Row-related.
define_client_error!(
    MissingRowId,
    "Record {line} has no value in id column '{column}'.",
    { line: usize, column: &str }
);
define_client_error!(
    InvalidRowId,
    "Record {line} has invalid id '{value}' (expected a non-negative integer).",
    { line: usize, value: &str }
);
define_client_error!(
    DuplicateRowId,
    "Row id {id} appears more than once; reload rejected.",
    { id: &RowId }
);
define_client_error!(
    UnknownRowColumn,
    "Row {id} has field '{column}', which is not part of the grid columns; reload rejected.",
    { id: &RowId, column: &str }
);
define_client_error!(UnknownRowId, "No row with id {id} in the grid.", { id: &RowId });

// Grid contract violations.
define_internal_error!(
    UnknownColumn,
    "Column '{column}' is not part of the grid columns.",
    { column: &str }
);
