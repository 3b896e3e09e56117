use std::{collections::HashMap, fs, str::FromStr as _};

use fractic_server_error::ServerError;

use crate::{
    data::models::cell_value_model::CellValueModel,
    domain::logic::period_parser::parse_period,
    entities::{
        CellValue, GridConfig, ImportedRecord, Row, RowId, FROM_DATE_COLUMN, TO_DATE_COLUMN,
    },
    errors::{InvalidCsv, InvalidCsvContent, InvalidRowId, MissingRowId, ReadError},
};

pub(crate) trait BookingsCsvDatasource {
    /// Import records, not yet stored. The id column may be blank.
    fn records_from_string(&self, s: &str) -> Result<Vec<ImportedRecord>, ServerError>;

    fn records_from_file<P>(&self, path: P) -> Result<Vec<ImportedRecord>, ServerError>
    where
        P: AsRef<std::path::Path>;

    /// Stored rows. Every record must carry an integer id.
    fn rows_from_string(&self, s: &str) -> Result<Vec<Row>, ServerError>;

    fn rows_from_file<P>(&self, path: P) -> Result<Vec<Row>, ServerError>
    where
        P: AsRef<std::path::Path>;
}

pub(crate) struct BookingsCsvDatasourceImpl {
    config: GridConfig,
}

type Fields = HashMap<String, CellValue>;

impl BookingsCsvDatasourceImpl {
    pub(crate) fn new(config: GridConfig) -> Self {
        Self { config }
    }

    /// Reads every record into a field map, keyed by record number (1-based)
    /// and paired with the trimmed raw text of the id column.
    fn read_fields(&self, s: &str) -> Result<Vec<(usize, String, Fields)>, ServerError> {
        let mut reader = csv::Reader::from_reader(s.as_bytes());
        let headers = reader
            .headers()
            .map_err(|e| InvalidCsv::with_debug(&e))?
            .clone();
        let positions: Vec<(&String, usize)> = self
            .config
            .columns
            .iter()
            .map(|column| {
                headers
                    .iter()
                    .position(|h| h.trim() == column)
                    .map(|i| (column, i))
                    .ok_or_else(|| {
                        InvalidCsvContent::new(&format!("missing column '{}'", column))
                    })
            })
            .collect::<Result<_, _>>()?;

        let records = reader
            .records()
            .enumerate()
            .map(|(i, r)| {
                r.map_err(|e| InvalidCsv::with_debug(&e)).and_then(|r| {
                    let mut fields = Fields::new();
                    let mut raw_id = String::new();
                    for (column, position) in &positions {
                        let raw = r.get(*position).unwrap_or("");
                        if **column == self.config.id_column {
                            raw_id = raw.trim().to_string();
                        }
                        let value = if Some(*column) == self.config.period_column.as_ref() {
                            // Period text is kept verbatim; dates are derived.
                            CellValue::from(Some(raw.trim()).filter(|t| !t.is_empty()))
                        } else {
                            CellValueModel::from_str(raw)?.into()
                        };
                        fields.insert((*column).clone(), value);
                    }
                    self.derive_period(&mut fields);
                    Ok((i + 1, raw_id, fields))
                })
            })
            .collect::<Result<Vec<_>, ServerError>>()?;
        log::debug!("read {} record(s) from CSV", records.len());
        Ok(records)
    }

    /// Fills `from_date` / `to_date` from the period column. Unparsed text
    /// leaves them null unless the source already supplied them.
    fn derive_period(&self, fields: &mut Fields) {
        let Some(period_column) = &self.config.period_column else {
            return;
        };
        let text = fields.get(period_column).map(CellValue::canonical_string);
        match text.as_deref().and_then(parse_period) {
            Some(period) => {
                fields.insert(FROM_DATE_COLUMN.to_string(), period.from.into());
                fields.insert(TO_DATE_COLUMN.to_string(), period.to.into());
            }
            None => {
                if let Some(text) = text.filter(|t| !t.is_empty()) {
                    log::warn!("booking period '{}' not recognized, dates left unset", text);
                }
                for column in [FROM_DATE_COLUMN, TO_DATE_COLUMN] {
                    fields.entry(column.to_string()).or_insert(CellValue::Null);
                }
            }
        }
    }

    /// Ids are parsed from the raw text as exact unsigned integers, never
    /// through a float.
    fn row_id(&self, record: usize, raw: &str) -> Result<RowId, ServerError> {
        if raw.is_empty() {
            return Err(MissingRowId::new(record, &self.config.id_column));
        }
        raw.parse::<u64>()
            .map(RowId)
            .map_err(|_| InvalidRowId::new(record, raw))
    }
}

impl BookingsCsvDatasource for BookingsCsvDatasourceImpl {
    fn records_from_string(&self, s: &str) -> Result<Vec<ImportedRecord>, ServerError> {
        Ok(self
            .read_fields(s)?
            .into_iter()
            .map(|(_, _, fields)| ImportedRecord { fields })
            .collect())
    }

    fn records_from_file<P>(&self, path: P) -> Result<Vec<ImportedRecord>, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        self.records_from_string(&fs::read_to_string(path).map_err(|e| ReadError::with_debug(&e))?)
    }

    fn rows_from_string(&self, s: &str) -> Result<Vec<Row>, ServerError> {
        self.read_fields(s)?
            .into_iter()
            .map(|(record, raw_id, fields)| {
                Ok(Row {
                    id: self.row_id(record, &raw_id)?,
                    fields,
                })
            })
            .collect()
    }

    fn rows_from_file<P>(&self, path: P) -> Result<Vec<Row>, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        self.rows_from_string(&fs::read_to_string(path).map_err(|e| ReadError::with_debug(&e))?)
    }
}
