use std::path::PathBuf;

use async_trait::async_trait;
use fractic_server_error::ServerError;

use crate::{
    data::datasources::bookings_csv_datasource::{
        BookingsCsvDatasource, BookingsCsvDatasourceImpl,
    },
    domain::repositories::rows_repository::RowsRepository,
    entities::{GridConfig, Row},
    errors::ReadError,
};

/// Rows stored in a CSV file with an id column, re-read on every load.
pub struct CsvRowsRepositoryImpl {
    path: PathBuf,
    datasource: BookingsCsvDatasourceImpl,
}

#[async_trait]
impl RowsRepository for CsvRowsRepositoryImpl {
    async fn load_rows(&self) -> Result<Vec<Row>, ServerError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ReadError::with_debug(&e))?;
        self.datasource.rows_from_string(&contents)
    }
}

impl CsvRowsRepositoryImpl {
    pub fn new<P: Into<PathBuf>>(path: P, config: GridConfig) -> Self {
        Self {
            path: path.into(),
            datasource: BookingsCsvDatasourceImpl::new(config),
        }
    }
}
