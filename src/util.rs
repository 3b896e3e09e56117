use std::path::{Path, PathBuf};

use fractic_server_error::ServerError;

use crate::{
    data::{
        datasources::{
            bookings_csv_datasource::{BookingsCsvDatasource as _, BookingsCsvDatasourceImpl},
            grid_config_datasource::{validate, GridConfigDatasource as _, GridConfigDatasourceImpl},
        },
        repositories::csv_rows_repository_impl::CsvRowsRepositoryImpl,
    },
    entities::{GridConfig, ImportedRecord},
    grid::{GridEngine, GridExport, GridSession, RowsRepository},
};

/// Entry point for one grid screen (services, project bookings, ...): reads
/// its config, imports records, and builds the engine and refresh session.
pub struct BookingGridUtil {
    config: GridConfig,
    datasource: BookingsCsvDatasourceImpl,
}

impl BookingGridUtil {
    pub fn new(config: GridConfig) -> Result<Self, ServerError> {
        validate(&config)?;
        Ok(Self {
            datasource: BookingsCsvDatasourceImpl::new(config.clone()),
            config,
        })
    }

    /// Config in RON format.
    pub fn from_config_str(config: &str) -> Result<Self, ServerError> {
        Self::new(GridConfigDatasourceImpl::new().from_string(config)?)
    }

    pub fn from_config_file<P>(path: P) -> Result<Self, ServerError>
    where
        P: AsRef<Path>,
    {
        Self::new(GridConfigDatasourceImpl::new().from_file(path)?)
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Reads import records from CSV text, with booking-period dates derived
    /// when a period column is configured. Records are not stored.
    pub fn import_from_string(&self, csv: &str) -> Result<Vec<ImportedRecord>, ServerError> {
        self.datasource.records_from_string(csv)
    }

    pub fn import_from_file<P>(&self, path: P) -> Result<Vec<ImportedRecord>, ServerError>
    where
        P: AsRef<Path>,
    {
        self.datasource.records_from_file(path)
    }

    /// An empty engine over the configured schema.
    pub fn new_engine(&self) -> GridEngine {
        GridEngine::from_config(&self.config)
    }

    pub fn session<R: RowsRepository>(&self, repository: R) -> GridSession<R> {
        GridSession::new(self.new_engine(), repository, self.config.auto_refresh)
    }

    /// Session over a CSV file holding stored rows (with ids).
    pub fn csv_session<P>(&self, path: P) -> GridSession<CsvRowsRepositoryImpl>
    where
        P: Into<PathBuf>,
    {
        self.session(CsvRowsRepositoryImpl::new(path, self.config.clone()))
    }

    pub fn export(&self, engine: &GridEngine) -> GridExport {
        GridExport::from_engine(&self.config.title, engine)
    }
}
