use async_trait::async_trait;
use fractic_server_error::ServerError;

use crate::entities::Row;

/// Source of grid rows (the database layer). Rows must carry stable ids: the
/// same record keeps the same id across loads.
#[async_trait]
pub trait RowsRepository: Send + Sync {
    async fn load_rows(&self) -> Result<Vec<Row>, ServerError>;
}
