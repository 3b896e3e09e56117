use std::time::Duration;

use crate::entities::{AutoRefreshConfig, GridConfig};

/// On-disk (RON) shape of a grid config.
#[derive(Debug, serde_derive::Deserialize)]
pub(crate) struct GridConfigModel {
    pub title: String,
    pub columns: Vec<String>,
    pub id_column: String,
    #[serde(default)]
    pub period_column: Option<String>,
    #[serde(default)]
    pub duplicate_ignore_columns: Option<Vec<String>>,
    #[serde(default)]
    pub auto_refresh: Option<AutoRefreshModel>,
}

#[derive(Debug, serde_derive::Deserialize)]
pub(crate) struct AutoRefreshModel {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Into<GridConfig> for GridConfigModel {
    fn into(self) -> GridConfig {
        GridConfig {
            duplicate_ignore_columns: self
                .duplicate_ignore_columns
                .unwrap_or_else(|| vec![self.id_column.clone()]),
            title: self.title,
            columns: self.columns,
            id_column: self.id_column,
            period_column: self.period_column,
            auto_refresh: self.auto_refresh.map(Into::into).unwrap_or_default(),
        }
    }
}

impl Into<AutoRefreshConfig> for AutoRefreshModel {
    fn into(self) -> AutoRefreshConfig {
        AutoRefreshConfig {
            enabled: self.enabled,
            interval: Duration::from_secs(self.interval_secs),
        }
    }
}
