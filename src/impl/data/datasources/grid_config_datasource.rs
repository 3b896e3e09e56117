use std::fs;

use fractic_server_error::ServerError;
use ron::from_str;

use crate::{
    data::models::grid_config_model::GridConfigModel,
    entities::GridConfig,
    errors::{InvalidGridConfig, InvalidRon, ReadError},
};

pub(crate) trait GridConfigDatasource {
    fn from_string(&self, s: &str) -> Result<GridConfig, ServerError>;

    fn from_file<P>(&self, path: P) -> Result<GridConfig, ServerError>
    where
        P: AsRef<std::path::Path>;
}

pub(crate) struct GridConfigDatasourceImpl;

impl GridConfigDatasourceImpl {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl GridConfigDatasource for GridConfigDatasourceImpl {
    fn from_string(&self, s: &str) -> Result<GridConfig, ServerError> {
        let model: GridConfigModel =
            from_str(s).map_err(|e| InvalidRon::with_debug("GridConfig", &e))?;
        let config: GridConfig = model.into();
        validate(&config)?;
        Ok(config)
    }

    fn from_file<P>(&self, path: P) -> Result<GridConfig, ServerError>
    where
        P: AsRef<std::path::Path>,
    {
        self.from_string(&fs::read_to_string(path).map_err(|e| ReadError::with_debug(&e))?)
    }
}

pub(crate) fn validate(config: &GridConfig) -> Result<(), ServerError> {
    let known = |c: &str| config.columns.iter().any(|column| column == c);
    if config.columns.is_empty() {
        return Err(InvalidGridConfig::new("no columns"));
    }
    if let Some(duplicate) = config
        .columns
        .iter()
        .enumerate()
        .find(|(i, c)| config.columns[..*i].contains(c))
        .map(|(_, c)| c)
    {
        return Err(InvalidGridConfig::new(&format!(
            "column '{}' listed twice",
            duplicate
        )));
    }
    if !known(config.id_column.as_str()) {
        return Err(InvalidGridConfig::new(&format!(
            "id column '{}' is not a column",
            config.id_column
        )));
    }
    if let Some(period) = config.period_column.as_ref().filter(|p| !known(p.as_str())) {
        return Err(InvalidGridConfig::new(&format!(
            "period column '{}' is not a column",
            period
        )));
    }
    let schema = config.schema();
    if let Some(ignored) = config
        .duplicate_ignore_columns
        .iter()
        .find(|c| !schema.contains(c))
    {
        return Err(InvalidGridConfig::new(&format!(
            "duplicate-ignore column '{}' is not a column",
            ignored
        )));
    }
    if config.auto_refresh.enabled && config.auto_refresh.interval.is_zero() {
        return Err(InvalidGridConfig::new("auto-refresh interval must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::entities::AutoRefreshConfig;

    use pretty_assertions::assert_eq;

    const BOOKINGS: &str = r#"(
        title: "Project Bookings",
        columns: ["id", "project", "employee", "period", "hours"],
        id_column: "id",
        period_column: Some("period"),
        auto_refresh: Some((enabled: true, interval_secs: 60)),
    )"#;

    #[test]
    fn loads_config_with_defaults() {
        let config = GridConfigDatasourceImpl::new().from_string(BOOKINGS).unwrap();
        assert_eq!(config.title, "Project Bookings");
        assert_eq!(config.period_column.as_deref(), Some("period"));
        assert_eq!(config.duplicate_ignore_columns, vec!["id".to_string()]);
        assert_eq!(
            config.auto_refresh,
            AutoRefreshConfig {
                enabled: true,
                interval: Duration::from_secs(60),
            }
        );
        assert_eq!(
            config.schema(),
            vec!["id", "project", "employee", "period", "hours", "from_date", "to_date"]
        );
    }

    #[test]
    fn auto_refresh_is_off_unless_configured() {
        let config = GridConfigDatasourceImpl::new()
            .from_string(r#"(title: "Services", columns: ["id", "name"], id_column: "id")"#)
            .unwrap();
        assert_eq!(config.auto_refresh.enabled, false);
        assert_eq!(config.period_column, None);
    }

    #[test]
    fn rejects_inconsistent_configs() {
        let datasource = GridConfigDatasourceImpl::new();
        for ron in [
            r#"(title: "x", columns: ["id"], id_column: "key")"#,
            r#"(title: "x", columns: ["id", "id"], id_column: "id")"#,
            r#"(title: "x", columns: ["id"], id_column: "id", period_column: Some("p"))"#,
            r#"(title: "x", columns: ["id"], id_column: "id", duplicate_ignore_columns: Some(["n"]))"#,
            r#"(title: "x", columns: ["id"], id_column: "id", auto_refresh: Some((enabled: true, interval_secs: 0)))"#,
            r#"(title: "x", columns: [], id_column: "id")"#,
            r#"(title: "x")"#,
        ] {
            assert!(datasource.from_string(ron).is_err(), "{ron}");
        }
    }

    #[test]
    fn reads_config_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.ron");
        std::fs::write(&path, BOOKINGS).unwrap();
        let config = GridConfigDatasourceImpl::new().from_file(&path).unwrap();
        assert_eq!(config.id_column, "id");
        assert!(GridConfigDatasourceImpl::new()
            .from_file(dir.path().join("missing.ron"))
            .is_err());
    }
}
