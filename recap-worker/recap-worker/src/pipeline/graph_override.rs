use serde::Deserialize;
use sqlx::PgPool;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Graph-related tuning overrides loaded from database (latest) or YAML fallback.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub(crate) struct GraphOverrideSettings {
    pub graph_margin: Option<f32>,
    pub weighted_tie_break_margin: Option<f32>,
    pub tag_confidence_gate: Option<f32>,
    pub boost_threshold: Option<f32>,
    pub tag_count_threshold: Option<usize>,
}

impl GraphOverrideSettings {
    /// Load from database first, fallback to YAML if not found.
    pub(crate) async fn load_with_fallback(
        pool: &PgPool,
    ) -> Result<Self, GraphOverrideError> {
        // Try database first
        if let Ok(Some(config_json)) = crate::store::dao::RecapDao::new(pool.clone())
            .get_latest_worker_config("graph_override")
            .await
        {
            if let Ok(settings) = serde_json::from_value::<GraphOverrideSettings>(config_json) {
                tracing::info!("loaded graph override settings from database");
                return Ok(settings);
            }
        }

        // Fallback to YAML
        tracing::debug!("no database config found, falling back to YAML");
        Self::load_from_env()
    }

    pub(crate) fn load_from_env() -> Result<Self, GraphOverrideError> {
        let path = match env::var("GRAPH_CONFIG") {
            Ok(raw) if !raw.trim().is_empty() => PathBuf::from(raw),
            _ => return Ok(Self::default()),
        };
        Self::load_from_path(&path)
    }

    fn load_from_path(path: &Path) -> Result<Self, GraphOverrideError> {
        let contents = fs::read_to_string(path).map_err(|source| GraphOverrideError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| GraphOverrideError::Deserialize {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum GraphOverrideError {
    #[error("failed to read graph config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse graph config at {path}: {source}")]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
