use std::{env, net::SocketAddr};

use thiserror::Error;

#[cfg(test)]
use once_cell::sync::Lazy;
#[cfg(test)]
pub(crate) static ENV_MUTEX: Lazy<std::sync::Mutex<()>> = Lazy::new(|| std::sync::Mutex::new(()));

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    model_weights_path: String,
    max_vocabulary: usize,
    top_terms: usize,
    canonical_order: Vec<String>,
    stopwords_path: Option<String>,
    max_upload_bytes: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// 環境変数から Sentiment Worker の設定値を読み込み、検証する。
    ///
    /// モデル重みファイルのパスは必須。語彙上限やカテゴリの正準順序は
    /// 省略時にデフォルト値へフォールバックする。
    ///
    /// # Errors
    /// `SENTIMENT_MODEL_WEIGHTS` が未設定、もしくは各種値のパースに失敗した場合は
    /// [`ConfigError`] を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        let model_weights_path = env_var("SENTIMENT_MODEL_WEIGHTS")?;
        let http_bind = parse_socket_addr("SENTIMENT_WORKER_HTTP_BIND", "0.0.0.0:9102")?;
        let max_vocabulary = parse_usize("SENTIMENT_MAX_VOCABULARY", 50)?;
        let top_terms = parse_usize("SENTIMENT_TOP_TERMS", 10)?;
        let canonical_order = parse_csv(
            "SENTIMENT_CANONICAL_ORDER",
            "Positive,Negative,Neutral,Irrelevant",
        );
        let stopwords_path = env::var("SENTIMENT_STOPWORDS_PATH").ok();
        let max_upload_bytes = parse_usize("SENTIMENT_MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;

        Ok(Self {
            http_bind,
            model_weights_path,
            max_vocabulary,
            top_terms,
            canonical_order,
            stopwords_path,
            max_upload_bytes,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn model_weights_path(&self) -> &str {
        &self.model_weights_path
    }

    /// 頻度集計の語彙上限。意味的なフィルタではなくリソース制御。
    #[must_use]
    pub fn max_vocabulary(&self) -> usize {
        self.max_vocabulary
    }

    #[must_use]
    pub fn top_terms(&self) -> usize {
        self.top_terms
    }

    /// カテゴリの正準順序。同率時のタイブレークと表示順を決める。
    #[must_use]
    pub fn canonical_order(&self) -> &[String] {
        &self.canonical_order
    }

    #[must_use]
    pub fn stopwords_path(&self) -> Option<&str> {
        self.stopwords_path.as_deref()
    }

    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

fn env_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());

    raw.parse().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_csv(name: &'static str, default: &str) -> Vec<String> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
