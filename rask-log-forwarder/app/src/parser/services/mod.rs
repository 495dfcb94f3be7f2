//! Service-specific log parsers.
//!
//! This module provides parsers for different service types:
//! - Nginx (access and error logs)
//! - Go structured logs (JSON format)
//! - PostgreSQL logs
//! - Meilisearch logs

mod go;
mod meilisearch;
mod nginx;
mod postgres;

use super::docker::ParseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export all parsers
pub use go::GoStructuredParser;
pub use meilisearch::MeilisearchParser;
pub use nginx::NginxParser;
pub use postgres::PostgresParser;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedLogEntry {
    pub service_type: String,
    pub log_type: String,
    pub message: String,
    pub level: Option<LogLevel>,
    pub timestamp: Option<DateTime<Utc>>,
    pub stream: String,

    // HTTP fields
    pub method: Option<String>,
    pub path: Option<String>,
    pub status_code: Option<u16>,
    pub response_size: Option<u64>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,

    // Structured fields
    pub fields: std::collections::HashMap<String, String>,
}

/// Trait for service-specific log parsers.
///
/// Implementations handle parsing log messages from specific service types
/// (e.g., nginx, Go applications, PostgreSQL).
pub trait ServiceParser: Send + Sync {
    /// Returns the service type identifier (e.g., "nginx", "go", "postgres").
    fn service_type(&self) -> &str;

    /// Parse a log message and extract structured data.
    fn parse_log(&self, log: &str) -> Result<ParsedLogEntry, ParseError>;

    /// Priority for auto-detection (higher = tried first).
    /// Default is 50. Range: 0-100.
    ///
    /// - 90-100: High priority (specific formats like nginx access logs)
    /// - 50-89: Medium priority (general formats like JSON)
    /// - 0-49: Low priority (fallback parsers)
    fn detection_priority(&self) -> u8 {
        50
    }

    /// Check if this parser can handle the given log format.
    /// Used for auto-detection when service name is unknown.
    fn can_parse(&self, log: &str) -> bool;
}
