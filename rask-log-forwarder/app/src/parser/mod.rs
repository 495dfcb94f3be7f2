pub mod docker;
pub mod schema;
pub mod services;
pub mod simd;
pub mod universal;

// Legacy exports (keep for compatibility)
pub use schema::{LogEntry, NginxLogEntry};
pub use simd::SimdParser;

// New TASK2 exports
pub use docker::{DockerJsonParser, DockerLogEntry, ParseError};
pub use services::{
    GoStructuredParser, LogLevel, NginxParser, ParsedLogEntry, PostgresParser, ServiceParser,
};
pub use universal::{EnrichedLogEntry, UniversalParser};
