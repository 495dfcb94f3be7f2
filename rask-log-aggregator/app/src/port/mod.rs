pub mod log_exporter;
pub mod otel_exporter;

pub use log_exporter::LogExporter;
pub use otel_exporter::OTelExporter;
