pub mod batch_writer;
pub mod convert;
pub mod exporter;
pub mod otel_row;
pub mod row;

pub use batch_writer::BatchWriter;
pub use exporter::ClickHouseExporter;
pub use otel_row::{OTelLogRow, OTelTraceRow};
pub use row::LogRow;
