// Nanosecond timestamps (u64) intentionally cast to i64 for ClickHouse.
// This won't overflow until year 2262.
#![allow(clippy::cast_possible_wrap)]

use crate::adapter::clickhouse::convert::{hashmap_to_vec, string_to_fixed_bytes};
use crate::domain::{OTelLog, OTelTrace};
use serde::{Deserialize, Serialize};

/// ClickHouse row structure for otel_logs table
/// Uses FixedString-compatible byte arrays for TraceId/SpanId
#[derive(clickhouse::Row, Serialize, Deserialize, Clone, Debug)]
pub struct OTelLogRow {
    #[serde(rename = "Timestamp")]
    pub timestamp: i64, // DateTime64(9) - nanoseconds since epoch
    #[serde(rename = "ObservedTimestamp")]
    pub observed_timestamp: i64,
    #[serde(rename = "TraceId")]
    pub trace_id: [u8; 32], // FixedString(32)
    #[serde(rename = "SpanId")]
    pub span_id: [u8; 16], // FixedString(16)
    #[serde(rename = "TraceFlags")]
    pub trace_flags: u8,
    #[serde(rename = "SeverityText")]
    pub severity_text: String,
    #[serde(rename = "SeverityNumber")]
    pub severity_number: u8,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "ResourceSchemaUrl")]
    pub resource_schema_url: String,
    #[serde(rename = "ResourceAttributes")]
    pub resource_attributes: Vec<(String, String)>,
    #[serde(rename = "ScopeSchemaUrl")]
    pub scope_schema_url: String,
    #[serde(rename = "ScopeName")]
    pub scope_name: String,
    #[serde(rename = "ScopeVersion")]
    pub scope_version: String,
    #[serde(rename = "ScopeAttributes")]
    pub scope_attributes: Vec<(String, String)>,
    #[serde(rename = "LogAttributes")]
    pub log_attributes: Vec<(String, String)>,
}

impl From<OTelLog> for OTelLogRow {
    fn from(log: OTelLog) -> Self {
        Self {
            timestamp: log.timestamp as i64,
            observed_timestamp: log.observed_timestamp as i64,
            trace_id: string_to_fixed_bytes::<32>(&log.trace_id),
            span_id: string_to_fixed_bytes::<16>(&log.span_id),
            trace_flags: log.trace_flags,
            severity_text: log.severity_text,
            severity_number: log.severity_number,
            body: log.body,
            resource_schema_url: log.resource_schema_url,
            resource_attributes: hashmap_to_vec(log.resource_attributes),
            scope_schema_url: log.scope_schema_url,
            scope_name: log.scope_name,
            scope_version: log.scope_version,
            scope_attributes: hashmap_to_vec(log.scope_attributes),
            log_attributes: hashmap_to_vec(log.log_attributes),
        }
    }
}

/// ClickHouse row structure for otel_traces table
#[derive(clickhouse::Row, Serialize, Deserialize, Clone, Debug)]
pub struct OTelTraceRow {
    #[serde(rename = "Timestamp")]
    pub timestamp: i64, // DateTime64(9) - nanoseconds since epoch
    #[serde(rename = "TraceId")]
    pub trace_id: [u8; 32], // FixedString(32)
    #[serde(rename = "SpanId")]
    pub span_id: [u8; 16], // FixedString(16)
    #[serde(rename = "ParentSpanId")]
    pub parent_span_id: [u8; 16], // FixedString(16)
    #[serde(rename = "TraceState")]
    pub trace_state: String,
    #[serde(rename = "SpanName")]
    pub span_name: String,
    #[serde(rename = "SpanKind")]
    pub span_kind: i8, // Enum8 as numeric value
    #[serde(rename = "ServiceName")]
    pub service_name: String,
    #[serde(rename = "ResourceAttributes")]
    pub resource_attributes: Vec<(String, String)>,
    #[serde(rename = "SpanAttributes")]
    pub span_attributes: Vec<(String, String)>,
    #[serde(rename = "Duration")]
    pub duration: i64,
    #[serde(rename = "StatusCode")]
    pub status_code: i8, // Enum8 as numeric value
    #[serde(rename = "StatusMessage")]
    pub status_message: String,
    // Nested arrays for Grafana ClickHouse datasource compatibility
    #[serde(rename = "Events.Timestamp")]
    pub events_timestamp: Vec<i64>, // Array(DateTime64(9))
    #[serde(rename = "Events.Name")]
    pub events_name: Vec<String>, // Array(LowCardinality(String))
    #[serde(rename = "Events.Attributes")]
    pub events_attributes: Vec<Vec<(String, String)>>, // Array(Map(String, String))
    #[serde(rename = "Links.TraceId")]
    pub links_trace_id: Vec<String>, // Array(String)
    #[serde(rename = "Links.SpanId")]
    pub links_span_id: Vec<String>, // Array(String)
    #[serde(rename = "Links.TraceState")]
    pub links_trace_state: Vec<String>, // Array(String)
    #[serde(rename = "Links.Attributes")]
    pub links_attributes: Vec<Vec<(String, String)>>, // Array(Map(String, String))
}

impl From<OTelTrace> for OTelTraceRow {
    fn from(trace: OTelTrace) -> Self {
        // Extract nested event arrays
        let events_timestamp: Vec<i64> = trace
            .events_nested
            .iter()
            .map(|e| e.timestamp as i64)
            .collect();
        let events_name: Vec<String> = trace.events_nested.iter().map(|e| e.name.clone()).collect();
        let events_attributes: Vec<Vec<(String, String)>> = trace
            .events_nested
            .iter()
            .map(|e| hashmap_to_vec(e.attributes.clone()))
            .collect();

        // Extract nested link arrays
        let links_trace_id: Vec<String> = trace
            .links_nested
            .iter()
            .map(|l| l.trace_id.clone())
            .collect();
        let links_span_id: Vec<String> = trace
            .links_nested
            .iter()
            .map(|l| l.span_id.clone())
            .collect();
        let links_trace_state: Vec<String> = trace
            .links_nested
            .iter()
            .map(|l| l.trace_state.clone())
            .collect();
        let links_attributes: Vec<Vec<(String, String)>> = trace
            .links_nested
            .iter()
            .map(|l| hashmap_to_vec(l.attributes.clone()))
            .collect();

        Self {
            timestamp: trace.timestamp as i64,
            trace_id: string_to_fixed_bytes::<32>(&trace.trace_id),
            span_id: string_to_fixed_bytes::<16>(&trace.span_id),
            parent_span_id: string_to_fixed_bytes::<16>(&trace.parent_span_id),
            trace_state: trace.trace_state,
            span_name: trace.span_name,
            span_kind: trace.span_kind as i8,
            service_name: trace.service_name,
            resource_attributes: hashmap_to_vec(trace.resource_attributes),
            span_attributes: hashmap_to_vec(trace.span_attributes),
            duration: trace.duration,
            status_code: trace.status_code as i8,
            status_message: trace.status_message,
            // Nested arrays for Grafana
            events_timestamp,
            events_name,
            events_attributes,
            links_trace_id,
            links_span_id,
            links_trace_state,
            links_attributes,
        }
    }
}
