/// Prometheusメトリクス定義。
use prometheus::{
    Counter, Histogram, Registry, register_counter_with_registry,
    register_histogram_with_registry,
};

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    // カウンター
    pub uploads_total: Counter,
    pub upload_failures_total: Counter,
    pub empty_uploads_total: Counter,
    pub records_classified_total: Counter,

    // ヒストグラム
    pub analysis_duration: Histogram,
}

impl Metrics {
    /// 新しいメトリクスコレクターを作成する。
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            uploads_total: register_counter_with_registry!(
                "sentiment_uploads_total",
                "Total number of analyze requests received",
                registry
            )?,
            upload_failures_total: register_counter_with_registry!(
                "sentiment_upload_failures_total",
                "Number of analyze requests rejected before classification",
                registry
            )?,
            empty_uploads_total: register_counter_with_registry!(
                "sentiment_empty_uploads_total",
                "Number of uploads that produced zero usable records",
                registry
            )?,
            records_classified_total: register_counter_with_registry!(
                "sentiment_records_classified_total",
                "Total number of records run through the classifier",
                registry
            )?,
            analysis_duration: register_histogram_with_registry!(
                "sentiment_analysis_duration_seconds",
                "Duration of one end-to-end analysis run",
                registry
            )?,
        })
    }
}
