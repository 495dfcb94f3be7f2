//! 新しい分類パイプライン: Centroid-based Classification + Graph Label Propagation

pub mod centroid;
pub mod graph;
pub mod workflow;

pub use centroid::{Article, CentroidClassifier};
pub use graph::GraphPropagator;
pub use workflow::{ClassificationPipeline, GoldenItem};
