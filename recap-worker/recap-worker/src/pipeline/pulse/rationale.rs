//! Rationale generation for Evening Pulse topics.
//!
//! This module generates human-readable explanations for why each topic
//! was selected, based on the role and scoring data.
//!
//! ## Templates
//!
//! Each role has a specific template that emphasizes the relevant metrics:
//!
//! - **NeedToKnow**: "{impact_level}影響度を持つ重要ニュース。{article_count}件のソースが報道。"
//! - **Trend**: "{burst_level}のトピック。直近の報道量が増加傾向。"
//! - **Serendipity**: "{novelty_level}視点からのトピック。他では見られない切り口。"

use super::types::{ClusterWithMetrics, PulseTopic, TopicRole};

/// Trait for rationale generation.
pub trait RationaleGenerator: Send + Sync {
    /// Generate a rationale for the given topic.
    fn generate(&self, topic: &PulseTopic, cluster: &ClusterWithMetrics) -> String;
}

/// Default implementation of rationale generation.
#[derive(Default)]
pub struct DefaultRationaleGenerator;


impl RationaleGenerator for DefaultRationaleGenerator {
    fn generate(&self, topic: &PulseTopic, cluster: &ClusterWithMetrics) -> String {
        generate_rationale(topic, cluster)
    }
}

/// Generate a rationale for a topic based on its role and metrics.
#[must_use]
pub fn generate_rationale(topic: &PulseTopic, cluster: &ClusterWithMetrics) -> String {
    match topic.role {
        TopicRole::NeedToKnow => format_need_to_know_rationale(topic, cluster),
        TopicRole::Trend => format_trend_rationale(topic, cluster),
        TopicRole::Serendipity => format_serendipity_rationale(topic, cluster),
    }
}

/// Format rationale for NeedToKnow role.
fn format_need_to_know_rationale(topic: &PulseTopic, cluster: &ClusterWithMetrics) -> String {
    let impact_level = classify_impact_level(cluster.impact_score);
    let article_count = topic.articles.len();

    let source_text = if article_count == 1 {
        "1件のソースが報道".to_string()
    } else {
        format!("{article_count}件のソースが報道")
    };

    format!("{impact_level}影響度を持つ重要ニュース。{source_text}。")
}

/// Format rationale for Trend role.
fn format_trend_rationale(_topic: &PulseTopic, cluster: &ClusterWithMetrics) -> String {
    let burst_level = classify_burst_level(cluster.burst_score);
    format!("{burst_level}のトピック。直近の報道量が増加傾向。")
}

/// Format rationale for Serendipity role.
fn format_serendipity_rationale(_topic: &PulseTopic, cluster: &ClusterWithMetrics) -> String {
    let novelty_level = classify_novelty_level(cluster.novelty_score);
    format!("{novelty_level}視点からのトピック。他では見られない切り口。")
}

/// Classify impact score into a human-readable level.
fn classify_impact_level(score: f32) -> &'static str {
    if score > 0.8 {
        "非常に高い"
    } else if score > 0.6 {
        "高い"
    } else if score > 0.4 {
        "中程度の"
    } else {
        "一定の"
    }
}

/// Classify burst score into a human-readable level.
fn classify_burst_level(score: f32) -> &'static str {
    if score > 0.8 {
        "急上昇中"
    } else if score > 0.6 {
        "注目度上昇中"
    } else if score > 0.4 {
        "話題になりつつある"
    } else {
        "静かに注目されている"
    }
}

/// Classify novelty score into a human-readable level.
fn classify_novelty_level(score: f32) -> &'static str {
    if score > 0.8 {
        "斬新な"
    } else if score > 0.6 {
        "新規性の高い"
    } else if score > 0.4 {
        "ユニークな"
    } else {
        "異なる"
    }
}

/// Generate English rationale (for potential future use).
#[must_use]
pub fn generate_rationale_en(topic: &PulseTopic, cluster: &ClusterWithMetrics) -> String {
    match topic.role {
        TopicRole::NeedToKnow => format_need_to_know_rationale_en(topic, cluster),
        TopicRole::Trend => format_trend_rationale_en(cluster),
        TopicRole::Serendipity => format_serendipity_rationale_en(cluster),
    }
}

fn format_need_to_know_rationale_en(topic: &PulseTopic, cluster: &ClusterWithMetrics) -> String {
    let impact_level = classify_impact_level_en(cluster.impact_score);
    let article_count = topic.articles.len();
    format!(
        "{} impact news. Reported by {} source{}.",
        impact_level,
        article_count,
        if article_count == 1 { "" } else { "s" }
    )
}

fn format_trend_rationale_en(cluster: &ClusterWithMetrics) -> String {
    let burst_level = classify_burst_level_en(cluster.burst_score);
    format!("{} topic. Increasing coverage in recent hours.", burst_level)
}

fn format_serendipity_rationale_en(cluster: &ClusterWithMetrics) -> String {
    let novelty_level = classify_novelty_level_en(cluster.novelty_score);
    format!(
        "{} perspective on this topic. A unique angle not seen elsewhere.",
        novelty_level
    )
}

fn classify_impact_level_en(score: f32) -> &'static str {
    if score > 0.8 {
        "Very high"
    } else if score > 0.6 {
        "High"
    } else if score > 0.4 {
        "Moderate"
    } else {
        "Notable"
    }
}

fn classify_burst_level_en(score: f32) -> &'static str {
    if score > 0.8 {
        "Rapidly trending"
    } else if score > 0.6 {
        "Rising"
    } else if score > 0.4 {
        "Emerging"
    } else {
        "Quietly notable"
    }
}

fn classify_novelty_level_en(score: f32) -> &'static str {
    if score > 0.8 {
        "Highly novel"
    } else if score > 0.6 {
        "Fresh"
    } else if score > 0.4 {
        "Unique"
    } else {
        "Different"
    }
}
