//! Role-based topic selection for Evening Pulse.
//!
//! This module implements the selection algorithm that chooses up to 3 topics
//! from evaluated clusters, assigning each a distinct role:
//!
//! 1. **NeedToKnow** - High-impact news (prioritizes impact score)
//! 2. **Trend** - Trending topics (prioritizes burst score)
//! 3. **Serendipity** - Unexpected discoveries (prioritizes novelty score)
//!
//! ## Selection Algorithm
//!
//! Topics are selected in order: NeedToKnow → Trend → Serendipity.
//! Each role uses different weight configurations to score candidates.
//! Once a cluster is selected, it cannot be selected again for other roles.
//!
//! ## Graceful Degradation
//!
//! When there aren't enough high-quality clusters, the selection process
//! degrades gracefully through multiple levels, relaxing constraints
//! to provide at least some output.

use std::collections::HashSet;

use async_trait::async_trait;

use super::config::PulseSelectionConfig;
use super::types::{
    ClusterWithMetrics, PulseTopic, QualityTier, RoleWeights, ScoreBreakdown, SelectionTrace,
    TopicRole,
};

/// Trait for topic selection.
#[async_trait]
pub trait TopicSelector: Send + Sync {
    /// Select topics from the given clusters.
    ///
    /// # Arguments
    ///
    /// * `clusters` - Evaluated clusters with quality metrics and scores.
    /// * `max_topics` - Maximum number of topics to select (typically 3).
    ///
    /// # Returns
    ///
    /// Selected topics with roles and rationales.
    async fn select(
        &self,
        clusters: &[ClusterWithMetrics],
        max_topics: usize,
    ) -> SelectionResult;
}

/// Result of topic selection.
#[derive(Debug, Clone)]
pub struct SelectionResult {
    /// Selected topics.
    pub topics: Vec<PulseTopic>,
    /// Selection trace for debugging.
    pub trace: SelectionTrace,
    /// Fallback level used (0 = normal, higher = more degradation).
    pub fallback_level: u8,
}

impl SelectionResult {
    /// Check if the selection was successful (at least one topic).
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.topics.is_empty()
    }

    /// Check if all requested topics were filled.
    #[must_use]
    pub fn is_complete(&self, max_topics: usize) -> bool {
        self.topics.len() >= max_topics
    }
}

/// Default implementation of topic selection.
pub struct DefaultTopicSelector {
    config: PulseSelectionConfig,
}

impl DefaultTopicSelector {
    /// Create a new selector with the given configuration.
    #[must_use]
    pub fn new(config: PulseSelectionConfig) -> Self {
        Self { config }
    }
}

impl Default for DefaultTopicSelector {
    fn default() -> Self {
        Self::new(PulseSelectionConfig::default())
    }
}

#[async_trait]
impl TopicSelector for DefaultTopicSelector {
    async fn select(
        &self,
        clusters: &[ClusterWithMetrics],
        max_topics: usize,
    ) -> SelectionResult {
        select_topics_with_fallback(clusters, max_topics, &self.config)
    }
}

/// Select topics with graceful degradation.
fn select_topics_with_fallback(
    clusters: &[ClusterWithMetrics],
    max_topics: usize,
    config: &PulseSelectionConfig,
) -> SelectionResult {
    // Level 0: Normal selection (OK tier only)
    let result = select_topics(clusters, max_topics, config, QualityTier::Ok);
    if result.topics.len() >= max_topics {
        return result;
    }

    // Level 1: Include Caution tier
    let result = select_topics(clusters, max_topics, config, QualityTier::Caution);
    if result.topics.len() >= max_topics {
        return SelectionResult {
            fallback_level: 1,
            ..result
        };
    }

    // Level 2: Include all tiers (even NG with lower priority)
    let result = select_topics(clusters, max_topics, config, QualityTier::Ng);
    if result.topics.len() >= 2 {
        return SelectionResult {
            fallback_level: 2,
            ..result
        };
    }

    // Level 3-5: Reduce topic count targets
    // Level 3: 2 topics
    if result.topics.len() >= 2 {
        return SelectionResult {
            fallback_level: 3,
            ..result
        };
    }

    // Level 4: 1 topic (Quiet Day Mode)
    if !result.topics.is_empty() {
        return SelectionResult {
            fallback_level: 4,
            ..result
        };
    }

    // Level 5-6: No topics available
    SelectionResult {
        topics: Vec::new(),
        trace: SelectionTrace::default(),
        fallback_level: if clusters.is_empty() { 6 } else { 5 },
    }
}

/// Select topics from clusters with a minimum quality tier requirement.
fn select_topics(
    clusters: &[ClusterWithMetrics],
    max_topics: usize,
    config: &PulseSelectionConfig,
    min_tier: QualityTier,
) -> SelectionResult {
    let mut selected = Vec::with_capacity(max_topics.min(3));
    let mut used_cluster_ids: HashSet<i64> = HashSet::new();
    let mut trace = SelectionTrace::default();

    // Filter clusters by minimum quality tier
    let eligible_clusters: Vec<&ClusterWithMetrics> = clusters
        .iter()
        .filter(|c| tier_meets_minimum(c.quality_metrics.tier, min_tier))
        .collect();

    // Count NG clusters for trace
    trace.excluded_ng_clusters = clusters
        .iter()
        .filter(|c| c.quality_metrics.tier == QualityTier::Ng)
        .count();

    // Role priority order
    let roles = [TopicRole::NeedToKnow, TopicRole::Trend, TopicRole::Serendipity];

    for role in roles {
        if selected.len() >= max_topics {
            break;
        }

        let weights = get_weights_for_role(role, config);

        // Find best cluster for this role
        let candidate = eligible_clusters
            .iter()
            .filter(|c| !used_cluster_ids.contains(&c.cluster_id))
            .filter(|c| {
                let score = score_cluster_for_role(c, weights);
                score >= config.min_score_threshold
            })
            .max_by(|a, b| {
                let score_a = score_cluster_for_role(a, weights);
                let score_b = score_cluster_for_role(b, weights);
                score_a
                    .partial_cmp(&score_b)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        // Update trace
        let candidates_for_role = eligible_clusters
            .iter()
            .filter(|c| !used_cluster_ids.contains(&c.cluster_id))
            .count();

        match role {
            TopicRole::NeedToKnow => trace.need_to_know_candidates = candidates_for_role,
            TopicRole::Trend => trace.trend_candidates = candidates_for_role,
            TopicRole::Serendipity => trace.serendipity_candidates = candidates_for_role,
        }

        if let Some(cluster) = candidate {
            let score = score_cluster_for_role(cluster, weights);
            let breakdown = ScoreBreakdown {
                impact_score: cluster.impact_score * weights.impact,
                burst_score: cluster.burst_score * weights.burst,
                novelty_score: cluster.novelty_score * weights.novelty,
                recency_score: cluster.recency_score * weights.recency,
            };

            selected.push(PulseTopic {
                cluster_id: cluster.cluster_id,
                role,
                score,
                rationale: String::new(), // Filled in rationale generation
                articles: cluster.article_ids.clone(),
                quality_metrics: cluster.quality_metrics.clone(),
                score_breakdown: breakdown,
            });

            used_cluster_ids.insert(cluster.cluster_id);
        }
    }

    trace.excluded_duplicates = used_cluster_ids.len().saturating_sub(selected.len());

    SelectionResult {
        topics: selected,
        trace,
        fallback_level: 0,
    }
}

/// Calculate score for a cluster given a role's weights.
#[must_use]
pub fn score_cluster_for_role(cluster: &ClusterWithMetrics, weights: &RoleWeights) -> f32 {
    cluster.impact_score * weights.impact
        + cluster.burst_score * weights.burst
        + cluster.novelty_score * weights.novelty
        + cluster.recency_score * weights.recency
}

/// Get the weights configuration for a role.
fn get_weights_for_role(role: TopicRole, config: &PulseSelectionConfig) -> &RoleWeights {
    match role {
        TopicRole::NeedToKnow => &config.need_to_know_weights,
        TopicRole::Trend => &config.trend_weights,
        TopicRole::Serendipity => &config.serendipity_weights,
    }
}

/// Check if a tier meets the minimum requirement.
fn tier_meets_minimum(tier: QualityTier, min: QualityTier) -> bool {
    match min {
        QualityTier::Ok => matches!(tier, QualityTier::Ok),
        QualityTier::Caution => matches!(tier, QualityTier::Ok | QualityTier::Caution),
        QualityTier::Ng => true, // All tiers meet NG minimum
    }
}
