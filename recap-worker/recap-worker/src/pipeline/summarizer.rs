/// Summarizer - クラスタリング結果からLLM入力を最適化し、結果を保存するモジュール。
///
/// このモジュールは以下を担当：
/// 1. クラスタリング結果から重要な文を選択
/// 2. LLM入力の最適化（トークン数制限、冗長性削減）
/// 3. 生成された要約をDBに保存
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    clients::{
        news_creator::{NewsCreatorClient, SummaryRequest, SummaryResponse},
        subworker::ClusteringResponse,
    },
    store::{dao::RecapDao, models::RecapFinalSection},
};

/// Summarizer - クラスタリング結果から要約を生成し、保存する。
#[derive(Debug, Clone)]
pub(crate) struct Summarizer {
    dao: Arc<RecapDao>,
    max_sentences_per_cluster: usize,
    max_clusters_per_genre: usize,
}

impl Summarizer {
    /// 新しいSummarizerを作成する。
    ///
    /// # Arguments
    /// * `dao` - データベースアクセスオブジェクト
    /// * `max_sentences_per_cluster` - クラスターごとの最大文数
    /// * `max_clusters_per_genre` - ジャンルごとの最大クラスター数
    pub(crate) fn new(
        dao: Arc<RecapDao>,
        max_sentences_per_cluster: usize,
        max_clusters_per_genre: usize,
    ) -> Self {
        Self {
            dao,
            max_sentences_per_cluster,
            max_clusters_per_genre,
        }
    }

    /// デフォルトパラメータで作成する。
    pub(crate) fn with_defaults(dao: Arc<RecapDao>) -> Self {
        Self::new(dao, 5, 20)
    }

    /// クラスタリング結果から要約リクエストを構築する。
    ///
    /// # Arguments
    /// * `job_id` - ジョブID
    /// * `clustering` - クラスタリング結果
    ///
    /// # Returns
    /// 最適化された要約リクエスト
    pub(crate) fn build_summary_request(
        &self,
        job_id: Uuid,
        clustering: &ClusteringResponse,
    ) -> SummaryRequest {
        // クラスターを重要度順にソート（コヒーレンススコアや文数で）
        let mut clusters = clustering.clusters.clone();
        clusters.sort_by(|a, b| {
            // コヒーレンススコアがある場合はそれで、なければ文数で
            match (a.coherence_score, b.coherence_score) {
                (Some(score_a), Some(score_b)) => score_b
                    .partial_cmp(&score_a)
                    .unwrap_or(std::cmp::Ordering::Equal),
                _ => b.sentences.len().cmp(&a.sentences.len()),
            }
        });

        // 上位N個のクラスターのみ使用
        let selected_clusters: Vec<_> = clusters
            .into_iter()
            .take(self.max_clusters_per_genre)
            .collect();

        debug!(
            job_id = %job_id,
            genre = %clustering.genre,
            selected_cluster_count = selected_clusters.len(),
            "selected top clusters for summarization"
        );

        NewsCreatorClient::build_summary_request(
            job_id,
            &ClusteringResponse {
                job_id: clustering.job_id,
                genre: clustering.genre.clone(),
                clusters: selected_clusters,
                metadata: clustering.metadata.clone(),
            },
            self.max_sentences_per_cluster,
        )
    }

    /// 要約レスポンスをDBに保存する。
    ///
    /// # Arguments
    /// * `job_id` - ジョブID
    /// * `summary` - 要約レスポンス
    ///
    /// # Returns
    /// 保存された行ID
    pub(crate) async fn save_summary(
        &self,
        job_id: Uuid,
        summary: &SummaryResponse,
    ) -> Result<i64> {
        info!(
            job_id = %job_id,
            genre = %summary.genre,
            bullet_count = summary.summary.bullets.len(),
            "saving summary to database"
        );

        let section = RecapFinalSection::new(
            job_id,
            summary.genre.clone(),
            summary.summary.title.clone(),
            summary.summary.bullets.clone(),
            summary.metadata.model.clone(),
        );

        let row_id = self
            .dao
            .save_final_section(&section)
            .await
            .context("failed to save final section")?;

        debug!(
            job_id = %job_id,
            genre = %summary.genre,
            row_id = row_id,
            "summary saved successfully"
        );

        Ok(row_id)
    }
}

/// 最終セクションのモデル（DAOに追加）。
#[derive(Debug, Clone)]
pub(crate) struct RecapFinalSection {
    pub(crate) job_id: Uuid,
    pub(crate) genre: String,
    pub(crate) title_ja: String,
    pub(crate) bullets_ja: Vec<String>,
    pub(crate) model_name: String,
}

impl RecapFinalSection {
    pub(crate) fn new(
        job_id: Uuid,
        genre: String,
        title_ja: String,
        bullets_ja: Vec<String>,
        model_name: String,
    ) -> Self {
        Self {
            job_id,
            genre,
            title_ja,
            bullets_ja,
            model_name,
        }
    }
}
