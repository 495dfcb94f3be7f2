/// 部分成功ハンドリングと不足ジャンル検出。
use std::collections::HashSet;

use uuid::Uuid;

use crate::pipeline::dispatch::{DispatchResult, GenreResult};

/// 部分成功の分析結果。
#[derive(Debug, Clone)]
pub(crate) struct PartialSuccessAnalysis {
    pub(crate) job_id: Uuid,
    pub(crate) successful_genres: Vec<String>,
    pub(crate) failed_genres: Vec<String>,
    pub(crate) missing_genres: Vec<String>,
    pub(crate) can_retry: bool,
}

impl PartialSuccessAnalysis {
    /// DispatchResultから部分成功を分析する。
    pub(crate) fn from_dispatch_result(
        job_id: Uuid,
        result: &DispatchResult,
        expected_genres: &[String],
    ) -> Self {
        let successful: Vec<String> = result
            .genre_results
            .iter()
            .filter(|(_, gr)| gr.error.is_none() && gr.summary_response_id.is_some())
            .map(|(genre, _)| genre.clone())
            .collect();

        let failed: Vec<String> = result
            .genre_results
            .iter()
            .filter(|(_, gr)| gr.error.is_some())
            .map(|(genre, _)| genre.clone())
            .collect();

        let successful_set: HashSet<String> = successful.iter().cloned().collect();
        let expected_set: HashSet<String> = expected_genres.iter().cloned().collect();

        let missing: Vec<String> = expected_set.difference(&successful_set).cloned().collect();

        // リトライ可能かどうか（致命的エラーがない場合）
        let can_retry = failed.iter().all(|genre| {
            result
                .genre_results
                .get(genre)
                .and_then(|gr| gr.error.as_ref())
                .map(|e| {
                    // 簡易的な判定：エラーメッセージに"fatal"が含まれていなければリトライ可能
                    !e.to_lowercase().contains("fatal")
                })
                .unwrap_or(true)
        });

        Self {
            job_id,
            successful_genres: successful,
            failed_genres: failed,
            missing_genres: missing,
            can_retry,
        }
    }

    /// すべて成功したかどうか。
    pub(crate) fn is_complete(&self) -> bool {
        self.failed_genres.is_empty() && self.missing_genres.is_empty()
    }
}
