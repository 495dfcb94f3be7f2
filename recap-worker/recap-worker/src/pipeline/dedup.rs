use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::scheduler::JobContext;

use super::preprocess::{PreprocessedArticle, PreprocessedCorpus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeduplicatedCorpus {
    pub(crate) job_id: Uuid,
    pub(crate) articles: Vec<PreprocessedArticle>,
}

#[async_trait]
pub(crate) trait DedupStage: Send + Sync {
    async fn deduplicate(
        &self,
        job: &JobContext,
        corpus: PreprocessedCorpus,
    ) -> anyhow::Result<DeduplicatedCorpus>;
}

#[derive(Debug, Default, Clone)]
pub(crate) struct HashDedupStage;

impl HashDedupStage {
    pub(crate) fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DedupStage for HashDedupStage {
    async fn deduplicate(
        &self,
        job: &JobContext,
        corpus: PreprocessedCorpus,
    ) -> anyhow::Result<DeduplicatedCorpus> {
        let mut seen = HashSet::new();
        let mut articles = Vec::with_capacity(corpus.articles.len());

        for article in corpus.articles {
            let fingerprint = normalize_text(&article.body);
            if seen.insert(fingerprint) {
                articles.push(article);
            }
        }

        Ok(DeduplicatedCorpus {
            job_id: job.job_id,
            articles,
        })
    }
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(|fragment| fragment.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
