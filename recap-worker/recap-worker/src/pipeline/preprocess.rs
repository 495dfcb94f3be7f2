use async_trait::async_trait;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;
use whatlang::detect;

use crate::scheduler::JobContext;

use super::fetch::{FetchedArticle, FetchedCorpus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreprocessedArticle {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreprocessedCorpus {
    pub(crate) job_id: Uuid,
    pub(crate) articles: Vec<PreprocessedArticle>,
}

#[async_trait]
pub(crate) trait PreprocessStage: Send + Sync {
    async fn preprocess(
        &self,
        job: &JobContext,
        corpus: FetchedCorpus,
    ) -> anyhow::Result<PreprocessedCorpus>;
}

#[derive(Debug, Clone)]
pub(crate) struct TextPreprocessStage;

impl TextPreprocessStage {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl Default for TextPreprocessStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreprocessStage for TextPreprocessStage {
    async fn preprocess(
        &self,
        job: &JobContext,
        corpus: FetchedCorpus,
    ) -> anyhow::Result<PreprocessedCorpus> {
        let mut articles = Vec::with_capacity(corpus.articles.len());

        for article in corpus.articles {
            if let Some(processed) = preprocess_article(article) {
                articles.push(processed);
            }
        }

        Ok(PreprocessedCorpus {
            job_id: job.job_id,
            articles,
        })
    }
}

fn preprocess_article(article: FetchedArticle) -> Option<PreprocessedArticle> {
    let normalized = article.body.nfc().collect::<String>();
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }

    let language = article
        .language
        .or_else(|| detect(trimmed).map(|info| info.lang().code().to_string()))
        .unwrap_or_else(|| "und".to_string());

    Some(PreprocessedArticle {
        id: article.id,
        title: article.title,
        body: trimmed.to_string(),
        language,
    })
}
