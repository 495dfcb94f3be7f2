use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub(crate) struct NewsCreatorClient {
    client: Client,
    base_url: Url,
}

impl NewsCreatorClient {
    pub(crate) fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .http2_prior_knowledge()
            .timeout(Duration::from_secs(5))
            .build()
            .context("failed to build news-creator client")?;

        let base_url = Url::parse(&base_url.into()).context("invalid news-creator base URL")?;

        Ok(Self { client, base_url })
    }

    pub(crate) async fn health_check(&self) -> Result<()> {
        let url = self
            .base_url
            .join("health")
            .context("failed to build news-creator health URL")?;

        self.client
            .get(url)
            .send()
            .await
            .context("news-creator health request failed")?
            .error_for_status()
            .context("news-creator health endpoint returned error status")?;

        Ok(())
    }

    pub(crate) async fn summarize(&self, payload: impl Serialize) -> Result<NewsCreatorSummary> {
        let url = self
            .base_url
            .join("v1/recap/summarize")
            .context("failed to build news-creator summarize URL")?;

        let response = self
            .client
            .post(url)
            .json(&payload)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .context("news-creator summarize request failed")?
            .error_for_status()
            .context("news-creator summarize endpoint returned error status")?;

        response
            .json::<NewsCreatorSummary>()
            .await
            .context("failed to deserialize news-creator response")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewsCreatorSummary {
    pub(crate) response_id: String,
}
