use mindlink_protocol::{SimilarIdea, SimilarityQuery, SimilarityResults};

use crate::{ApiClient, ApiError};

/// Semantic similarity search.
#[derive(Clone)]
pub struct SimilarityService {
    client: ApiClient,
}

impl SimilarityService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Ideas similar to `text`, with the default `top_k` (5) and
    /// `min_threshold` (0.5).
    pub async fn find(&self, text: &str) -> Result<Vec<SimilarIdea>, ApiError> {
        self.query(&SimilarityQuery::new(text)).await
    }

    pub async fn query(&self, query: &SimilarityQuery) -> Result<Vec<SimilarIdea>, ApiError> {
        let results: SimilarityResults = self.client.post("/similar/", query).await?;
        Ok(results.results)
    }
}
