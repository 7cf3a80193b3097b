use mindlink_protocol::{
    AnalyzeRequest, GraphMap, Idea, IdeaId, IdeaPatch, InsightData, NewIdea, RelatedWeights,
};
use serde_json::Value;

use super::empty_body;
use crate::{ApiClient, ApiError};

/// Ideas, their analysis and the graph map built from them.
#[derive(Clone)]
pub struct IdeasService {
    client: ApiClient,
}

impl IdeasService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Idea>, ApiError> {
        self.client.get("/ideas/").await
    }

    pub async fn get(&self, id: IdeaId) -> Result<Idea, ApiError> {
        self.client.get(&format!("/ideas/{}/", id.0)).await
    }

    pub async fn create(&self, idea: &NewIdea) -> Result<Idea, ApiError> {
        self.client.post("/ideas/", idea).await
    }

    pub async fn update(&self, id: IdeaId, patch: &IdeaPatch) -> Result<Idea, ApiError> {
        self.client.patch(&format!("/ideas/{}/", id.0), patch).await
    }

    pub async fn delete(&self, id: IdeaId) -> Result<(), ApiError> {
        self.client.delete(&format!("/ideas/{}/", id.0)).await
    }

    /// Ideas owned by the signed-in user.
    pub async fn mine(&self) -> Result<Vec<Idea>, ApiError> {
        self.client.get("/ideas/mine/").await
    }

    /// Ideas related to `id`, ranked server-side with the given weights.
    /// The ranking payload is passed through untyped.
    pub async fn related(&self, id: IdeaId, weights: RelatedWeights) -> Result<Value, ApiError> {
        self.client
            .get_with_query(&format!("/ideas/{}/related/", id.0), weights.to_query())
            .await
    }

    pub async fn insights(&self) -> Result<InsightData, ApiError> {
        self.client.get("/ideas/insights/").await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Idea>, ApiError> {
        self.client
            .get_with_query("/ideas/search/", vec![("q".into(), query.into())])
            .await
    }

    /// Runs the semantic analysis on a stored idea or on free text.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<Value, ApiError> {
        self.client.post("/analyze/", request).await
    }

    /// Re-runs the analysis over all of the user's ideas.
    pub async fn refresh_analysis(&self) -> Result<Value, ApiError> {
        self.client.post("/refresh/", &empty_body()).await
    }

    /// The global idea graph.
    pub async fn map(&self) -> Result<GraphMap, ApiError> {
        self.client.get("/map/").await
    }

    /// The signed-in user's own idea graph.
    pub async fn my_map(&self) -> Result<GraphMap, ApiError> {
        self.client.get("/ideas/map/self/").await
    }
}
