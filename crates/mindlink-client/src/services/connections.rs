use mindlink_protocol::{Connection, ConnectionId, ConnectionPatch, NewConnection};
use serde_json::Value;

use super::empty_body;
use crate::{ApiClient, ApiError};

/// Links between ideas.
#[derive(Clone)]
pub struct ConnectionsService {
    client: ApiClient,
}

impl ConnectionsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Connection>, ApiError> {
        self.client.get("/connections/").await
    }

    pub async fn create(&self, connection: &NewConnection) -> Result<Connection, ApiError> {
        self.client.post("/connections/", connection).await
    }

    pub async fn update(
        &self,
        id: ConnectionId,
        patch: &ConnectionPatch,
    ) -> Result<Connection, ApiError> {
        self.client
            .patch(&format!("/connections/{}/", id.0), patch)
            .await
    }

    pub async fn delete(&self, id: ConnectionId) -> Result<(), ApiError> {
        self.client.delete(&format!("/connections/{}/", id.0)).await
    }

    /// Asks the server to recompute every connection's semantic weight.
    pub async fn recalculate_weights(&self) -> Result<Value, ApiError> {
        self.client
            .post("/connections/auto_weight/", &empty_body())
            .await
    }
}
