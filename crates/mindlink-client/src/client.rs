//! Typed API access over the pipeline.

use std::sync::Arc;

use mindlink_protocol::{Codec, ErrorBody, JsonCodec};
use mindlink_session::{AuthEndpoints, Authenticator};
use mindlink_transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{ApiError, Pipeline};

/// Cheap-to-clone handle for calling the API. All feature services share
/// one of these, and through it one pipeline and one session.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<Pipeline>,
    codec: JsonCodec,
}

impl ApiClient {
    pub fn new(transport: impl HttpTransport, auth: Arc<dyn Authenticator>) -> Self {
        Self::from_pipeline(Pipeline::new(transport, auth))
    }

    pub fn with_endpoints(
        transport: impl HttpTransport,
        auth: Arc<dyn Authenticator>,
        endpoints: AuthEndpoints,
    ) -> Self {
        Self::from_pipeline(Pipeline::with_endpoints(transport, auth, endpoints))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            codec: JsonCodec,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Sends a raw request through the pipeline and normalises failures.
    ///
    /// # Errors
    /// - [`ApiError::Unreachable`] if no response was received.
    /// - [`ApiError::Unauthorized`] for a 401 the pipeline couldn't recover.
    /// - [`ApiError::Rejected`] for any other non-2xx status.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let response = self
            .pipeline
            .execute(request)
            .await
            .map_err(|e| ApiError::Unreachable(e.to_string()))?;

        if response.is_success() {
            Ok(response)
        } else if response.is_unauthorized() {
            Err(ApiError::Unauthorized)
        } else {
            Err(ApiError::Rejected {
                status: response.status,
                message: self.rejection_message(&response),
            })
        }
    }

    /// `error`, then `message`, then `detail` from the JSON body, else a
    /// generic message.
    fn rejection_message(&self, response: &ApiResponse) -> String {
        self.codec
            .decode::<ErrorBody>(&response.body)
            .ok()
            .and_then(|body| body.message().map(str::to_string))
            .unwrap_or_else(|| format!("request failed with status {}", response.status))
    }

    fn decode<R: DeserializeOwned>(&self, response: &ApiResponse) -> Result<R, ApiError> {
        self.codec.decode(&response.body).map_err(ApiError::Decode)
    }

    fn with_body<B: Serialize>(&self, request: ApiRequest, body: &B) -> Result<ApiRequest, ApiError> {
        let bytes = self.codec.encode(body).map_err(ApiError::Encode)?;
        Ok(request.with_json(bytes))
    }

    // -----------------------------------------------------------------------
    // Typed verbs
    // -----------------------------------------------------------------------

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.get_with_query(path, Vec::new()).await
    }

    pub async fn get_with_query<R: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<R, ApiError> {
        let mut request = ApiRequest::get(path);
        request.query = query;
        let response = self.send(request).await?;
        self.decode(&response)
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        self.with_json_body(Method::Post, path, body).await
    }

    pub async fn put<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        self.with_json_body(Method::Put, path, body).await
    }

    pub async fn patch<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        self.with_json_body(Method::Patch, path, body).await
    }

    /// Deletes a resource. Any 2xx counts as success; the body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::new(Method::Delete, path)).await?;
        Ok(())
    }

    async fn with_json_body<B: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = self.with_body(ApiRequest::new(method, path), body)?;
        let response = self.send(request).await?;
        self.decode(&response)
    }
}
