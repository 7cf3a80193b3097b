use mindlink_protocol::{AdminUser, TrainingStatus, UserId, UserToggle};

use super::empty_body;
use crate::{ApiClient, ApiError};

/// User administration. The API answers 403 for non-admins.
#[derive(Clone)]
pub struct AdminService {
    client: ApiClient,
}

impl AdminService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn users(&self) -> Result<Vec<AdminUser>, ApiError> {
        self.client.get("/admin/users/").await
    }

    /// Bans or unbans a user by flipping their active flag.
    pub async fn toggle_user(&self, id: UserId) -> Result<UserToggle, ApiError> {
        self.client
            .patch(&format!("/admin/users/{}/toggle/", id.0), &empty_body())
            .await
    }
}

/// Model training jobs (admin only).
#[derive(Clone)]
pub struct TrainingService {
    client: ApiClient,
}

impl TrainingService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn start(&self) -> Result<TrainingStatus, ApiError> {
        self.client.post("/training/start/", &empty_body()).await
    }
}
