//! Normalised errors for API calls made through the pipeline.

use mindlink_protocol::ProtocolError;

/// What can go wrong calling the MindLink API.
///
/// Every failure the feature services surface is one of these; raw
/// transport errors and status codes never leak past [`ApiClient`].
///
/// [`ApiClient`]: crate::ApiClient
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never got a response. Not retried.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// 401 that survived the refresh-and-retry, or no session to refresh.
    #[error("not authenticated")]
    Unauthorized,

    /// Any other non-2xx response.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request body could not be serialised.
    #[error("could not encode request: {0}")]
    Encode(#[source] ProtocolError),

    /// The response body didn't match the expected type.
    #[error("could not decode response: {0}")]
    Decode(#[source] ProtocolError),
}

impl ApiError {
    /// The HTTP status behind this error, if there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// A short message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unreachable(_) => "Server unreachable.".into(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".into(),
            Self::Rejected { message, .. } => message.clone(),
            Self::Encode(_) | Self::Decode(_) => "Unexpected response from the server.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_response_errors() {
        assert_eq!(ApiError::Unauthorized.status(), Some(401));
        let rejected = ApiError::Rejected {
            status: 404,
            message: "Not found.".into(),
        };
        assert_eq!(rejected.status(), Some(404));
        assert_eq!(ApiError::Unreachable("refused".into()).status(), None);
    }

    #[test]
    fn test_user_message_prefers_server_message() {
        let rejected = ApiError::Rejected {
            status: 400,
            message: "Title is required".into(),
        };
        assert_eq!(rejected.user_message(), "Title is required");
        assert_eq!(
            ApiError::Unreachable("refused".into()).user_message(),
            "Server unreachable."
        );
    }
}
