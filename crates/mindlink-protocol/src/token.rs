//! Bearer token payload decoding.
//!
//! Access and refresh tokens are JWTs: three dot-separated segments,
//! the middle one being base64url-encoded JSON. The client never verifies
//! signatures (that's the API's job); it only reads the payload to learn
//! who the user is and when the token stops being useful.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProtocolError, UserId};

/// Claims carried in a token payload.
///
/// Only `exp` is mandatory. Everything else is optional because the API's
/// token issuer does not always include it (e.g. `username` is absent from
/// tokens minted by the default issuer configuration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiry instant, seconds since the Unix epoch.
    pub exp: i64,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "isAdmin")]
    pub is_admin: bool,
    /// `"access"` or `"refresh"` when the issuer sets it.
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenClaims {
    /// Decodes the payload segment of `token`.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedToken`] when the token isn't exactly three
    /// segments, the segment isn't base64url, or the JSON lacks `exp`.
    pub fn decode(token: &str) -> Result<Self, ProtocolError> {
        let mut segments = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(ProtocolError::MalformedToken(
                "expected exactly three dot-separated segments".into(),
            ));
        };

        // Some issuers pad their segments; RFC 7515 says they shouldn't.
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| ProtocolError::MalformedToken(e.to_string()))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| ProtocolError::MalformedToken(e.to_string()))
    }

    /// The expiry as a UTC instant. Out-of-range values clamp to the
    /// earliest representable instant, which reads as long expired.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// `true` once `now` has reached the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// The signed-in user, as projected from the access token payload.
///
/// Read-only: it is recomputed from the token every time one is stored,
/// never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: Option<String>,
    pub id: Option<UserId>,
    pub exp: DateTime<Utc>,
    pub is_admin: bool,
}

impl From<&TokenClaims> for CurrentUser {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            username: claims.username.clone(),
            id: claims.user_id,
            exp: claims.expires_at(),
            is_admin: claims.is_admin,
        }
    }
}

impl CurrentUser {
    /// Decodes `token` and projects it, or `None` if it doesn't decode.
    pub fn from_token(token: &str) -> Option<Self> {
        TokenClaims::decode(token).ok().map(|c| Self::from(&c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn encode_token(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload.as_bytes())
        )
    }

    #[test]
    fn test_decode_reads_all_claims() {
        let token = encode_token(
            r#"{"exp":4102444800,"user_id":7,"username":"alice","is_admin":true,"token_type":"access"}"#,
        );

        let claims = TokenClaims::decode(&token).unwrap();

        assert_eq!(claims.exp, 4_102_444_800);
        assert_eq!(claims.user_id, Some(UserId(7)));
        assert_eq!(claims.username.as_deref(), Some("alice"));
        assert!(claims.is_admin);
        assert_eq!(claims.token_type.as_deref(), Some("access"));
    }

    #[test]
    fn test_decode_defaults_optional_claims() {
        let token = encode_token(r#"{"exp":1}"#);

        let claims = TokenClaims::decode(&token).unwrap();

        assert_eq!(claims.user_id, None);
        assert!(!claims.is_admin);
    }

    #[test]
    fn test_decode_accepts_camel_case_admin_flag() {
        let token = encode_token(r#"{"exp":1,"isAdmin":true}"#);
        assert!(TokenClaims::decode(&token).unwrap().is_admin);
    }

    #[test]
    fn test_decode_tolerates_padded_payload() {
        let payload = base64::engine::general_purpose::URL_SAFE
            .encode(br#"{"exp":12}"#);
        let token = format!("h.{payload}.s");
        assert_eq!(TokenClaims::decode(&token).unwrap().exp, 12);
    }

    #[test]
    fn test_decode_rejects_malformed_tokens() {
        let not_json = encode_token("not json");
        let no_exp = encode_token(r#"{"user_id":1}"#);
        for bad in [
            "",
            "not-a-jwt",
            "only.two",
            "h.!!!notbase64!!!.s",
            not_json.as_str(),
            no_exp.as_str(),
        ] {
            assert!(
                matches!(
                    TokenClaims::decode(bad),
                    Err(ProtocolError::MalformedToken(_))
                ),
                "should reject {bad:?}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_extra_segments() {
        let valid = encode_token(r#"{"exp":4102444800}"#);
        assert!(TokenClaims::decode(&valid).is_ok());

        for bad in [format!("{valid}.extra"), format!("{valid}.")] {
            assert!(
                matches!(
                    TokenClaims::decode(&bad),
                    Err(ProtocolError::MalformedToken(_))
                ),
                "should reject {bad:?}"
            );
        }
    }

    #[test]
    fn test_is_expired_at_boundary() {
        let claims = TokenClaims::decode(&encode_token(r#"{"exp":1000}"#)).unwrap();
        let at = DateTime::from_timestamp(1000, 0).unwrap();

        assert!(claims.is_expired_at(at));
        assert!(!claims.is_expired_at(at - Duration::seconds(1)));
    }

    #[test]
    fn test_current_user_projection() {
        let token = encode_token(r#"{"exp":2000,"user_id":3,"username":"bob"}"#);

        let user = CurrentUser::from_token(&token).unwrap();

        assert_eq!(user.username.as_deref(), Some("bob"));
        assert_eq!(user.id, Some(UserId(3)));
        assert_eq!(user.exp.timestamp(), 2000);
        assert!(!user.is_admin);
    }

    #[test]
    fn test_current_user_from_garbage_is_none() {
        assert!(CurrentUser::from_token("garbage").is_none());
    }
}
