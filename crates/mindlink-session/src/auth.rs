//! The seam between the session and everything that consumes it.
//!
//! The request pipeline needs a bearer token and a way to recover from a
//! 401. The route guards need to know whether a valid token is held, who
//! the user is, and again a way to refresh. Neither should care how the
//! session is stored or how refresh talks to the API, so both depend on
//! the [`Authenticator`] trait instead of on [`SessionManager`].
//!
//! The trait is object safe (`refresh` returns a boxed future) so the
//! pipeline and the guards can hold an `Arc<dyn Authenticator>` and tests
//! can swap in a scripted double.
//!
//! [`SessionManager`]: crate::SessionManager

use futures_util::future::BoxFuture;
use mindlink_protocol::CurrentUser;

/// Read access to the current session plus silent refresh.
///
/// # Example
///
/// ```rust
/// use futures_util::future::BoxFuture;
/// use mindlink_protocol::CurrentUser;
/// use mindlink_session::Authenticator;
///
/// /// A fixed token that never expires and can't be refreshed.
/// struct StaticToken(String);
///
/// impl Authenticator for StaticToken {
///     fn access_token(&self) -> Option<String> {
///         Some(self.0.clone())
///     }
///     fn is_token_expired(&self) -> bool {
///         false
///     }
///     fn current_user(&self) -> Option<CurrentUser> {
///         None
///     }
///     fn refresh(&self) -> BoxFuture<'_, bool> {
///         Box::pin(async { false })
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// The stored access token, if any. Whether it is still valid is a
    /// separate question; see [`is_token_expired`](Self::is_token_expired).
    fn access_token(&self) -> Option<String>;

    /// `true` when there is no token, it can't be decoded, or its expiry
    /// has passed.
    fn is_token_expired(&self) -> bool;

    /// The user projected from the current access token.
    fn current_user(&self) -> Option<CurrentUser>;

    /// Attempts a silent refresh. Resolves `true` once a new access token
    /// is stored, `false` otherwise. Never fails; on `false` the session
    /// has been ended.
    fn refresh(&self) -> BoxFuture<'_, bool>;
}

impl<A: Authenticator + ?Sized> Authenticator for std::sync::Arc<A> {
    fn access_token(&self) -> Option<String> {
        (**self).access_token()
    }

    fn is_token_expired(&self) -> bool {
        (**self).is_token_expired()
    }

    fn current_user(&self) -> Option<CurrentUser> {
        (**self).current_user()
    }

    fn refresh(&self) -> BoxFuture<'_, bool> {
        (**self).refresh()
    }
}
