//! Bearer token authentication
//!
//! The Wise API authenticates every request with a personal API token sent as
//! a bearer Authorization header. Token refresh is not part of this scheme.

use reqwest::RequestBuilder;

/// Applies the bearer Authorization header to outgoing requests
#[derive(Clone)]
pub struct TokenAuthenticator {
    token: String,
}

impl TokenAuthenticator {
    /// Create a new authenticator with the given API token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.token)
    }
}

impl std::fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself
        f.debug_struct("TokenAuthenticator").finish_non_exhaustive()
    }
}
