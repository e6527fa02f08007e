use crate::env_flag;

/// Settings for how callers are identified.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// Accept `X-User-ID` / `X-User-Role` headers in place of a bearer token.
    ///
    /// Only enable this behind a gateway that strips these headers from
    /// client traffic and sets them itself.
    pub trust_user_headers: bool,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            trust_user_headers: env_flag("AUTH_TRUST_USER_HEADERS", false),
        }
    }
}
