//! API credential handling.
//!
//! Credentials are collected once at startup (from flags or environment, the
//! CLI decides) into an explicit [`Credentials`] value that is passed into
//! the client — there is no ambient global configuration. Two schemes are
//! supported, matching the CDN API:
//!
//! - an API token, sent as a `Bearer` authorization header
//! - a legacy API key + account email pair, sent as `X-Auth-Key` /
//!   `X-Auth-Email` headers
//!
//! A token takes precedence when both are supplied. Account-scoped
//! operations (everything under Workers KV) additionally require an account
//! ID.

use crate::{Error, Result};

/// API credentials and account scope for a single invocation.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// API token for `Bearer` authentication. Preferred.
    pub api_token: Option<String>,
    /// Legacy API key; only used together with `email`.
    pub api_key: Option<String>,
    /// Account email accompanying `api_key`.
    pub email: Option<String>,
    /// Account ID for account-scoped (KV) operations.
    pub account_id: Option<String>,
}

/// The authentication scheme resolved from a set of credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme<'a> {
    /// `Authorization: Bearer <token>`
    Token(&'a str),
    /// `X-Auth-Key` / `X-Auth-Email` header pair.
    KeyEmail {
        /// The API key.
        key: &'a str,
        /// The account email.
        email: &'a str,
    },
}

impl Credentials {
    /// Resolve which authentication scheme these credentials support.
    ///
    /// Empty strings count as unset so that blank environment variables do
    /// not masquerade as credentials.
    pub fn auth_scheme(&self) -> Result<AuthScheme<'_>> {
        if let Some(token) = non_empty(self.api_token.as_deref()) {
            return Ok(AuthScheme::Token(token));
        }
        if let (Some(key), Some(email)) = (
            non_empty(self.api_key.as_deref()),
            non_empty(self.email.as_deref()),
        ) {
            return Ok(AuthScheme::KeyEmail { key, email });
        }
        Err(Error::Auth(
            "either an API token or both an API key and email are required".to_string(),
        ))
    }

    /// Validate that some authentication scheme is available.
    pub fn validate(&self) -> Result<()> {
        self.auth_scheme().map(|_| ())
    }

    /// The account ID, required for account-scoped (KV) operations.
    pub fn account_id(&self) -> Result<&str> {
        non_empty(self.account_id.as_deref()).ok_or_else(|| {
            Error::Config("an account ID is required for this operation".to_string())
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
