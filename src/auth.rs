use std::fmt;

use serde::{Deserialize, Serialize};

/// Personal access token used to authenticate against Azure DevOps.
///
/// The value is never printed: `Debug` and `Display` are redacted so the
/// token can travel inside configuration structs that get logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// How the token is attached to outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Basic base64(":" + pat)`, the PAT convention of the service.
    #[default]
    Basic,
    /// `Bearer <token>` for OAuth / Entra access tokens.
    Bearer,
}

impl AuthScheme {
    pub fn apply(self, request: reqwest::RequestBuilder, token: &Token) -> reqwest::RequestBuilder {
        match self {
            Self::Basic => request.basic_auth("", Some(token.as_str())),
            Self::Bearer => request.bearer_auth(token.as_str()),
        }
    }
}
