use std::fmt;
use std::str::FromStr;

use digest_auth::{AuthContext, HttpMethod};
use reqwest::Method;
use url::Url;

use crate::cli::AuthSchemeArg;
use crate::error::{Error, Result};

/// How credentials are presented to the Gerrit server.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthScheme {
    /// Credentials sent with every request
    #[default]
    Basic,
    /// Credentials sent in answer to the server's 401 challenge
    Digest,
}

impl FromStr for AuthScheme {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(AuthScheme::Basic),
            "digest" => Ok(AuthScheme::Digest),
            other => Err(Error::Config(format!(
                "Unknown auth scheme '{}' (expected basic or digest)",
                other
            ))),
        }
    }
}

impl From<AuthSchemeArg> for AuthScheme {
    fn from(arg: AuthSchemeArg) -> Self {
        match arg {
            AuthSchemeArg::Basic => AuthScheme::Basic,
            AuthSchemeArg::Digest => AuthScheme::Digest,
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Basic => write!(f, "basic"),
            AuthScheme::Digest => write!(f, "digest"),
        }
    }
}

/// Build the `Authorization` header value answering a Digest challenge.
///
/// `challenge` is the raw `WWW-Authenticate` header of the 401 response; the
/// digest URI is the request path plus query, as the server saw it.
pub fn digest_authorization(
    challenge: &str,
    username: &str,
    password: &str,
    method: &Method,
    url: &Url,
    body: Option<&[u8]>,
) -> Result<String> {
    let mut prompt = digest_auth::parse(challenge)
        .map_err(|e| Error::Auth(format!("Invalid digest challenge: {}", e)))?;

    let uri = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    let context = AuthContext::new_with_method(
        username,
        password,
        uri,
        body,
        HttpMethod::from(method.as_str()),
    );

    let answer = prompt
        .respond(&context)
        .map_err(|e| Error::Auth(format!("Could not answer digest challenge: {}", e)))?;

    Ok(answer.to_header_string())
}
