use std::fmt;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::auth::{AuthScheme, digest_authorization};
use crate::config::ServerProfile;
use crate::error::{Error, Result};
use crate::labels::LabelVotes;

/// Gerrit prepends this to every JSON body to defeat cross-site script inclusion.
pub const XSSI_PREFIX: &str = ")]}'";

/// The part of a Gerrit ChangeInfo shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeSummary {
    pub status: String,
    #[serde(rename = "_number")]
    pub number: u64,
    pub subject: String,
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] {}", self.status, self.number, self.subject)
    }
}

/// Raw outcome of a mutating call; each workflow step decides what is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

impl RestResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200, "")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Strip the anti-XSSI prefix and the line break after it, if present.
pub fn strip_xssi_prefix(body: &str) -> &str {
    match body.strip_prefix(XSSI_PREFIX) {
        Some(rest) => rest.trim_start_matches(['\r', '\n']),
        None => body,
    }
}

/// Trait for Gerrit REST operations to enable dependency injection and mocking
#[async_trait]
pub trait GerritApi: Send + Sync {
    /// Changes carrying `topic`; only open ones when `open_only` is set.
    async fn query_topic(&self, topic: &str, open_only: bool) -> Result<Vec<ChangeSummary>>;

    async fn get_change(&self, change: &str) -> Result<ChangeSummary>;

    async fn rebase(&self, change: &str) -> Result<RestResponse>;

    async fn review(&self, change: &str, votes: &LabelVotes) -> Result<RestResponse>;

    async fn submit(&self, change: &str) -> Result<RestResponse>;

    /// Add `reviewer`; `confirmed` acknowledges adding a large group.
    async fn add_reviewer(&self, change: &str, reviewer: &str, confirmed: bool) -> Result<RestResponse>;
}

/// reqwest-backed client for the authenticated `/a/changes/` API
pub struct GerritClient {
    http: Client,
    base_url: Url,
    username: String,
    password: String,
    auth_scheme: AuthScheme,
}

impl GerritClient {
    pub fn new(profile: &ServerProfile) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("gerrit-batch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: profile.base_url.clone(),
            username: profile.username.clone(),
            password: profile.password.clone(),
            auth_scheme: profile.auth_scheme,
        })
    }

    /// `{base}/a/changes/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("Invalid review URL '{}'", self.base_url)))?;
            path.pop_if_empty().extend(["a", "changes"]).extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: &Url, body: Option<&Value>, digest: Option<&str>) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, url.clone());

        if let Some(body) = body {
            builder = builder.json(body);
        }

        match (self.auth_scheme, digest) {
            (AuthScheme::Basic, _) => builder.basic_auth(&self.username, Some(&self.password)),
            (AuthScheme::Digest, Some(header)) => builder.header(AUTHORIZATION, header),
            (AuthScheme::Digest, None) => builder,
        }
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<RestResponse> {
        debug!("{} {}", method, url);
        let mut response = self
            .request(method.clone(), &url, body.as_ref(), None)
            .send()
            .await?;

        if self.auth_scheme == AuthScheme::Digest && response.status() == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            if let Some(challenge) = challenge {
                debug!("Answering digest challenge for {}", url);
                let payload = body.as_ref().map(serde_json::to_vec).transpose()?;
                let header = digest_authorization(
                    &challenge,
                    &self.username,
                    &self.password,
                    &method,
                    &url,
                    payload.as_deref(),
                )?;
                response = self
                    .request(method, &url, body.as_ref(), Some(&header))
                    .send()
                    .await?;
            }
        }

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("-> HTTP {}", status);

        Ok(RestResponse { status, body })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, action: &'static str, subject: &str) -> Result<T> {
        let response = self.send(Method::GET, url, None).await?;
        if !response.is_success() {
            return Err(Error::unexpected_status(action, subject, response.status, &response.body));
        }
        Ok(serde_json::from_str(strip_xssi_prefix(&response.body))?)
    }
}

#[async_trait]
impl GerritApi for GerritClient {
    async fn query_topic(&self, topic: &str, open_only: bool) -> Result<Vec<ChangeSummary>> {
        let mut query = format!("topic:{}", topic);
        if open_only {
            query.push_str(" status:open");
        }

        let mut url = self.endpoint(&[""])?;
        url.query_pairs_mut().append_pair("q", &query);

        self.get_json(url, "fetch changes for topic", topic).await
    }

    async fn get_change(&self, change: &str) -> Result<ChangeSummary> {
        let url = self.endpoint(&[change])?;
        self.get_json(url, "fetch change", change).await
    }

    async fn rebase(&self, change: &str) -> Result<RestResponse> {
        let url = self.endpoint(&[change, "rebase"])?;
        self.send(Method::POST, url, Some(json!({ "base": "" }))).await
    }

    async fn review(&self, change: &str, votes: &LabelVotes) -> Result<RestResponse> {
        let url = self.endpoint(&[change, "revisions", "current", "review"])?;
        self.send(Method::POST, url, Some(serde_json::to_value(votes)?)).await
    }

    async fn submit(&self, change: &str) -> Result<RestResponse> {
        let url = self.endpoint(&[change, "revisions", "current", "submit"])?;
        self.send(Method::POST, url, None).await
    }

    async fn add_reviewer(&self, change: &str, reviewer: &str, confirmed: bool) -> Result<RestResponse> {
        let url = self.endpoint(&[change, "reviewers"])?;
        let body = if confirmed {
            json!({ "reviewer": reviewer, "confirmed": true })
        } else {
            json!({ "reviewer": reviewer })
        };
        self.send(Method::POST, url, Some(body)).await
    }
}
