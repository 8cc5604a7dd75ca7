// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking HTTP plumbing shared by the remote API clients
//!
//! Requests run on the blocking pool so the async callers never stall the
//! runtime. Non-2xx statuses come back as [`HttpError::Status`] with the
//! response body attached.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::time::Duration;
use thiserror::Error;

const CONTINUATION_TOKEN_HEADER: &str = "x-ms-continuationtoken";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(100);

#[derive(Debug, Clone, Error)]
pub enum HttpError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("HTTP {status} from {url}: {body}")]
    Status { status: u16, url: String, body: String },
    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl HttpError {
    /// Timeouts, throttling, server errors and broken connections
    pub fn is_transient(&self) -> bool {
        match self {
            HttpError::Transport { .. } => true,
            HttpError::Status { status, .. } => is_transient_status(*status),
            HttpError::InvalidUrl { .. } => false,
        }
    }
}

pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 408 | 429) || (500..600).contains(&status)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// Azure DevOps paging cursor, when more results exist
    pub continuation_token: Option<String>,
}

/// Authenticated JSON client over a ureq agent
#[derive(Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    authorization: Option<String>,
}

impl HttpClient {
    fn new(authorization: Option<String>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();
        Self {
            agent: config.into(),
            authorization,
        }
    }

    /// Client for the GitHub API, authenticated with a bearer token
    pub fn bearer(token: &str) -> Self {
        Self::new(Some(format!("Bearer {}", token)))
    }

    /// Client without credentials, for pre-signed download URLs
    pub fn anonymous() -> Self {
        Self::new(None)
    }

    /// Client for Azure DevOps, authenticated with a personal access token
    pub fn basic_pat(pat: &str) -> Self {
        Self::new(Some(format!(
            "Basic {}",
            BASE64.encode(format!(":{}", pat))
        )))
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.send(Method::Get, url, None).await
    }

    pub async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, HttpError> {
        self.send(Method::Post, url, Some(body.to_string())).await
    }

    pub async fn put_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, HttpError> {
        self.send(Method::Put, url, Some(body.to_string())).await
    }

    /// Send a request and fail on any non-2xx status
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> Result<HttpResponse, HttpError> {
        let agent = self.agent.clone();
        let authorization = self.authorization.clone();
        let target = url.to_string();

        let response = tokio::task::spawn_blocking(move || {
            blocking_send(&agent, authorization.as_deref(), method, &target, body)
        })
        .await
        .map_err(|e| HttpError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })??;

        if !(200..300).contains(&response.status) {
            return Err(HttpError::Status {
                status: response.status,
                url: url.to_string(),
                body: response.body,
            });
        }
        Ok(response)
    }

    /// GET every page of an Azure DevOps list endpoint, concatenating `value` arrays
    pub async fn get_all_pages(&self, url: &str) -> Result<Vec<serde_json::Value>, HttpError> {
        let mut items = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page_url = match &token {
                Some(t) => with_query(url, "continuationToken", t)?,
                None => url.to_string(),
            };
            let response = self.get(&page_url).await?;
            let page: serde_json::Value =
                serde_json::from_str(&response.body).map_err(|e| HttpError::Transport {
                    url: page_url.clone(),
                    message: format!("invalid JSON: {}", e),
                })?;
            if let Some(values) = page.get("value").and_then(|v| v.as_array()) {
                items.extend(values.iter().cloned());
            }
            match response.continuation_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => return Ok(items),
            }
        }
    }
}

fn blocking_send(
    agent: &ureq::Agent,
    authorization: Option<&str>,
    method: Method,
    url: &str,
    body: Option<String>,
) -> Result<HttpResponse, HttpError> {
    let transport = |e: ureq::Error| HttpError::Transport {
        url: url.to_string(),
        message: e.to_string(),
    };

    let mut response = match method {
        Method::Get => {
            let mut request = agent.get(url).header("Accept", "application/json");
            if let Some(auth) = authorization {
                request = request.header("Authorization", auth);
            }
            request.call().map_err(transport)?
        }
        Method::Post | Method::Put => {
            let mut request = if method == Method::Post {
                agent.post(url)
            } else {
                agent.put(url)
            };
            request = request.header("Content-Type", "application/json");
            if let Some(auth) = authorization {
                request = request.header("Authorization", auth);
            }
            request.send(body.unwrap_or_default()).map_err(transport)?
        }
    };

    let status = response.status().as_u16();
    let continuation_token = response
        .headers()
        .get(CONTINUATION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(transport)?;

    Ok(HttpResponse {
        status,
        body,
        continuation_token,
    })
}

/// Append one query parameter, encoding it
pub fn with_query(url: &str, key: &str, value: &str) -> Result<String, HttpError> {
    let mut parsed = url::Url::parse(url).map_err(|e| HttpError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    parsed.query_pairs_mut().append_pair(key, value);
    Ok(parsed.to_string())
}

/// Join a base URL with path segments, percent-encoding each segment
pub fn join_segments(base: &str, segments: &[&str]) -> Result<String, HttpError> {
    let invalid = |message: String| HttpError::InvalidUrl {
        url: base.to_string(),
        message,
    };
    let mut parsed = url::Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    parsed
        .path_segments_mut()
        .map_err(|_| invalid("cannot be a base URL".to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(parsed.to_string())
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
