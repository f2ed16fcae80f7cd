use anyhow::{Context, anyhow};
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};
use reqwest::{
    Client, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::{
    LookupError, LookupKey, LookupOutcome, Profile, ProfileFetcher, Repository, Request,
    ResourceKind, StdResult,
};

/// The header carrying the epoch second at which the rate limit resets.
const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// The header carrying the number of requests left in the current window.
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Fetches profile data from the GitHub REST API.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    endpoint: Url,
}

impl HttpFetcher {
    /// Creates a new `HttpFetcher` for the given endpoint, authenticated when a token is given.
    pub fn try_new(endpoint: &str, api_token: Option<&str>) -> StdResult<Self> {
        let endpoint =
            Url::parse(endpoint).with_context(|| format!("Invalid API endpoint {endpoint}"))?;
        if endpoint.cannot_be_a_base() {
            return Err(anyhow!("API endpoint {endpoint} cannot be a base URL"));
        }
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("github-profile-lookup"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(api_token) = api_token {
            let mut bearer_token = HeaderValue::from_str(&format!("Bearer {api_token}"))
                .with_context(|| "Invalid API token value")?;
            bearer_token.set_sensitive(true);
            headers.insert(AUTHORIZATION, bearer_token);
        }
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .with_context(|| "Failed to build HTTP client")?;

        Ok(Self { client, endpoint })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        request: &Request,
        cancellation: &CancellationToken,
    ) -> LookupOutcome<T> {
        if cancellation.is_cancelled() {
            return Err(LookupError::Cancelled);
        }
        let Some(url) = request.url(&self.endpoint) else {
            let error = classify_status(request.kind(), StatusCode::NOT_FOUND, &HeaderMap::new());
            warn!("{request} cannot be addressed as a single path segment: {error}");
            return Err(error);
        };
        debug!("Sending {request} to {url}");
        let response = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(LookupError::Cancelled),
            response = self.client.get(url).send() => response.map_err(map_transport_error)?,
        };

        let status = response.status();
        log_rate_limit(request, response.headers());
        if !status.is_success() {
            let error = classify_status(request.kind(), status, response.headers());
            warn!("{request} failed with status {status}: {error}");
            return Err(error);
        }

        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(LookupError::Cancelled),
            body = response.json::<T>() => body.map_err(map_transport_error),
        }
    }
}

#[async_trait::async_trait]
impl ProfileFetcher for HttpFetcher {
    async fn fetch_profile(
        &self,
        key: &LookupKey,
        cancellation: &CancellationToken,
    ) -> LookupOutcome<Profile> {
        self.get(&Request::new(ResourceKind::Profile, key), cancellation)
            .await
    }

    async fn fetch_repositories(
        &self,
        key: &LookupKey,
        cancellation: &CancellationToken,
    ) -> LookupOutcome<Vec<Repository>> {
        self.get(&Request::new(ResourceKind::Repositories, key), cancellation)
            .await
    }
}

/// Maps a non-success status of a resource call to a lookup error.
pub(crate) fn classify_status(
    kind: ResourceKind,
    status: StatusCode,
    headers: &HeaderMap,
) -> LookupError {
    match status {
        StatusCode::NOT_FOUND if kind == ResourceKind::Profile => LookupError::NotFound,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => LookupError::RateLimited {
            reset_at: parse_rate_limit_reset(headers),
        },
        status => LookupError::UpstreamError {
            status: status.as_u16(),
        },
    }
}

fn parse_rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let reset_at = headers
        .get(RATE_LIMIT_RESET_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<i64>()
        .ok()?;

    Utc.timestamp_opt(reset_at, 0).single()
}

fn log_rate_limit(request: &Request, headers: &HeaderMap) {
    if let Some(remaining) = headers
        .get(RATE_LIMIT_REMAINING_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        debug!("{request}: rate limit remaining={remaining}");
    }
}

fn map_transport_error(error: reqwest::Error) -> LookupError {
    if error.is_timeout() {
        LookupError::Timeout
    } else if error.is_decode() {
        LookupError::InvalidResponse(error.to_string())
    } else {
        LookupError::NetworkError(error.to_string())
    }
}
