use std::sync::Arc;

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::{LookupError, LookupKey, LookupOutcome, Profile, ProfileFetcher, Repository};

/// The status returned by the API when the credentials are rejected.
const UNAUTHORIZED_STATUS: u16 = 401;

/// A struct that fetches with credentials first and silently falls back to anonymous access when they are rejected.
pub struct FetcherAuthFallback {
    /// The fetcher attaching the API token.
    authenticated: Arc<dyn ProfileFetcher>,

    /// The fetcher without credentials.
    anonymous: Arc<dyn ProfileFetcher>,
}

impl FetcherAuthFallback {
    /// Creates a new `FetcherAuthFallback` instance with the given fetchers.
    pub fn new(authenticated: Arc<dyn ProfileFetcher>, anonymous: Arc<dyn ProfileFetcher>) -> Self {
        Self {
            authenticated,
            anonymous,
        }
    }
}

fn is_rejected_credentials<T>(outcome: &LookupOutcome<T>) -> bool {
    matches!(
        outcome,
        Err(LookupError::UpstreamError {
            status: UNAUTHORIZED_STATUS
        })
    )
}

#[async_trait::async_trait]
impl ProfileFetcher for FetcherAuthFallback {
    async fn fetch_profile(
        &self,
        key: &LookupKey,
        cancellation: &CancellationToken,
    ) -> LookupOutcome<Profile> {
        let outcome = self.authenticated.fetch_profile(key, cancellation).await;
        if is_rejected_credentials(&outcome) {
            debug!("API token rejected for profile of {key}, falling back to anonymous access");
            return self.anonymous.fetch_profile(key, cancellation).await;
        }

        outcome
    }

    async fn fetch_repositories(
        &self,
        key: &LookupKey,
        cancellation: &CancellationToken,
    ) -> LookupOutcome<Vec<Repository>> {
        let outcome = self.authenticated.fetch_repositories(key, cancellation).await;
        if is_rejected_credentials(&outcome) {
            debug!(
                "API token rejected for repositories of {key}, falling back to anonymous access"
            );
            return self.anonymous.fetch_repositories(key, cancellation).await;
        }

        outcome
    }
}
