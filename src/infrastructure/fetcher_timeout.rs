use std::{future::Future, sync::Arc, time::Duration};

use log::{debug, warn};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::{
    LookupError, LookupKey, LookupOutcome, Profile, ProfileFetcher, Repository, ResourceKind,
};

/// A struct that bounds each call of a ProfileFetcher by a timeout and aborts it on cancellation.
pub struct FetcherTimeout {
    /// The fetcher to be bounded.
    fetcher: Arc<dyn ProfileFetcher>,

    /// The maximum duration of a call.
    timeout: Duration,
}

impl FetcherTimeout {
    /// Creates a new `FetcherTimeout` instance with the given timeout.
    pub fn new(fetcher: Arc<dyn ProfileFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    async fn bounded<T>(
        &self,
        kind: ResourceKind,
        key: &LookupKey,
        cancellation: &CancellationToken,
        call: impl Future<Output = LookupOutcome<T>>,
    ) -> LookupOutcome<T> {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                debug!("Aborted {kind} call for {key}: lookup cancelled");
                Err(LookupError::Cancelled)
            }
            outcome = timeout(self.timeout, call) => match outcome {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Aborted {kind} call for {key}: timed out after {:?}", self.timeout);
                    Err(LookupError::Timeout)
                }
            },
        }
    }
}

#[async_trait::async_trait]
impl ProfileFetcher for FetcherTimeout {
    async fn fetch_profile(
        &self,
        key: &LookupKey,
        cancellation: &CancellationToken,
    ) -> LookupOutcome<Profile> {
        self.bounded(
            ResourceKind::Profile,
            key,
            cancellation,
            self.fetcher.fetch_profile(key, cancellation),
        )
        .await
    }

    async fn fetch_repositories(
        &self,
        key: &LookupKey,
        cancellation: &CancellationToken,
    ) -> LookupOutcome<Vec<Repository>> {
        self.bounded(
            ResourceKind::Repositories,
            key,
            cancellation,
            self.fetcher.fetch_repositories(key, cancellation),
        )
        .await
    }
}
