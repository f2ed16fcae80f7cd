use tokio_util::sync::CancellationToken;

use crate::{LookupKey, LookupOutcome, Profile, Repository};

/// A trait for fetching profile data from the API.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileFetcher: Sync + Send {
    /// Fetches the public profile of a key.
    async fn fetch_profile(
        &self,
        key: &LookupKey,
        cancellation: &CancellationToken,
    ) -> LookupOutcome<Profile>;

    /// Fetches the public repositories of a key, most recently updated first.
    async fn fetch_repositories(
        &self,
        key: &LookupKey,
        cancellation: &CancellationToken,
    ) -> LookupOutcome<Vec<Repository>>;
}
