use std::{sync::Arc, time::Duration};

use log::{debug, info};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    FetcherAuthFallback, FetcherTimeout, HttpFetcher, LookupConfiguration, LookupContext,
    LookupError, LookupKey, LookupOutcome, LookupResult, LookupSession, Profile, ProfileFetcher,
    ProfileLookup, Repository, StdResult,
};

/// An orchestrator resolving a lookup key to a profile and its repositories.
///
/// Both resources are fetched concurrently, served from the context cache when possible.
/// Starting a lookup cancels the previous one, whose late results are discarded.
pub struct LookupOrchestrator {
    /// The fetcher of the resources
    fetcher: Arc<dyn ProfileFetcher>,

    /// The cache and session state
    context: Arc<LookupContext>,

    /// The delay before hitting the network
    debounce: Duration,
}

impl LookupOrchestrator {
    /// Creates a new `LookupOrchestrator` instance with the given fetcher and context.
    pub fn new(
        fetcher: Arc<dyn ProfileFetcher>,
        context: Arc<LookupContext>,
        debounce: Duration,
    ) -> Self {
        Self {
            fetcher,
            context,
            debounce,
        }
    }

    /// Creates a new `LookupOrchestrator` with an HTTP fetcher stack built from the configuration.
    pub fn try_from_configuration(configuration: &LookupConfiguration) -> StdResult<Self> {
        let anonymous: Arc<dyn ProfileFetcher> =
            Arc::new(HttpFetcher::try_new(&configuration.endpoint, None)?);
        let fetcher: Arc<dyn ProfileFetcher> = match configuration.api_token.as_deref() {
            Some(api_token) => match HttpFetcher::try_new(&configuration.endpoint, Some(api_token))
            {
                Ok(authenticated) => Arc::new(FetcherAuthFallback::new(
                    Arc::new(authenticated),
                    anonymous,
                )),
                Err(e) => {
                    debug!("Ignoring unusable API token, using anonymous access: {e}");
                    anonymous
                }
            },
            None => anonymous,
        };

        Ok(Self::new(
            Arc::new(FetcherTimeout::new(fetcher, configuration.timeout)),
            Arc::new(LookupContext::default()),
            configuration.debounce,
        ))
    }

    /// Retrieves the cache and session state.
    pub fn context(&self) -> &Arc<LookupContext> {
        &self.context
    }

    async fn resolve_profile(
        &self,
        key: &LookupKey,
        session: &LookupSession,
    ) -> LookupOutcome<Profile> {
        if let Some(profile) = self.context.cached_profile(key).await {
            debug!("Using cached profile of {key}");
            return Ok(profile);
        }

        self.fetcher
            .fetch_profile(key, session.cancellation())
            .await
    }

    async fn resolve_repositories(
        &self,
        key: &LookupKey,
        session: &LookupSession,
    ) -> LookupOutcome<Vec<Repository>> {
        if let Some(repositories) = self.context.cached_repositories(key).await {
            debug!("Using cached repositories of {key}");
            return Ok(repositories);
        }

        self.fetcher
            .fetch_repositories(key, session.cancellation())
            .await
    }
}

/// Waits for the given delay, returning `true` if cancelled before it elapsed.
async fn wait_debounce(delay: Duration, cancellation: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancellation.cancelled() => true,
        _ = sleep(delay) => false,
    }
}

#[async_trait::async_trait]
impl ProfileLookup for LookupOrchestrator {
    async fn begin_session(&self) -> LookupSession {
        self.context.begin_session().await
    }

    async fn lookup_in_session(
        &self,
        key: &LookupKey,
        session: &LookupSession,
    ) -> LookupOutcome<LookupResult> {
        info!("Looking up {key} in session #{}", session.id());

        if !self.debounce.is_zero() && wait_debounce(self.debounce, session.cancellation()).await
        {
            debug!("Lookup session #{} superseded before fetching", session.id());
            return Err(LookupError::Cancelled);
        }

        let (profile, repositories) = tokio::join!(
            self.resolve_profile(key, session),
            self.resolve_repositories(key, session)
        );
        if !self.context.is_current(session).await {
            info!("Discarding results of superseded lookup session #{}", session.id());
            return Err(LookupError::Cancelled);
        }

        let result = LookupResult::new(profile?, repositories?);
        if !self.context.commit(session, key, &result).await {
            return Err(LookupError::Cancelled);
        }
        info!(
            "Resolved {} with {} repositories",
            result.profile(),
            result.repositories().len()
        );
        debug!("{}", self.context.state_summary().await);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::{always, eq};

    use crate::MockProfileFetcher;

    use super::*;

    fn key(raw: &str) -> LookupKey {
        LookupKey::try_new(raw).unwrap()
    }

    fn build_orchestrator(fetcher: MockProfileFetcher) -> LookupOrchestrator {
        LookupOrchestrator::new(
            Arc::new(fetcher),
            Arc::new(LookupContext::default()),
            Duration::ZERO,
        )
    }

    /// A fetcher answering after a fixed delay, ignoring cancellation.
    struct SlowFetcher {
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl ProfileFetcher for SlowFetcher {
        async fn fetch_profile(
            &self,
            key: &LookupKey,
            _cancellation: &CancellationToken,
        ) -> LookupOutcome<Profile> {
            sleep(self.delay).await;
            Ok(Profile::new(key, 1))
        }

        async fn fetch_repositories(
            &self,
            key: &LookupKey,
            _cancellation: &CancellationToken,
        ) -> LookupOutcome<Vec<Repository>> {
            sleep(self.delay).await;
            Ok(vec![Repository::new(&format!("{key}-repository"), 1)])
        }
    }

    #[tokio::test]
    async fn lookup_success() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .with(eq(key("octocat")), always())
                .returning(|_, _| Ok(Profile::new("octocat", 2)))
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .with(eq(key("octocat")), always())
                .returning(|_, _| {
                    Ok(vec![
                        Repository::new("Hello-World", 80),
                        Repository::new("Spoon-Knife", 12),
                    ])
                })
                .times(1);

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);

        let result = orchestrator.lookup("octocat").await.unwrap();

        assert_eq!("octocat", result.profile().display_name());
        assert_eq!(
            &[
                Repository::new("Hello-World", 80),
                Repository::new("Spoon-Knife", 12)
            ],
            result.repositories()
        );
        assert_eq!(
            Some(Profile::new("octocat", 2)),
            orchestrator.context().cached_profile(&key("octocat")).await
        );
    }

    #[tokio::test]
    async fn lookup_trims_the_key() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .with(eq(key("octocat")), always())
                .returning(|_, _| Ok(Profile::new("octocat", 0)))
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .with(eq(key("octocat")), always())
                .returning(|_, _| Ok(vec![]))
                .times(1);

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);

        orchestrator.lookup("  octocat  ").await.unwrap();
    }

    #[tokio::test]
    async fn lookup_whitespace_key_fails_without_network_call() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher.expect_fetch_profile().never();
            fetcher.expect_fetch_repositories().never();

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);

        let error = orchestrator
            .lookup("  ")
            .await
            .expect_err("Expected an invalid input error");

        assert_eq!(LookupError::InvalidInput, error);
    }

    #[tokio::test]
    async fn lookup_with_empty_repositories_succeeds() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .returning(|_, _| Ok(Profile::new("octocat", 0)))
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| Ok(vec![]))
                .times(1);

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);

        let result = orchestrator.lookup("octocat").await.unwrap();

        assert!(result.is_empty());
        assert_eq!(
            Some(vec![]),
            orchestrator
                .context()
                .cached_repositories(&key("octocat"))
                .await
        );
    }

    #[tokio::test]
    async fn lookup_profile_not_found_discards_repositories() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .returning(|_, _| Err(LookupError::NotFound))
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| Ok(vec![Repository::new("Hello-World", 80)]))
                .times(1);

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);

        let error = orchestrator
            .lookup("octocat")
            .await
            .expect_err("Expected a not found error");

        assert_eq!(LookupError::NotFound, error);
        assert_eq!(
            None,
            orchestrator.context().cached_profile(&key("octocat")).await
        );
        assert_eq!(
            None,
            orchestrator
                .context()
                .cached_repositories(&key("octocat"))
                .await
        );
    }

    #[tokio::test]
    async fn lookup_repositories_failure_fails_the_lookup() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .returning(|_, _| Ok(Profile::new("octocat", 2)))
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| Err(LookupError::Timeout))
                .times(1);

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);

        let error = orchestrator
            .lookup("octocat")
            .await
            .expect_err("Expected a timeout error");

        assert_eq!(LookupError::Timeout, error);
        assert_eq!(
            None,
            orchestrator.context().cached_profile(&key("octocat")).await
        );
    }

    #[tokio::test]
    async fn lookup_profile_error_wins_when_both_fail() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .returning(|_, _| Err(LookupError::NetworkError("reset".to_string())))
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| Err(LookupError::Timeout))
                .times(1);

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);

        let error = orchestrator
            .lookup("octocat")
            .await
            .expect_err("Expected a network error");

        assert_eq!(LookupError::NetworkError("reset".to_string()), error);
    }

    #[tokio::test]
    async fn lookup_rate_limited_carries_reset_time() {
        let reset_at = chrono::Utc::now();
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .returning(move |_, _| {
                    Err(LookupError::RateLimited {
                        reset_at: Some(reset_at),
                    })
                })
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| Ok(vec![]))
                .times(1);

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);

        let error = orchestrator
            .lookup("octocat")
            .await
            .expect_err("Expected a rate limit error");

        assert_eq!(
            LookupError::RateLimited {
                reset_at: Some(reset_at)
            },
            error
        );
    }

    #[tokio::test]
    async fn lookup_cache_hit_does_not_fetch_again() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .returning(|_, _| Ok(Profile::new("octocat", 1)))
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| Ok(vec![Repository::new("Hello-World", 80)]))
                .times(1);

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);

        let first = orchestrator.lookup("octocat").await.unwrap();
        let second = orchestrator.lookup(" octocat").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn lookup_after_failure_fetches_again() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .returning(|_, _| Ok(Profile::new("octocat", 1)))
                .times(2);
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| Err(LookupError::UpstreamError { status: 500 }))
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| Ok(vec![]))
                .times(1);

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);

        orchestrator
            .lookup("octocat")
            .await
            .expect_err("Expected an upstream error");
        orchestrator.lookup("octocat").await.unwrap();
    }

    #[tokio::test]
    async fn lookup_in_succession_discards_the_first() {
        let orchestrator = Arc::new(LookupOrchestrator::new(
            Arc::new(SlowFetcher {
                delay: Duration::from_millis(100),
            }),
            Arc::new(LookupContext::default()),
            Duration::ZERO,
        ));
        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.lookup("octocat").await })
        };
        sleep(Duration::from_millis(20)).await;

        let second = orchestrator.lookup("hubot").await.unwrap();
        let first = first.await.unwrap();

        assert_eq!(Err(LookupError::Cancelled), first);
        assert_eq!(Profile::new("hubot", 1), *second.profile());
        assert_eq!(
            None,
            orchestrator.context().cached_profile(&key("octocat")).await
        );
        assert_eq!(
            None,
            orchestrator
                .context()
                .cached_repositories(&key("octocat"))
                .await
        );
        assert_eq!(
            Some(Profile::new("hubot", 1)),
            orchestrator.context().cached_profile(&key("hubot")).await
        );
    }

    #[tokio::test]
    async fn lookup_superseded_during_debounce_never_fetches() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .with(eq(key("hubot")), always())
                .returning(|_, _| Ok(Profile::new("hubot", 0)))
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .with(eq(key("hubot")), always())
                .returning(|_, _| Ok(vec![]))
                .times(1);

            fetcher
        };
        let orchestrator = Arc::new(LookupOrchestrator::new(
            Arc::new(fetcher),
            Arc::new(LookupContext::default()),
            Duration::from_millis(50),
        ));
        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { orchestrator.lookup("octocat").await })
        };
        sleep(Duration::from_millis(10)).await;

        orchestrator.lookup("hubot").await.unwrap();
        let first = first.await.unwrap();

        assert_eq!(Err(LookupError::Cancelled), first);
        assert_eq!(
            Some(key("hubot")),
            orchestrator.context().last_key().await
        );
    }

    #[tokio::test]
    async fn lookup_in_superseded_session_is_not_cached() {
        let fetcher = {
            let mut fetcher = MockProfileFetcher::new();
            fetcher
                .expect_fetch_profile()
                .returning(|_, _| Ok(Profile::new("octocat", 0)))
                .times(1);
            fetcher
                .expect_fetch_repositories()
                .returning(|_, _| Ok(vec![]))
                .times(1);

            fetcher
        };
        let orchestrator = build_orchestrator(fetcher);
        let session = orchestrator.begin_session().await;
        orchestrator.begin_session().await;

        let error = orchestrator
            .lookup_in_session(&key("octocat"), &session)
            .await
            .expect_err("Expected a cancelled error");

        assert_eq!(LookupError::Cancelled, error);
        assert_eq!(
            None,
            orchestrator.context().cached_profile(&key("octocat")).await
        );
    }

    #[tokio::test]
    async fn lookup_with_timeout_decorator_times_out() {
        let orchestrator = LookupOrchestrator::new(
            Arc::new(FetcherTimeout::new(
                Arc::new(SlowFetcher {
                    delay: Duration::from_secs(5),
                }),
                Duration::from_millis(20),
            )),
            Arc::new(LookupContext::default()),
            Duration::ZERO,
        );

        let error = orchestrator
            .lookup("octocat")
            .await
            .expect_err("Expected a timeout");

        assert_eq!(LookupError::Timeout, error);
    }

    #[tokio::test]
    async fn try_from_configuration_with_unusable_token_falls_back() {
        let configuration = LookupConfiguration {
            api_token: Some("bad\ntoken".to_string()),
            ..Default::default()
        };

        LookupOrchestrator::try_from_configuration(&configuration).unwrap();
    }
}
