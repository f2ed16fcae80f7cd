use crate::{LookupKey, LookupOutcome, LookupResult, LookupSession};

/// A trait for resolving a lookup key to a profile and its repositories.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileLookup: Sync + Send {
    /// Starts a new lookup session, superseding the current one.
    async fn begin_session(&self) -> LookupSession;

    /// Looks up the profile and repositories of the key within the given session.
    async fn lookup_in_session(
        &self,
        key: &LookupKey,
        session: &LookupSession,
    ) -> LookupOutcome<LookupResult>;

    /// Looks up the profile and repositories of the raw user input in a new session.
    async fn lookup(&self, raw: &str) -> LookupOutcome<LookupResult> {
        let key = LookupKey::try_new(raw)?;
        let session = self.begin_session().await;

        self.lookup_in_session(&key, &session).await
    }
}
