use std::collections::HashMap;

use log::{debug, info};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::{LookupKey, LookupResult, Profile, Repository};

/// A lookup session, identified by a monotonically increasing id.
#[derive(Debug, Clone, Default)]
pub struct LookupSession {
    /// The session id
    id: u64,

    /// The cancellation signal of the session network operations
    cancellation: CancellationToken,
}

impl LookupSession {
    /// Retrieves the session id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Retrieves the cancellation token of the session.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

/// The cache and session state of a lookup orchestrator
#[derive(Debug, Default)]
pub struct LookupContext {
    /// The cached profiles
    profiles: RwLock<HashMap<LookupKey, Profile>>,

    /// The cached repository lists
    repositories: RwLock<HashMap<LookupKey, Vec<Repository>>>,

    /// The current lookup session
    current_session: RwLock<LookupSession>,

    /// The key of the last lookup that completed successfully
    last_key: RwLock<Option<LookupKey>>,
}

impl LookupContext {
    /// Begins a new session, cancelling the network operations of the current one.
    pub async fn begin_session(&self) -> LookupSession {
        let mut current_session = self.current_session.write().await;
        if !current_session.cancellation.is_cancelled() {
            debug!("Cancelling lookup session #{}", current_session.id);
            current_session.cancellation.cancel();
        }
        *current_session = LookupSession {
            id: current_session.id + 1,
            cancellation: CancellationToken::new(),
        };

        current_session.to_owned()
    }

    /// Whether the given session is still the current one.
    pub async fn is_current(&self, session: &LookupSession) -> bool {
        let current_session = self.current_session.read().await;

        current_session.id == session.id && !session.cancellation.is_cancelled()
    }

    /// Stores the result of a lookup if its session is still the current one.
    ///
    /// Returns `false` and leaves the cache untouched when the session was superseded.
    pub async fn commit(
        &self,
        session: &LookupSession,
        key: &LookupKey,
        result: &LookupResult,
    ) -> bool {
        let current_session = self.current_session.read().await;
        if current_session.id != session.id || session.cancellation.is_cancelled() {
            info!("Discarding result of superseded lookup session #{}", session.id);
            return false;
        }
        {
            let mut profiles = self.profiles.write().await;
            (*profiles).insert(key.to_owned(), result.profile().to_owned());
        }
        {
            let mut repositories = self.repositories.write().await;
            (*repositories).insert(key.to_owned(), result.repositories().to_vec());
        }
        let mut last_key = self.last_key.write().await;
        *last_key = Some(key.to_owned());

        true
    }

    /// Retrieves the cached profile of a key.
    pub async fn cached_profile(&self, key: &LookupKey) -> Option<Profile> {
        let profiles = self.profiles.read().await;

        (*profiles).get(key).cloned()
    }

    /// Retrieves the cached repositories of a key.
    pub async fn cached_repositories(&self, key: &LookupKey) -> Option<Vec<Repository>> {
        let repositories = self.repositories.read().await;

        (*repositories).get(key).cloned()
    }

    /// Retrieves the key of the last lookup that completed successfully.
    pub async fn last_key(&self) -> Option<LookupKey> {
        let last_key = self.last_key.read().await;

        last_key.to_owned()
    }

    /// Returns the summary of the state.
    pub async fn state_summary(&self) -> String {
        let total_profiles = self.profiles.read().await.len();
        let total_repositories = self.repositories.read().await.len();
        let current_session = self.current_session.read().await.id;

        format!(
            "Cache: profiles={total_profiles}, repositories={total_repositories}, Session: current=#{current_session}"
        )
    }
}
