use super::{Profile, Repository};

/// The resolved data of one successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    /// The fetched profile.
    pub(crate) profile: Profile,

    /// The fetched repositories, in upstream order.
    pub(crate) repositories: Vec<Repository>,
}

impl LookupResult {
    /// Creates a new `LookupResult` instance with the given profile and repositories.
    pub fn new(profile: Profile, repositories: Vec<Repository>) -> Self {
        Self {
            profile,
            repositories,
        }
    }

    /// Retrieves the profile.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Retrieves the list of repositories.
    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Whether the profile has no public repositories.
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}
