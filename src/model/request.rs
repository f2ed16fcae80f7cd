use std::fmt::Display;

use reqwest::Url;

use super::LookupKey;

/// The number of repositories requested per lookup.
pub const REPOSITORIES_PER_PAGE: u16 = 30;

/// A kind of resource fetched for a lookup key.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ResourceKind {
    /// The public profile.
    Profile,

    /// The list of public repositories.
    Repositories,
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Profile => write!(f, "profile"),
            ResourceKind::Repositories => write!(f, "repositories"),
        }
    }
}

/// A request for one resource of a lookup key.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Request {
    /// The kind of resource requested.
    pub(crate) kind: ResourceKind,

    /// The lookup key.
    pub(crate) key: LookupKey,
}

impl Request {
    /// Creates a new `Request` for the given resource kind and key.
    pub fn new(kind: ResourceKind, key: &LookupKey) -> Self {
        Self {
            kind,
            key: key.to_owned(),
        }
    }

    /// Retrieves the resource kind.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Retrieves the lookup key.
    pub fn key(&self) -> &LookupKey {
        &self.key
    }

    /// Whether the key can be sent as a single path segment.
    ///
    /// Dot segments are resolved and tabs or newlines are stripped by URL parsing,
    /// so such keys would address another resource.
    fn is_addressable(&self) -> bool {
        !matches!(self.key.as_str(), "." | "..")
            && !self.key.contains(['\t', '\n', '\r'])
    }

    /// Returns the URL of the request below the API endpoint, with the key as one encoded path segment.
    ///
    /// Returns `None` when the key cannot be addressed or the endpoint cannot be a base URL.
    pub fn url(&self, endpoint: &Url) -> Option<Url> {
        if !self.is_addressable() {
            return None;
        }
        let mut url = endpoint.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().ok()?;
            segments.pop_if_empty().push("users").push(&self.key);
            if self.kind == ResourceKind::Repositories {
                segments.push("repos");
            }
        }
        if self.kind == ResourceKind::Repositories {
            url.query_pairs_mut()
                .append_pair("per_page", &REPOSITORIES_PER_PAGE.to_string())
                .append_pair("sort", "updated");
        }

        Some(url)
    }
}

impl Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Request: kind={}, key={}", self.kind, self.key)
    }
}
