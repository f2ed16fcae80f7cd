use std::{fmt::Display, ops::Deref};

use serde::Deserialize;

use super::LookupError;

/// A normalized profile identifier, used for fetching and caching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    /// Creates a new `LookupKey` from raw user input, trimming surrounding whitespace.
    pub fn try_new(raw: &str) -> Result<Self, LookupError> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(LookupError::InvalidInput);
        }

        Ok(Self(key.to_string()))
    }
}

impl Deref for LookupKey {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A public GitHub profile.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// The login of the profile.
    #[serde(default)]
    pub login: String,

    /// The display name, if the user set one.
    #[serde(default)]
    pub name: Option<String>,

    /// The short biography.
    #[serde(default)]
    pub bio: Option<String>,

    /// The avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,

    /// The profile page URL.
    #[serde(default)]
    pub html_url: Option<String>,

    /// The number of followers.
    #[serde(default)]
    pub followers: u32,

    /// The number of followed users.
    #[serde(default)]
    pub following: u32,

    /// The number of public repositories.
    #[serde(default)]
    pub public_repos: u32,
}

impl Profile {
    /// Creates a new `Profile` with the given login and public repositories count.
    pub fn new(login: &str, public_repos: u32) -> Self {
        Self {
            login: login.to_string(),
            public_repos,
            ..Default::default()
        }
    }

    /// Retrieves the name to display, falling back to the login.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.login,
        }
    }
}

impl Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Profile: {}, Followers: {}, Following: {}, Repositories: {}",
            self.login, self.followers, self.following, self.public_repos
        )
    }
}

/// Metadata of a GitHub repository.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Repository {
    /// The name of the repository.
    pub name: String,

    /// The description of the repository.
    #[serde(default)]
    pub description: Option<String>,

    /// The number of stars the repository has.
    #[serde(default)]
    pub stargazers_count: u32,

    /// The number of forks of the repository.
    #[serde(default)]
    pub forks_count: u32,

    /// The primary language of the repository.
    #[serde(default)]
    pub language: Option<String>,

    /// The canonical URL of the repository.
    #[serde(default)]
    pub html_url: String,
}

impl Repository {
    /// Creates a new `Repository` instance.
    pub fn new(name: &str, stargazers_count: u32) -> Self {
        Self {
            name: name.to_string(),
            stargazers_count,
            ..Default::default()
        }
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Repository: {}, Stars: {}, Forks: {}",
            self.name, self.stargazers_count, self.forks_count
        )
    }
}

/// The action that dismissed the repository detail overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    /// The explicit close action.
    CloseButton,

    /// A click outside of the overlay bounds.
    OutsideClick,

    /// The cancel key.
    EscapeKey,
}

impl Display for DismissReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DismissReason::CloseButton => write!(f, "close button"),
            DismissReason::OutsideClick => write!(f, "outside click"),
            DismissReason::EscapeKey => write!(f, "escape key"),
        }
    }
}
