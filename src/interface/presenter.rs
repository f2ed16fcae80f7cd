use crate::{Profile, Repository};

/// A trait for rendering lookup states to a display surface.
#[cfg_attr(test, mockall::automock)]
pub trait LookupPresenter: Sync + Send {
    /// Shows the loading indicator.
    fn show_loading(&self);

    /// Shows the profile card.
    fn show_profile(&self, profile: &Profile);

    /// Shows the repository grid.
    fn show_repos(&self, repositories: &[Repository]);

    /// Shows the empty repositories notice.
    fn show_empty(&self, message: &str);

    /// Shows the error banner.
    fn show_error(&self, message: &str);

    /// Shows the detail overlay of a repository.
    fn show_detail(&self, repository: &Repository);

    /// Hides the detail overlay.
    fn hide_detail(&self);
}
