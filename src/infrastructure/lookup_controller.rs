use std::sync::Arc;

use log::{debug, info};
use tokio::sync::{Mutex, RwLock};

use crate::{
    DismissReason, LookupKey, LookupPresenter, LookupResult, ProfileLookup, Repository,
};

/// The notice shown when a profile has no public repositories.
pub const EMPTY_REPOSITORIES_MESSAGE: &str = "No public repos found.";

/// A controller turning user events into lookups and presenter calls.
pub struct LookupController {
    /// The lookup resolving user input
    lookup: Arc<dyn ProfileLookup>,

    /// The display surface
    presenter: Arc<dyn LookupPresenter>,

    /// The generation of the latest lookup request, guarding rendering
    generation: Mutex<u64>,

    /// The repositories of the grid currently rendered
    rendered_repositories: RwLock<Vec<Repository>>,

    /// Whether the detail overlay is open
    detail_open: RwLock<bool>,
}

impl LookupController {
    /// Creates a new `LookupController` instance with the given lookup and presenter.
    pub fn new(lookup: Arc<dyn ProfileLookup>, presenter: Arc<dyn LookupPresenter>) -> Self {
        Self {
            lookup,
            presenter,
            generation: Mutex::new(0),
            rendered_repositories: RwLock::new(vec![]),
            detail_open: RwLock::new(false),
        }
    }

    /// Handles a lookup request for the raw user input.
    ///
    /// Only the latest request renders its outcome. Its lookup session is begun while the
    /// generation is held, so the latest generation always owns the current session.
    pub async fn lookup_requested(&self, raw: &str) {
        let key = match LookupKey::try_new(raw) {
            Ok(key) => key,
            Err(e) => {
                self.presenter.show_error(&e.user_message());
                return;
            }
        };
        let (generation, session) = {
            let mut generation = self.generation.lock().await;
            *generation += 1;
            self.presenter.show_loading();
            let session = self.lookup.begin_session().await;

            (*generation, session)
        };

        let outcome = self.lookup.lookup_in_session(&key, &session).await;

        let current_generation = self.generation.lock().await;
        if *current_generation != generation {
            debug!("Dropping outcome of superseded lookup request #{generation}");
            return;
        }
        match outcome {
            Ok(result) => self.render(&result).await,
            Err(e) if e.is_cancelled() => {
                debug!("Lookup request #{generation} was cancelled");
            }
            Err(e) => {
                info!("Lookup request #{generation} failed: {e}");
                self.close_detail().await;
                self.rendered_repositories.write().await.clear();
                self.presenter.show_error(&e.user_message());
            }
        }
    }

    async fn render(&self, result: &LookupResult) {
        self.close_detail().await;
        self.presenter.show_profile(result.profile());
        if result.is_empty() {
            self.presenter.show_empty(EMPTY_REPOSITORIES_MESSAGE);
        } else {
            self.presenter.show_repos(result.repositories());
        }
        let mut rendered_repositories = self.rendered_repositories.write().await;
        *rendered_repositories = result.repositories().to_vec();
    }

    /// Hides the detail overlay of a grid about to be replaced.
    async fn close_detail(&self) {
        let mut detail_open = self.detail_open.write().await;
        if *detail_open {
            *detail_open = false;
            self.presenter.hide_detail();
        }
    }

    /// Retrieves a repository of the rendered grid by its position.
    pub async fn repository_at(&self, index: usize) -> Option<Repository> {
        let rendered_repositories = self.rendered_repositories.read().await;

        rendered_repositories.get(index).cloned()
    }

    /// Handles the selection of a rendered repository by showing its detail.
    pub async fn repository_selected(&self, repository: &Repository) {
        let mut detail_open = self.detail_open.write().await;
        *detail_open = true;
        self.presenter.show_detail(repository);
    }

    /// Handles a dismissal of the detail overlay, ignored when it is not open.
    pub async fn overlay_dismissed(&self, reason: DismissReason) {
        let mut detail_open = self.detail_open.write().await;
        if !*detail_open {
            return;
        }
        debug!("Detail overlay dismissed by {reason}");
        *detail_open = false;
        self.presenter.hide_detail();
    }
}
